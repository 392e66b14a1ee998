// Constants module for aep-notification-content
// Centralizes magic numbers for better maintainability

use std::time::Duration;

// ============================================================================
// Card Layout Constants
// ============================================================================

/// Width of the rule drawn around text cards, in characters
pub(crate) const CARD_WIDTH: usize = 48;

/// Title characters per line recommended for rich templates
pub(crate) const TITLE_MAX_LENGTH: usize = 35;

// ============================================================================
// URL Display Constants
// ============================================================================

/// Maximum URL length before truncation
pub(crate) const URL_DISPLAY_MAX: usize = 40;

// ============================================================================
// Channel and Runtime Constants
// ============================================================================

/// Buffer size for the controller channel
pub(crate) const CHANNEL_BUFFER_SIZE: usize = 32;

/// How long runtime shutdown waits for the blocking stdin reader
pub(crate) const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(200);
