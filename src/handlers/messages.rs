use aep_notification_util::{FetchResults, JobId};

/// Application message types
#[derive(Debug)]
pub enum Message {
    /// A scheduler job fired (countdown tick or carousel auto-advance)
    Fired(JobId),
    /// An image batch finished, tagged with the display generation that requested it
    ImagesLoaded { generation: u64, results: FetchResults },
    /// Command read from stdin
    Command(Command),
    /// Stdin reached end of file
    InputClosed,
    /// Ctrl-C or the run time elapsed
    Shutdown,
}

/// User commands, one per stdin line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Next carousel page
    Next,
    /// Previous carousel page
    Previous,
    /// Open the click-through URL of what is shown
    Open,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "n" | "next" => Some(Self::Next),
            "p" | "prev" | "previous" => Some(Self::Previous),
            "o" | "open" => Some(Self::Open),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}
