mod messages;

pub use messages::{Command, Message};
