//! Interactive mode
//!
//! Reads lines while a deliberation runs: the first line is the question,
//! later lines are queued or processed as follow-ups, and slash commands
//! inspect or steer the session.

mod command;
mod session;

pub use command::ReplCommand;
pub use session::InteractiveSession;
