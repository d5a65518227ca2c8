//! Presentation layer for crowd-deliberation
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and the interactive mode.

pub mod cli;
pub mod config;
pub mod output;
pub mod progress;
pub mod repl;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use config::OutputConfig;
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
pub use repl::{InteractiveSession, ReplCommand};
