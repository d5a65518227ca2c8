//! Structured deliberation event log.
//!
//! Provides [`JsonlEventLogger`], a JSONL file writer that implements
//! the [`ConversationLogger`](deliberation_application::ConversationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlEventLogger;
