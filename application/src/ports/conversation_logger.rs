//! Port for structured deliberation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording deliberation events
//! (phase changes, thoughts, discussion lines, cluster results, history saves)
//! to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! deliberation transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured deliberation event for logging.
///
/// Each event has a type string and a JSON payload containing event-specific
/// fields. The adapter stamps the time when it writes the event.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// Event type identifier (e.g., "phase_change", "agent_thought", "cluster_result").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging deliberation events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL line).
/// The `log` method is synchronous and non-fallible; logging failures are
/// ignored.
pub trait ConversationLogger: Send + Sync {
    /// Record a deliberation event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
