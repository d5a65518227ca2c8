//! Follow-up message queue

/// User messages that arrived while the pipeline was busy
///
/// Drained atomically: a drain returns everything queued so far and leaves the
/// queue empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingQueue {
    messages: Vec<String>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
