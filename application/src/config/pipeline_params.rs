//! Pipeline parameters: timing and batching of the deliberation flow.
//!
//! [`PipelineParams`] groups the static parameters the
//! [`DeliberationOrchestrator`](crate::use_cases::orchestrator::DeliberationOrchestrator)
//! uses between remote calls. Grouping geometry lives in the domain
//! ([`GroupingParams`](deliberation_domain::GroupingParams)).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Batching and pacing of one deliberation.
///
/// Waits exist so a watching user can follow the agents; set them to zero for
/// headless runs and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    /// Think calls in flight at once
    pub think_batch_size: usize,
    /// Agents per think cycle that show a thought bubble, at most
    /// [`PipelineParams::MAX_THOUGHT_BUBBLES`]
    pub thought_sample_size: usize,
    /// Wait for agents to reach their circle before anyone speaks
    pub walk_settle: Duration,
    /// Pause between two speakers of the same group
    pub speech_delay: Duration,
    /// Start offset between consecutive groups
    pub group_stagger: Duration,
    /// Period of the background clusterer
    pub background_interval: Duration,
    pub thought_bubble: Duration,
    pub speech_bubble: Duration,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            think_batch_size: 10,
            thought_sample_size: 8,
            walk_settle: Duration::from_millis(3000),
            speech_delay: Duration::from_millis(2000),
            group_stagger: Duration::from_millis(500),
            background_interval: Duration::from_secs(5),
            thought_bubble: Duration::from_millis(6000),
            speech_bubble: Duration::from_millis(4000),
        }
    }
}

impl PipelineParams {
    /// Upper bound on thought bubbles per think cycle
    pub const MAX_THOUGHT_BUBBLES: usize = 8;

    /// No waits between steps; batching and sampling stay at their defaults
    pub fn immediate() -> Self {
        Self {
            walk_settle: Duration::ZERO,
            speech_delay: Duration::ZERO,
            group_stagger: Duration::ZERO,
            ..Self::default()
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_think_batch_size(mut self, size: usize) -> Self {
        self.think_batch_size = size;
        self
    }

    pub fn with_thought_sample_size(mut self, size: usize) -> Self {
        self.thought_sample_size = size;
        self
    }

    pub fn with_walk_settle(mut self, wait: Duration) -> Self {
        self.walk_settle = wait;
        self
    }

    pub fn with_speech_delay(mut self, wait: Duration) -> Self {
        self.speech_delay = wait;
        self
    }

    pub fn with_group_stagger(mut self, wait: Duration) -> Self {
        self.group_stagger = wait;
        self
    }

    pub fn with_background_interval(mut self, period: Duration) -> Self {
        self.background_interval = period;
        self
    }

    /// Batch size used when chunking, never zero
    pub fn effective_batch_size(&self) -> usize {
        self.think_batch_size.max(1)
    }

    /// Thought bubbles per think cycle, capped at [`Self::MAX_THOUGHT_BUBBLES`]
    pub fn effective_thought_sample_size(&self) -> usize {
        self.thought_sample_size.min(Self::MAX_THOUGHT_BUBBLES)
    }
}
