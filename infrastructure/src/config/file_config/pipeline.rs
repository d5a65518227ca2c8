//! Pipeline configuration from TOML (`[pipeline]` section)

use deliberation_application::PipelineParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw pipeline pacing from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePipelineConfig {
    pub think_batch_size: usize,
    pub thought_sample_size: usize,
    pub walk_settle_ms: u64,
    pub speech_delay_ms: u64,
    pub group_stagger_ms: u64,
    pub background_interval_secs: u64,
    pub thought_bubble_ms: u64,
    pub speech_bubble_ms: u64,
}

impl Default for FilePipelineConfig {
    fn default() -> Self {
        Self {
            think_batch_size: 10,
            thought_sample_size: 8,
            walk_settle_ms: 3000,
            speech_delay_ms: 2000,
            group_stagger_ms: 500,
            background_interval_secs: 5,
            thought_bubble_ms: 6000,
            speech_bubble_ms: 4000,
        }
    }
}

impl FilePipelineConfig {
    pub fn to_params(&self) -> PipelineParams {
        PipelineParams {
            think_batch_size: self.think_batch_size,
            thought_sample_size: self.thought_sample_size,
            walk_settle: Duration::from_millis(self.walk_settle_ms),
            speech_delay: Duration::from_millis(self.speech_delay_ms),
            group_stagger: Duration::from_millis(self.group_stagger_ms),
            background_interval: Duration::from_secs(self.background_interval_secs),
            thought_bubble: Duration::from_millis(self.thought_bubble_ms),
            speech_bubble: Duration::from_millis(self.speech_bubble_ms),
        }
    }
}
