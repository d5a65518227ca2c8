//! Progress notification port
//!
//! Defines the interface for reporting progress during a deliberation.

use deliberation_domain::{AgentId, DiscussionGroup, Phase, ThemeCluster};

/// Callback for progress updates during a deliberation
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait DeliberationProgress: Send + Sync {
    /// Called whenever the authoritative phase changes
    fn on_phase_change(&self, phase: Phase);

    /// Called when a think cycle starts
    fn on_think_start(&self, _total_agents: usize, _follow_up: bool) {}

    /// Called when one agent's think call finishes
    fn on_agent_thought(&self, _agent: &AgentId, _success: bool) {}

    // ==================== Discussion Callbacks ====================

    fn on_groups_formed(&self, _groups: &[DiscussionGroup]) {}

    /// Called with each `speaker: message` line as it is spoken
    fn on_discussion_line(&self, _group_index: usize, _line: &str) {}

    fn on_group_complete(&self, _group_index: usize) {}

    // ==================== Results Callbacks ====================

    /// Called when the background clusterer publishes an interim summary
    fn on_provisional_results(&self, _themes: &[ThemeCluster]) {}

    /// Called when the authoritative clustering succeeds
    fn on_results(&self, _themes: &[ThemeCluster]) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl DeliberationProgress for NoProgress {
    fn on_phase_change(&self, _phase: Phase) {}
}
