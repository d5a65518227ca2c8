//! Session context
//!
//! One mutex guards the whole session: agents, phase, results, groups, the
//! follow-up queue and the conversation thread. The lock is taken for short
//! synchronous sections only and never held across an await.
//!
//! Anyone may read. Writes to the phase go through [`PhaseWriter`], which only
//! the orchestrator creates. The background clusterer writes through
//! [`ProvisionalWriter`], which checks the phase under the same lock.

use deliberation_domain::{
    AgentId, AgentProfile, AgentRecord, AnswerEntry, ConversationMessage, DiscussionGroup,
    PendingQueue, Phase, Question, ThemeCluster,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// Read access to the authoritative phase
pub trait PhaseReader: Send + Sync {
    fn phase(&self) -> Phase;
}

#[derive(Default)]
struct SessionState {
    agents: Vec<AgentRecord>,
    index: HashMap<AgentId, usize>,
    phase: Phase,
    question: Option<Question>,
    results: Vec<ThemeCluster>,
    results_provisional: bool,
    groups: Vec<DiscussionGroup>,
    pending: PendingQueue,
    thread: Vec<ConversationMessage>,
    memory_context: Option<String>,
    history_saved: bool,
}

/// Session-scoped store of everything a deliberation reads and writes
pub struct SessionContext {
    state: Mutex<SessionState>,
}

impl SessionContext {
    pub fn new(profiles: Vec<AgentProfile>) -> Self {
        let mut state = SessionState::default();
        for profile in profiles {
            if state.index.contains_key(&profile.id) {
                continue;
            }
            state.index.insert(profile.id.clone(), state.agents.len());
            state.agents.push(AgentRecord::new(profile));
        }
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ==================== Agents ====================

    pub fn agent_count(&self) -> usize {
        self.lock().agents.len()
    }

    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.lock().agents.iter().map(|a| a.id().clone()).collect()
    }

    pub fn agent(&self, id: &AgentId) -> Option<AgentRecord> {
        let state = self.lock();
        state.index.get(id).map(|&i| state.agents[i].clone())
    }

    pub fn agents(&self) -> Vec<AgentRecord> {
        self.lock().agents.clone()
    }

    /// Read-modify-write one agent against the current state.
    ///
    /// Returns `None` when the agent does not exist.
    pub fn update_agent<R>(&self, id: &AgentId, f: impl FnOnce(&mut AgentRecord) -> R) -> Option<R> {
        let mut state = self.lock();
        let i = *state.index.get(id)?;
        Some(f(&mut state.agents[i]))
    }

    /// Current answers, in agent order, skipping agents without one
    pub fn answers(&self) -> Vec<AnswerEntry> {
        self.lock()
            .agents
            .iter()
            .filter_map(|a| a.answer().map(|answer| AnswerEntry::new(a.id().clone(), answer)))
            .collect()
    }

    // ==================== Question & Results ====================

    pub fn question(&self) -> Option<Question> {
        self.lock().question.clone()
    }

    pub(crate) fn set_question(&self, question: Question) {
        self.lock().question = Some(question);
    }

    pub fn results(&self) -> Vec<ThemeCluster> {
        self.lock().results.clone()
    }

    /// True while the results come from the background clusterer
    pub fn results_are_provisional(&self) -> bool {
        self.lock().results_provisional
    }

    pub fn groups(&self) -> Vec<DiscussionGroup> {
        self.lock().groups.clone()
    }

    pub(crate) fn set_groups(&self, groups: Vec<DiscussionGroup>) {
        self.lock().groups = groups;
    }

    pub(crate) fn group_transcript(&self, index: usize) -> Option<String> {
        self.lock().groups.get(index).map(DiscussionGroup::transcript)
    }

    pub(crate) fn update_group<R>(
        &self,
        index: usize,
        f: impl FnOnce(&mut DiscussionGroup) -> R,
    ) -> Option<R> {
        let mut state = self.lock();
        state.groups.get_mut(index).map(f)
    }

    pub(crate) fn memory_context(&self) -> Option<String> {
        self.lock().memory_context.clone()
    }

    pub(crate) fn set_memory_context(&self, context: Option<String>) {
        self.lock().memory_context = context;
    }

    /// Claim the one history save of this question. True only for the first caller.
    pub(crate) fn claim_history_save(&self) -> bool {
        let mut state = self.lock();
        !std::mem::replace(&mut state.history_saved, true)
    }

    // ==================== Queue & Thread ====================

    /// Queue a follow-up for the next phase boundary
    pub fn queue_message(&self, text: impl Into<String>) {
        self.lock().pending.push(text);
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Take everything queued so far, leaving the queue empty
    pub(crate) fn drain_pending(&self) -> Vec<String> {
        self.lock().pending.drain()
    }

    pub fn record_message(&self, message: ConversationMessage) {
        self.lock().thread.push(message);
    }

    pub fn conversation(&self) -> Vec<ConversationMessage> {
        self.lock().thread.clone()
    }
}

impl PhaseReader for SessionContext {
    fn phase(&self) -> Phase {
        self.lock().phase
    }
}

/// Sole writer of the phase and of authoritative results
pub(crate) struct PhaseWriter {
    context: Arc<SessionContext>,
}

impl PhaseWriter {
    pub(crate) fn new(context: Arc<SessionContext>) -> Self {
        Self { context }
    }

    /// Move to `phase`. Returns false when already there.
    pub(crate) fn set(&self, phase: Phase) -> bool {
        let mut state = self.context.lock();
        if state.phase == phase {
            return false;
        }
        state.phase = phase;
        true
    }

    pub(crate) fn publish_results(&self, themes: Vec<ThemeCluster>) {
        let mut state = self.context.lock();
        state.results = themes;
        state.results_provisional = false;
    }

    /// Clear all per-question state and return to idle. Profiles are kept.
    pub(crate) fn reset(&self) {
        let mut state = self.context.lock();
        for agent in &mut state.agents {
            agent.reset();
        }
        state.phase = Phase::Idle;
        state.question = None;
        state.results.clear();
        state.results_provisional = false;
        state.groups.clear();
        state.pending.clear();
        state.thread.clear();
        state.memory_context = None;
        state.history_saved = false;
    }
}

/// Writer for the background clusterer's interim results
pub(crate) struct ProvisionalWriter {
    context: Arc<SessionContext>,
}

impl ProvisionalWriter {
    pub(crate) fn new(context: Arc<SessionContext>) -> Self {
        Self { context }
    }

    /// Store `themes` unless clustering has begun or `cancel` has fired.
    ///
    /// The phase and the token are checked under the session lock, so no write
    /// lands after the orchestrator enters clustering.
    pub(crate) fn publish(&self, themes: Vec<ThemeCluster>, cancel: &CancellationToken) -> bool {
        let mut state = self.context.lock();
        if cancel.is_cancelled() || state.phase.is_final_stretch() {
            return false;
        }
        state.results = themes;
        state.results_provisional = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deliberation_domain::TraceEntry;

    fn context() -> Arc<SessionContext> {
        Arc::new(SessionContext::new(vec![
            AgentProfile::new("a1", "Ada", "A baker."),
            AgentProfile::new("a2", "Bo", "A sailor."),
        ]))
    }

    #[test]
    fn test_duplicate_profiles_ignored() {
        let context = SessionContext::new(vec![
            AgentProfile::new("a1", "Ada", "A baker."),
            AgentProfile::new("a1", "Ada again", "A baker."),
        ]);
        assert_eq!(context.agent_count(), 1);
    }

    #[test]
    fn test_update_agent_is_read_modify_write() {
        let context = context();
        let id = AgentId::from("a1");
        context.update_agent(&id, |r| r.push_trace(TraceEntry::reasoning("one")));
        context.update_agent(&id, |r| r.push_trace(TraceEntry::reasoning("two")));
        let record = context.agent(&id).unwrap();
        assert_eq!(record.rendered_trace(), vec!["one", "two"]);
        assert!(context.update_agent(&AgentId::from("ghost"), |_| ()).is_none());
    }

    #[test]
    fn test_answers_skip_unanswered() {
        let context = context();
        context.update_agent(&AgentId::from("a2"), |r| r.set_answer("no"));
        assert_eq!(context.answers(), vec![AnswerEntry::new("a2", "no")]);
    }

    #[test]
    fn test_drain_twice() {
        let context = context();
        context.queue_message("follow-up");
        assert_eq!(context.drain_pending(), vec!["follow-up"]);
        assert!(context.drain_pending().is_empty());
    }

    #[test]
    fn test_phase_writer_ignores_repeat() {
        let context = context();
        let writer = PhaseWriter::new(Arc::clone(&context));
        assert!(writer.set(Phase::Thinking));
        assert!(!writer.set(Phase::Thinking));
        assert_eq!(context.phase(), Phase::Thinking);
    }

    #[test]
    fn test_provisional_gated_on_phase() {
        let context = context();
        let phases = PhaseWriter::new(Arc::clone(&context));
        let provisional = ProvisionalWriter::new(Arc::clone(&context));
        let token = CancellationToken::new();

        phases.set(Phase::Discussing);
        assert!(provisional.publish(vec![ThemeCluster::new("Early", vec!["a1".into()])], &token));
        assert!(context.results_are_provisional());

        phases.set(Phase::Clustering);
        assert!(!provisional.publish(vec![ThemeCluster::new("Late", vec![])], &token));
        assert_eq!(context.results()[0].label, "Early");

        phases.publish_results(vec![ThemeCluster::new("Final", vec!["a1".into()])]);
        assert!(!context.results_are_provisional());
    }

    #[test]
    fn test_provisional_gated_on_cancel() {
        let context = context();
        let provisional = ProvisionalWriter::new(Arc::clone(&context));
        let token = CancellationToken::new();
        token.cancel();
        assert!(!provisional.publish(vec![ThemeCluster::new("Late", vec![])], &token));
        assert!(context.results().is_empty());
    }

    #[test]
    fn test_history_claim_once() {
        let context = context();
        assert!(context.claim_history_save());
        assert!(!context.claim_history_save());
    }

    #[test]
    fn test_reset_clears_question_state() {
        let context = context();
        let phases = PhaseWriter::new(Arc::clone(&context));
        context.set_question(Question::parse("Move?").unwrap());
        context.update_agent(&AgentId::from("a1"), |r| {
            r.push_trace(TraceEntry::reasoning("thought"));
            r.set_answer("yes");
        });
        context.queue_message("later");
        context.record_message(ConversationMessage::user("Move?"));
        context.claim_history_save();
        phases.set(Phase::Complete);

        phases.reset();

        assert_eq!(context.phase(), Phase::Idle);
        assert!(context.question().is_none());
        assert!(context.answers().is_empty());
        assert_eq!(context.pending_count(), 0);
        assert!(context.conversation().is_empty());
        assert!(context.claim_history_save());
        assert_eq!(context.agent_count(), 2);
    }
}
