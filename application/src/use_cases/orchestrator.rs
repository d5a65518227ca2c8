//! Deliberation orchestrator
//!
//! Drives one question through the phases:
//!
//! ```text
//! thinking -> discussing -> re-thinking -> clustering -> complete
//! ```
//!
//! The follow-up queue is drained at every boundary. Anything queued there
//! short-circuits the rest of the round: a follow-up think for every agent,
//! then clustering. After completion, queued follow-ups keep being processed
//! until the queue is empty.

use crate::config::PipelineParams;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::deliberation_gateway::{
    ClusterRequest, DeliberationGateway, DiscussRequest, Participant, SpeakerContext, ThinkRequest,
};
use crate::ports::history_repository::{HistoryRepository, NoHistory};
use crate::ports::progress::{DeliberationProgress, NoProgress};
use crate::ports::world::WorldPort;
use crate::session::{PhaseWriter, SessionContext};
use crate::use_cases::background_clusterer::{BackgroundClusterer, BackgroundHandle};
use crate::use_cases::memory_access::MemoryAccess;
use deliberation_domain::{
    AgentId, ClusterMode, ConversationMessage, DeliberationSummary, DomainError, GroupingParams,
    HistoryRecord, Phase, PromptTemplate, Question, RandomSource, StdRandom, TraceEntry,
    arrange_in_circle, check_exclusive, form_groups, normalize_exclusive, preview, sample, shuffle,
};
use futures::future::join_all;
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Characters of an answer shown in a thought bubble
const THOUGHT_PREVIEW_CHARS: usize = 80;
/// Characters of a discussion message shown in a speech bubble
const SPEECH_PREVIEW_CHARS: usize = 100;

/// Errors that stop a deliberation before it starts
#[derive(Error, Debug)]
pub enum DeliberationError {
    #[error("No agents in session")]
    NoAgents,

    #[error("No question has been asked yet")]
    NoQuestion,

    #[error("A deliberation is already running")]
    Busy,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Kind of think cycle; decides how the reasoning lands in the trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThinkKind {
    Organic,
    FollowUp,
}

impl ThinkKind {
    fn entry(self, reasoning: String) -> TraceEntry {
        match self {
            ThinkKind::Organic => TraceEntry::reasoning(reasoning),
            ThinkKind::FollowUp => TraceEntry::follow_up(reasoning),
        }
    }
}

#[derive(Debug, Default)]
struct RunStats {
    groups_formed: usize,
    follow_ups: usize,
    failed_calls: usize,
    short_circuited: bool,
}

/// Use case running the deliberation pipeline
pub struct DeliberationOrchestrator<G: DeliberationGateway + 'static> {
    gateway: Arc<G>,
    context: Arc<SessionContext>,
    world: Arc<dyn WorldPort>,
    history: Arc<dyn HistoryRepository>,
    memory: Option<Arc<MemoryAccess>>,
    random: Arc<dyn RandomSource>,
    progress: Arc<dyn DeliberationProgress>,
    logger: Arc<dyn ConversationLogger>,
    pipeline: PipelineParams,
    grouping: GroupingParams,
    user_id: String,
    phases: PhaseWriter,
    background: Mutex<Option<BackgroundHandle>>,
}

impl<G: DeliberationGateway + 'static> DeliberationOrchestrator<G> {
    pub fn new(gateway: Arc<G>, context: Arc<SessionContext>, world: Arc<dyn WorldPort>) -> Self {
        let phases = PhaseWriter::new(Arc::clone(&context));
        Self {
            gateway,
            context,
            world,
            history: Arc::new(NoHistory),
            memory: None,
            random: Arc::new(StdRandom::from_entropy()),
            progress: Arc::new(NoProgress),
            logger: Arc::new(NoConversationLogger),
            pipeline: PipelineParams::default(),
            grouping: GroupingParams::default(),
            user_id: "local".to_string(),
            phases,
            background: Mutex::new(None),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_history(mut self, history: Arc<dyn HistoryRepository>) -> Self {
        self.history = history;
        self
    }

    pub fn with_memory(mut self, memory: Arc<MemoryAccess>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn DeliberationProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_pipeline(mut self, pipeline: PipelineParams) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_grouping(mut self, grouping: GroupingParams) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    pub fn memory(&self) -> Option<&Arc<MemoryAccess>> {
        self.memory.as_ref()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    // ==================== Entry Points ====================

    /// Run the full pipeline for a new question
    pub async fn run(&self, question: Question) -> Result<DeliberationSummary, DeliberationError> {
        self.grouping.validate()?;
        if self.context.agent_count() == 0 {
            return Err(DeliberationError::NoAgents);
        }

        info!(
            "Starting deliberation with {} agents: {}",
            self.context.agent_count(),
            question
        );
        self.context.set_question(question.clone());
        self.enter(Phase::Thinking);
        self.start_background();

        let memory_context = match &self.memory {
            Some(memory) => memory.recall_context(question.content()).await,
            None => None,
        };
        self.context.set_memory_context(memory_context.clone());

        let mut stats = RunStats::default();
        let everyone = self.context.agent_ids();

        // Phase 1: Thinking
        self.think_cycle(&everyone, ThinkKind::Organic, memory_context.clone(), &mut stats)
            .await;

        let queued = self.context.drain_pending();
        if !queued.is_empty() {
            info!("Follow-up queued during thinking; skipping discussion");
            return Ok(self.short_circuit(queued, stats).await);
        }

        // Phase 2: Discussing
        self.enter(Phase::Discussing);
        let discussed = self.discussion_round(question.content(), &mut stats).await;

        let queued = self.context.drain_pending();
        if !queued.is_empty() {
            info!("Follow-up queued during discussion; skipping re-think");
            self.release_all();
            return Ok(self.short_circuit(queued, stats).await);
        }

        // Phase 3: Re-thinking
        self.enter(Phase::ReThinking);
        self.release_all();
        self.think_cycle(&discussed, ThinkKind::Organic, memory_context, &mut stats)
            .await;

        // Phase 4: Clustering
        self.finalize(true).await;
        self.follow_up_loop(&mut stats).await;

        Ok(self.summary(stats))
    }

    /// Work through queued follow-ups for the current question
    pub async fn process_follow_ups(&self) -> Result<DeliberationSummary, DeliberationError> {
        if self.context.question().is_none() {
            return Err(DeliberationError::NoQuestion);
        }
        let mut stats = RunStats::default();
        self.follow_up_loop(&mut stats).await;
        Ok(self.summary(stats))
    }

    /// Forget the current question and return to idle
    pub fn reset(&self) {
        self.stop_background();
        self.phases.reset();
        self.release_all();
        info!("Session reset");
    }

    // ==================== Phases ====================

    fn enter(&self, phase: Phase) {
        if !self.phases.set(phase) {
            return;
        }
        info!("Phase: {}", phase);
        self.progress.on_phase_change(phase);
        self.logger.log(ConversationEvent::new(
            "phase_change",
            json!({ "phase": phase.as_str() }),
        ));
    }

    async fn short_circuit(&self, queued: Vec<String>, mut stats: RunStats) -> DeliberationSummary {
        stats.short_circuited = true;
        self.incorporate(queued, &mut stats).await;
        self.finalize(true).await;
        self.follow_up_loop(&mut stats).await;
        self.summary(stats)
    }

    async fn follow_up_loop(&self, stats: &mut RunStats) {
        loop {
            let queued = self.context.drain_pending();
            if queued.is_empty() {
                break;
            }
            self.incorporate(queued, stats).await;
            self.finalize(false).await;
        }
    }

    /// Follow-up think round for every agent
    async fn incorporate(&self, messages: Vec<String>, stats: &mut RunStats) {
        info!("Incorporating {} follow-up message(s)", messages.len());
        stats.follow_ups += messages.len();
        self.logger.log(ConversationEvent::new(
            "follow_up",
            json!({ "messages": messages }),
        ));

        self.enter(Phase::Thinking);
        self.start_background();

        let follow_up = PromptTemplate::follow_up_context(&messages);
        let extra = match self.context.memory_context() {
            Some(memory) => format!("{follow_up}\n\n{memory}"),
            None => follow_up,
        };
        let everyone = self.context.agent_ids();
        self.think_cycle(&everyone, ThinkKind::FollowUp, Some(extra), stats)
            .await;
    }

    /// Authoritative clustering, then completion
    async fn finalize(&self, save: bool) {
        self.stop_background();
        self.enter(Phase::Clustering);

        let answers = self.context.answers();
        let question = self
            .context
            .question()
            .map(Question::into_content)
            .unwrap_or_default();

        if answers.is_empty() {
            warn!("No answers to cluster; keeping previous results");
        } else {
            let request = ClusterRequest {
                answers,
                question: question.clone(),
                mode: ClusterMode::Exclusive,
            };
            match self.gateway.cluster(&request).await {
                Ok(response) => {
                    let violations = check_exclusive(&response.themes, &request.answers);
                    if !violations.is_empty() {
                        warn!(
                            "Clustering broke exclusivity in {} place(s); normalizing",
                            violations.len()
                        );
                        debug!("Violations: {:?}", violations);
                    }
                    let themes = normalize_exclusive(response.themes, &request.answers);
                    info!("Clustered {} answers into {} themes", request.answers.len(), themes.len());
                    self.phases.publish_results(themes.clone());
                    self.progress.on_results(&themes);
                    if let Some(top) = themes.first() {
                        self.context.record_message(ConversationMessage::system(format!(
                            "Most common view: {} ({} of {})",
                            top.label,
                            top.count,
                            request.answers.len()
                        )));
                    }
                    self.logger.log(ConversationEvent::new(
                        "cluster_result",
                        json!({
                            "answers": request.answers.len(),
                            "themes": themes,
                        }),
                    ));
                }
                Err(e) => warn!("Clustering failed; keeping previous results: {}", e),
            }
        }

        self.enter(Phase::Complete);

        if save && self.context.claim_history_save() {
            self.save_history(question).await;
        }
    }

    async fn save_history(&self, question: String) {
        let record = HistoryRecord::new(
            self.user_id.clone(),
            question,
            self.context.results(),
            self.context.agent_count(),
        );
        match self.history.insert(&record).await {
            Ok(()) => {
                info!("Saved question to history");
                self.logger.log(ConversationEvent::new(
                    "history_saved",
                    json!({
                        "question": record.question,
                        "themes": record.themes.len(),
                        "total_agents": record.total_agents,
                    }),
                ));
            }
            Err(e) => warn!("History save failed: {}", e),
        }
    }

    // ==================== Thinking ====================

    /// One think call per agent, `think_batch_size` at a time
    async fn think_cycle(
        &self,
        ids: &[AgentId],
        kind: ThinkKind,
        extra_context: Option<String>,
        stats: &mut RunStats,
    ) {
        let Some(question) = self.context.question() else {
            return;
        };
        info!("Think cycle for {} agents ({:?})", ids.len(), kind);
        self.progress
            .on_think_start(ids.len(), kind == ThinkKind::FollowUp);

        let bubbled: HashSet<AgentId> =
            sample(ids, self.pipeline.effective_thought_sample_size(), self.random.as_ref())
                .into_iter()
                .collect();

        for batch in ids.chunks(self.pipeline.effective_batch_size()) {
            let mut join_set = JoinSet::new();

            for id in batch {
                let Some(record) = self.context.agent(id) else {
                    continue;
                };
                let request = ThinkRequest {
                    name: record.display_name(),
                    persona: record.persona().to_string(),
                    trace: record.rendered_trace(),
                    question: question.content().to_string(),
                    extra_context: extra_context.clone(),
                };
                let gateway = Arc::clone(&self.gateway);
                let id = id.clone();

                join_set.spawn(async move {
                    let result = gateway.think(&request).await;
                    (id, result)
                });
            }

            while let Some(joined) = join_set.join_next().await {
                match joined {
                    Ok((id, Ok(response))) => {
                        debug!("Agent {} answered", id);
                        let answer = response.answer.clone();
                        self.context.update_agent(&id, |record| {
                            record.push_trace(kind.entry(response.reasoning.clone()));
                            record.set_answer(response.answer.clone());
                        });
                        self.progress.on_agent_thought(&id, true);
                        self.logger.log(ConversationEvent::new(
                            "agent_thought",
                            json!({
                                "agent": id.as_str(),
                                "follow_up": kind == ThinkKind::FollowUp,
                                "reasoning": response.reasoning,
                                "answer": response.answer,
                            }),
                        ));
                        if bubbled.contains(&id) {
                            let text = preview(&answer, THOUGHT_PREVIEW_CHARS);
                            if let Err(e) =
                                self.world.show_thought(&id, &text, self.pipeline.thought_bubble)
                            {
                                debug!("Thought bubble for {} failed: {}", id, e);
                            }
                        }
                    }
                    Ok((id, Err(e))) => {
                        warn!("Think failed for {}: {}", id, e);
                        stats.failed_calls += 1;
                        self.progress.on_agent_thought(&id, false);
                    }
                    Err(e) => {
                        warn!("Task join error: {}", e);
                        stats.failed_calls += 1;
                    }
                }
            }
        }
    }

    // ==================== Discussion ====================

    /// Form groups, walk them into circles and let every group talk.
    ///
    /// Returns the ids of every agent that was in a group.
    async fn discussion_round(&self, question: &str, stats: &mut RunStats) -> Vec<AgentId> {
        let positions = self.world.positions();
        let groups = form_groups(&positions, &self.grouping, self.random.as_ref());
        info!(
            "Formed {} discussion groups from {} agents",
            groups.len(),
            positions.len()
        );
        stats.groups_formed = groups.len();
        self.context.set_groups(groups.clone());
        self.progress.on_groups_formed(&groups);
        self.logger.log(ConversationEvent::new(
            "groups_formed",
            json!({
                "groups": groups.iter().map(|g| g.member_ids()).collect::<Vec<_>>(),
            }),
        ));

        if groups.is_empty() {
            return Vec::new();
        }

        for group in &groups {
            for slot in arrange_in_circle(group, self.grouping.circle_radius) {
                if let Err(e) = self.world.walk_to(&slot.agent, slot.target, slot.facing) {
                    debug!("Walk command for {} failed: {}", slot.agent, e);
                }
            }
        }
        pause(self.pipeline.walk_settle).await;

        let runs = groups
            .iter()
            .enumerate()
            .map(|(index, group)| self.run_group(index, group.member_ids().to_vec(), question));
        stats.failed_calls += join_all(runs).await.into_iter().sum::<usize>();

        groups
            .iter()
            .flat_map(|g| g.member_ids().iter().cloned())
            .collect()
    }

    /// One group's conversation. Returns the number of failed turns.
    async fn run_group(&self, index: usize, members: Vec<AgentId>, question: &str) -> usize {
        pause(self.pipeline.group_stagger * index as u32).await;
        debug!("Group {} starts with {} members", index, members.len());

        let participants: Vec<Participant> = members
            .iter()
            .filter_map(|id| self.context.agent(id))
            .map(|record| Participant {
                name: record.display_name(),
                persona: record.persona().to_string(),
            })
            .collect();

        let mut order = members.clone();
        shuffle(&mut order, self.random.as_ref());

        let mut failures = 0;

        for speaker in &order {
            let Some(record) = self.context.agent(speaker) else {
                continue;
            };
            let name = record.display_name();
            let request = DiscussRequest {
                participants: participants.clone(),
                question: question.to_string(),
                conversation_so_far: self.context.group_transcript(index).unwrap_or_default(),
                current_speaker: SpeakerContext {
                    name: name.clone(),
                    persona: record.persona().to_string(),
                    trace: record.rendered_trace(),
                },
            };

            match self.gateway.discuss(&request).await {
                Ok(response) => {
                    let bubble = preview(&response.message, SPEECH_PREVIEW_CHARS);
                    if let Err(e) = self.world.show_speech(speaker, &bubble, self.pipeline.speech_bubble) {
                        debug!("Speech bubble for {} failed: {}", speaker, e);
                    }

                    let line = self
                        .context
                        .update_group(index, |group| group.record_line(&name, &response.message))
                        .flatten()
                        .unwrap_or_else(|| format!("{name}: {}", response.message));

                    self.progress.on_discussion_line(index, &line);
                    self.logger.log(ConversationEvent::new(
                        "discussion_line",
                        json!({ "group": index, "speaker": speaker, "line": line }),
                    ));

                    pause(self.pipeline.speech_delay).await;
                }
                Err(e) => {
                    warn!("Discuss failed for {}: {}", speaker, e);
                    failures += 1;
                }
            }
        }

        let transcript = self.context.group_transcript(index).unwrap_or_default();
        if !transcript.is_empty() {
            for member in &members {
                self.context.update_agent(member, |record| {
                    record.push_trace(TraceEntry::discussion(transcript.clone()));
                });
            }
        }

        self.context.update_group(index, |group| group.complete());
        self.progress.on_group_complete(index);
        debug!("Group {} finished", index);
        failures
    }

    fn release_all(&self) {
        for id in self.context.agent_ids() {
            if let Err(e) = self.world.release(&id) {
                debug!("Release of {} failed: {}", id, e);
            }
        }
    }

    // ==================== Background ====================

    fn start_background(&self) {
        let clusterer = BackgroundClusterer {
            gateway: Arc::clone(&self.gateway),
            context: Arc::clone(&self.context),
            progress: Arc::clone(&self.progress),
            logger: Arc::clone(&self.logger),
            period: self.pipeline.background_interval,
        };
        let handle = clusterer.spawn();
        let previous = self
            .background
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(handle);
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    fn stop_background(&self) {
        let handle = self
            .background
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            debug!("Cancelling background clusterer");
            handle.cancel();
        }
    }

    fn summary(&self, stats: RunStats) -> DeliberationSummary {
        DeliberationSummary {
            question: self
                .context
                .question()
                .map(Question::into_content)
                .unwrap_or_default(),
            themes: self.context.results(),
            total_agents: self.context.agent_count(),
            answered: self.context.answers().len(),
            groups_formed: stats.groups_formed,
            follow_ups: stats.follow_ups,
            failed_calls: stats.failed_calls,
            short_circuited: stats.short_circuited,
        }
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
