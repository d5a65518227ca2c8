//! Scripted adapters shared by the use case tests

use crate::ports::deliberation_gateway::{
    ChatRequest, ChatResponse, ClusterRequest, ClusterResponse, DeliberationGateway,
    DiscussRequest, DiscussResponse, GatewayError, ThinkRequest, ThinkResponse,
};
use crate::ports::history_repository::{HistoryError, HistoryRepository};
use crate::ports::memory_gateway::{
    ExtractRequest, ExtractResponse, MemoryError, MemoryGateway, RecallRequest, RecallResponse,
};
use crate::ports::progress::DeliberationProgress;
use crate::ports::world::{WorldError, WorldPort};
use async_trait::async_trait;
use deliberation_domain::{
    AgentId, AgentProfile, ClusterMode, DiscussionGroup, HistoryRecord, Phase, Position,
    PositionedAgent, ThemeCluster,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

type ThinkHook = Box<dyn Fn(&ThinkRequest) + Send + Sync>;
type AnswerFn = Box<dyn Fn(&ThinkRequest) -> String + Send + Sync>;

/// `character_0001` .. `character_000n`, named `Person 1` ..
pub(crate) fn profiles(n: usize) -> Vec<AgentProfile> {
    (1..=n)
        .map(|i| {
            AgentProfile::new(
                format!("character_{i:04}"),
                format!("Person {i}"),
                format!("Persona of person {i}."),
            )
        })
        .collect()
}

/// Gateway answering every call from a script and recording requests
pub(crate) struct ScriptedGateway {
    answer: AnswerFn,
    think_hook: Option<ThinkHook>,
    think_delay: Duration,
    failing_thinkers: HashSet<String>,
    failing_speakers: HashSet<String>,
    exclusive_themes: Option<Vec<ThemeCluster>>,
    overlap_themes: Vec<ThemeCluster>,
    cluster_delay: Duration,
    cluster_fails: bool,
    think_calls: Mutex<Vec<ThinkRequest>>,
    discuss_calls: Mutex<Vec<DiscussRequest>>,
    cluster_calls: Mutex<Vec<ClusterRequest>>,
    chat_calls: Mutex<Vec<ChatRequest>>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self {
            answer: Box::new(|_| "yes".to_string()),
            think_hook: None,
            think_delay: Duration::ZERO,
            failing_thinkers: HashSet::new(),
            failing_speakers: HashSet::new(),
            exclusive_themes: None,
            overlap_themes: Vec::new(),
            cluster_delay: Duration::ZERO,
            cluster_fails: false,
            think_calls: Mutex::new(Vec::new()),
            discuss_calls: Mutex::new(Vec::new()),
            cluster_calls: Mutex::new(Vec::new()),
            chat_calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_answers(
        mut self,
        answer: impl Fn(&ThinkRequest) -> String + Send + Sync + 'static,
    ) -> Self {
        self.answer = Box::new(answer);
        self
    }

    /// Run `hook` at the start of every think call
    pub(crate) fn with_think_hook(mut self, hook: impl Fn(&ThinkRequest) + Send + Sync + 'static) -> Self {
        self.think_hook = Some(Box::new(hook));
        self
    }

    pub(crate) fn with_think_delay(mut self, delay: Duration) -> Self {
        self.think_delay = delay;
        self
    }

    pub(crate) fn failing_think_for(mut self, name: &str) -> Self {
        self.failing_thinkers.insert(name.to_string());
        self
    }

    pub(crate) fn failing_discuss_for(mut self, name: &str) -> Self {
        self.failing_speakers.insert(name.to_string());
        self
    }

    /// Fixed response for exclusive calls; by default answers are grouped by text
    pub(crate) fn with_exclusive_themes(mut self, themes: Vec<ThemeCluster>) -> Self {
        self.exclusive_themes = Some(themes);
        self
    }

    pub(crate) fn with_overlap_themes(mut self, themes: Vec<ThemeCluster>) -> Self {
        self.overlap_themes = themes;
        self
    }

    pub(crate) fn with_cluster_delay(mut self, delay: Duration) -> Self {
        self.cluster_delay = delay;
        self
    }

    pub(crate) fn failing_cluster(mut self) -> Self {
        self.cluster_fails = true;
        self
    }

    pub(crate) fn think_calls(&self) -> Vec<ThinkRequest> {
        self.think_calls.lock().unwrap().clone()
    }

    pub(crate) fn discuss_calls(&self) -> Vec<DiscussRequest> {
        self.discuss_calls.lock().unwrap().clone()
    }

    pub(crate) fn cluster_calls(&self) -> Vec<ClusterRequest> {
        self.cluster_calls.lock().unwrap().clone()
    }

    pub(crate) fn cluster_modes(&self) -> Vec<ClusterMode> {
        self.cluster_calls().iter().map(|c| c.mode).collect()
    }

    pub(crate) fn chat_calls(&self) -> Vec<ChatRequest> {
        self.chat_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliberationGateway for ScriptedGateway {
    async fn think(&self, request: &ThinkRequest) -> Result<ThinkResponse, GatewayError> {
        self.think_calls.lock().unwrap().push(request.clone());
        if let Some(hook) = &self.think_hook {
            hook(request);
        }
        if !self.think_delay.is_zero() {
            tokio::time::sleep(self.think_delay).await;
        }
        if self.failing_thinkers.contains(&request.name) {
            return Err(GatewayError::Status {
                status: 500,
                message: "scripted failure".to_string(),
            });
        }
        Ok(ThinkResponse {
            reasoning: format!("{} reasoning #{}", request.name, request.trace.len() + 1),
            answer: (self.answer)(request),
        })
    }

    async fn discuss(&self, request: &DiscussRequest) -> Result<DiscussResponse, GatewayError> {
        self.discuss_calls.lock().unwrap().push(request.clone());
        let name = &request.current_speaker.name;
        if self.failing_speakers.contains(name) {
            return Err(GatewayError::Timeout);
        }
        Ok(DiscussResponse {
            speaker: "someone else".to_string(),
            message: format!("{name} weighs in"),
        })
    }

    async fn cluster(&self, request: &ClusterRequest) -> Result<ClusterResponse, GatewayError> {
        self.cluster_calls.lock().unwrap().push(request.clone());
        if !self.cluster_delay.is_zero() {
            tokio::time::sleep(self.cluster_delay).await;
        }
        if self.cluster_fails {
            return Err(GatewayError::MalformedResponse("scripted failure".to_string()));
        }
        let themes = match request.mode {
            ClusterMode::Overlap => self.overlap_themes.clone(),
            ClusterMode::Exclusive => match &self.exclusive_themes {
                Some(themes) => themes.clone(),
                None => {
                    let mut by_answer: BTreeMap<&str, Vec<AgentId>> = BTreeMap::new();
                    for entry in &request.answers {
                        by_answer
                            .entry(entry.answer.as_str())
                            .or_default()
                            .push(entry.agent_id.clone());
                    }
                    by_answer
                        .into_iter()
                        .map(|(answer, ids)| ThemeCluster::new(answer, ids))
                        .collect()
                }
            },
        };
        Ok(ClusterResponse { themes })
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        self.chat_calls.lock().unwrap().push(request.clone());
        Ok(ChatResponse {
            reply: format!("{} replies to: {}", request.name, request.user_message),
        })
    }
}

/// World with fixed positions that records every command
#[derive(Default)]
pub(crate) struct RecordingWorld {
    positions: Vec<PositionedAgent>,
    pub(crate) walks: Mutex<Vec<(AgentId, Position)>>,
    pub(crate) releases: Mutex<Vec<AgentId>>,
    pub(crate) thoughts: Mutex<Vec<(AgentId, String)>>,
    pub(crate) speeches: Mutex<Vec<(AgentId, String)>>,
}

impl RecordingWorld {
    pub(crate) fn new(positions: Vec<PositionedAgent>) -> Self {
        Self {
            positions,
            ..Default::default()
        }
    }

    /// Agents `character_0001..` laid out in pairs 50 apart, pairs 1000 apart
    pub(crate) fn pairs(n: usize) -> Self {
        Self::new(
            (1..=n)
                .map(|i| {
                    let pair = (i - 1) / 2;
                    let offset = if i % 2 == 0 { 50.0 } else { 0.0 };
                    PositionedAgent::new(
                        format!("character_{i:04}"),
                        Position::new(pair as f64 * 1000.0 + offset, 0.0),
                    )
                })
                .collect(),
        )
    }

    /// Agents spread so far apart that nobody groups
    pub(crate) fn scattered(n: usize) -> Self {
        Self::new(
            (1..=n)
                .map(|i| {
                    PositionedAgent::new(
                        format!("character_{i:04}"),
                        Position::new(i as f64 * 1000.0, 0.0),
                    )
                })
                .collect(),
        )
    }

    pub(crate) fn thought_count(&self) -> usize {
        self.thoughts.lock().unwrap().len()
    }
}

impl WorldPort for RecordingWorld {
    fn positions(&self) -> Vec<PositionedAgent> {
        self.positions.clone()
    }

    fn walk_to(&self, agent: &AgentId, target: Position, _facing: Position) -> Result<(), WorldError> {
        self.walks.lock().unwrap().push((agent.clone(), target));
        Ok(())
    }

    fn release(&self, agent: &AgentId) -> Result<(), WorldError> {
        self.releases.lock().unwrap().push(agent.clone());
        Ok(())
    }

    fn show_thought(&self, agent: &AgentId, text: &str, _duration: Duration) -> Result<(), WorldError> {
        self.thoughts.lock().unwrap().push((agent.clone(), text.to_string()));
        Err(WorldError::Unavailable("bubbles are best effort".to_string()))
    }

    fn show_speech(&self, agent: &AgentId, text: &str, _duration: Duration) -> Result<(), WorldError> {
        self.speeches.lock().unwrap().push((agent.clone(), text.to_string()));
        Ok(())
    }
}

/// Progress notifier recording phases and result callbacks
#[derive(Default)]
pub(crate) struct RecordingProgress {
    phases: Mutex<Vec<Phase>>,
    provisional: Mutex<usize>,
    results: Mutex<usize>,
    lines: Mutex<Vec<(usize, String)>>,
    groups: Mutex<Vec<usize>>,
}

impl RecordingProgress {
    pub(crate) fn phases(&self) -> Vec<Phase> {
        self.phases.lock().unwrap().clone()
    }

    pub(crate) fn provisional_count(&self) -> usize {
        *self.provisional.lock().unwrap()
    }

    pub(crate) fn results_count(&self) -> usize {
        *self.results.lock().unwrap()
    }

    pub(crate) fn lines(&self) -> Vec<(usize, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub(crate) fn completed_groups(&self) -> Vec<usize> {
        self.groups.lock().unwrap().clone()
    }
}

impl DeliberationProgress for RecordingProgress {
    fn on_phase_change(&self, phase: Phase) {
        self.phases.lock().unwrap().push(phase);
    }

    fn on_groups_formed(&self, _groups: &[DiscussionGroup]) {}

    fn on_discussion_line(&self, group_index: usize, line: &str) {
        self.lines.lock().unwrap().push((group_index, line.to_string()));
    }

    fn on_group_complete(&self, group_index: usize) {
        self.groups.lock().unwrap().push(group_index);
    }

    fn on_provisional_results(&self, _themes: &[ThemeCluster]) {
        *self.provisional.lock().unwrap() += 1;
    }

    fn on_results(&self, _themes: &[ThemeCluster]) {
        *self.results.lock().unwrap() += 1;
    }
}

/// History kept in memory; optionally failing every insert
#[derive(Default)]
pub(crate) struct MemoryHistory {
    records: Mutex<Vec<HistoryRecord>>,
    attempts: Mutex<usize>,
    fail: bool,
}

impl MemoryHistory {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub(crate) fn records(&self) -> Vec<HistoryRecord> {
        self.records.lock().unwrap().clone()
    }

    pub(crate) fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl HistoryRepository for MemoryHistory {
    async fn insert(&self, record: &HistoryRecord) -> Result<(), HistoryError> {
        *self.attempts.lock().unwrap() += 1;
        if self.fail {
            return Err(HistoryError::Storage("disk full".to_string()));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<HistoryRecord>, HistoryError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

enum MemoryScript {
    Memories(Vec<String>),
    Unauthorized,
    Failing,
}

/// Memory gateway with a fixed outcome
pub(crate) struct ScriptedMemory {
    script: MemoryScript,
    calls: Mutex<usize>,
    last_extract: Mutex<Option<ExtractRequest>>,
}

impl ScriptedMemory {
    fn new(script: MemoryScript) -> Self {
        Self {
            script,
            calls: Mutex::new(0),
            last_extract: Mutex::new(None),
        }
    }

    pub(crate) fn with_memories(memories: Vec<&str>) -> Self {
        Self::new(MemoryScript::Memories(
            memories.into_iter().map(str::to_string).collect(),
        ))
    }

    pub(crate) fn unauthorized() -> Self {
        Self::new(MemoryScript::Unauthorized)
    }

    pub(crate) fn failing() -> Self {
        Self::new(MemoryScript::Failing)
    }

    pub(crate) fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub(crate) fn last_extract(&self) -> Option<ExtractRequest> {
        self.last_extract.lock().unwrap().clone()
    }

    fn outcome(&self) -> Result<Vec<String>, MemoryError> {
        *self.calls.lock().unwrap() += 1;
        match &self.script {
            MemoryScript::Memories(memories) => Ok(memories.clone()),
            MemoryScript::Unauthorized => Err(MemoryError::Unauthorized),
            MemoryScript::Failing => Err(MemoryError::Backend("store offline".to_string())),
        }
    }
}

#[async_trait]
impl MemoryGateway for ScriptedMemory {
    async fn extract(&self, request: &ExtractRequest) -> Result<ExtractResponse, MemoryError> {
        *self.last_extract.lock().unwrap() = Some(request.clone());
        self.outcome()?;
        Ok(ExtractResponse {
            stored: request.messages.len(),
            total: request.messages.len(),
        })
    }

    async fn recall(&self, _request: &RecallRequest) -> Result<RecallResponse, MemoryError> {
        Ok(RecallResponse {
            memories: self.outcome()?,
        })
    }
}
