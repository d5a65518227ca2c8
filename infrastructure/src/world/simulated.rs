//! A world without a renderer.
//!
//! Agents stand at points inside a rectangle. Walk commands move them
//! instantly; a released agent wanders a short random distance so the next
//! discussion round sees a slightly different crowd. Bubbles are kept for
//! inspection and logged at debug level.

use deliberation_application::{WorldError, WorldPort};
use deliberation_domain::{AgentId, Position, PositionedAgent, RandomSource};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

const WANDER_DISTANCE: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleKind {
    Thought,
    Speech,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub agent: AgentId,
    pub kind: BubbleKind,
    pub text: String,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    position: Position,
    facing: Option<Position>,
}

#[derive(Default)]
struct WorldState {
    agents: BTreeMap<AgentId, Placement>,
    bubbles: Vec<Bubble>,
}

pub struct SimulatedWorld {
    width: f64,
    height: f64,
    random: Arc<dyn RandomSource>,
    state: Mutex<WorldState>,
}

impl SimulatedWorld {
    pub fn new(width: f64, height: f64, random: Arc<dyn RandomSource>) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
            random,
            state: Mutex::new(WorldState::default()),
        }
    }

    /// Place each agent at a uniformly random point
    pub fn spawn<'a>(&self, ids: impl IntoIterator<Item = &'a AgentId>) {
        let mut state = self.lock();
        for id in ids {
            let position = self.random_point();
            state.agents.insert(
                id.clone(),
                Placement {
                    position,
                    facing: None,
                },
            );
        }
    }

    /// Place one agent at an exact point
    pub fn place(&self, id: impl Into<AgentId>, position: Position) {
        self.lock().agents.insert(
            id.into(),
            Placement {
                position,
                facing: None,
            },
        );
    }

    pub fn position_of(&self, id: &AgentId) -> Option<Position> {
        self.lock().agents.get(id).map(|p| p.position)
    }

    pub fn facing_of(&self, id: &AgentId) -> Option<Position> {
        self.lock().agents.get(id).and_then(|p| p.facing)
    }

    pub fn bubbles(&self) -> Vec<Bubble> {
        self.lock().bubbles.clone()
    }

    fn random_point(&self) -> Position {
        Position::new(
            self.random.next_index(self.width as usize) as f64,
            self.random.next_index(self.height as usize) as f64,
        )
    }

    fn wander(&self, from: Position) -> Position {
        let span = 2 * WANDER_DISTANCE + 1;
        let dx = self.random.next_index(span) as f64 - WANDER_DISTANCE as f64;
        let dy = self.random.next_index(span) as f64 - WANDER_DISTANCE as f64;
        Position::new(
            (from.x + dx).clamp(0.0, self.width),
            (from.y + dy).clamp(0.0, self.height),
        )
    }

    fn lock(&self) -> MutexGuard<'_, WorldState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn bubble(&self, agent: &AgentId, kind: BubbleKind, text: &str, duration: Duration) -> Result<(), WorldError> {
        let mut state = self.lock();
        if !state.agents.contains_key(agent) {
            return Err(WorldError::UnknownAgent(agent.clone()));
        }
        debug!("{:?} bubble over {}: {}", kind, agent, text);
        state.bubbles.push(Bubble {
            agent: agent.clone(),
            kind,
            text: text.to_string(),
            duration,
        });
        Ok(())
    }
}

impl WorldPort for SimulatedWorld {
    fn positions(&self) -> Vec<PositionedAgent> {
        self.lock()
            .agents
            .iter()
            .map(|(id, placement)| PositionedAgent::new(id.clone(), placement.position))
            .collect()
    }

    fn walk_to(&self, agent: &AgentId, target: Position, facing: Position) -> Result<(), WorldError> {
        let mut state = self.lock();
        let placement = state
            .agents
            .get_mut(agent)
            .ok_or_else(|| WorldError::UnknownAgent(agent.clone()))?;
        placement.position = target;
        placement.facing = Some(facing);
        Ok(())
    }

    fn release(&self, agent: &AgentId) -> Result<(), WorldError> {
        let current = self
            .position_of(agent)
            .ok_or_else(|| WorldError::UnknownAgent(agent.clone()))?;
        let next = self.wander(current);
        let mut state = self.lock();
        if let Some(placement) = state.agents.get_mut(agent) {
            placement.position = next;
            placement.facing = None;
        }
        Ok(())
    }

    fn show_thought(&self, agent: &AgentId, text: &str, duration: Duration) -> Result<(), WorldError> {
        self.bubble(agent, BubbleKind::Thought, text, duration)
    }

    fn show_speech(&self, agent: &AgentId, text: &str, duration: Duration) -> Result<(), WorldError> {
        self.bubble(agent, BubbleKind::Speech, text, duration)
    }
}
