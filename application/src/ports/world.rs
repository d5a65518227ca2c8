//! World port
//!
//! The world owns agent positions and everything visual. The pipeline reads
//! positions once per discussion round and otherwise only issues commands.

use deliberation_domain::{AgentId, Position, PositionedAgent};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorldError {
    #[error("Agent not in world: {0}")]
    UnknownAgent(AgentId),

    #[error("World unavailable: {0}")]
    Unavailable(String),
}

pub trait WorldPort: Send + Sync {
    /// Current position of every agent in the world
    fn positions(&self) -> Vec<PositionedAgent>;

    /// Walk to `target` and face `facing` on arrival
    fn walk_to(&self, agent: &AgentId, target: Position, facing: Position) -> Result<(), WorldError>;

    /// Send an agent back to wandering
    fn release(&self, agent: &AgentId) -> Result<(), WorldError>;

    fn show_thought(&self, agent: &AgentId, text: &str, duration: Duration) -> Result<(), WorldError>;

    fn show_speech(&self, agent: &AgentId, text: &str, duration: Duration) -> Result<(), WorldError>;
}
