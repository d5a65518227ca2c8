//! Domain layer for crowd-deliberation
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Deliberation
//!
//! A crowd of persona-backed agents answers a question in phases:
//!
//! - **Thinking**: every agent forms an opinion on its own
//! - **Discussing**: nearby agents gather in circles and talk it over
//! - **Re-thinking**: agents that discussed revise their opinion
//! - **Clustering**: answers are summarized into themes
//!
//! ## Grouping
//!
//! Discussion circles come from proximity in the world: see
//! [`world::grouping::form_groups`].

pub mod agent;
pub mod clustering;
pub mod config;
pub mod core;
pub mod discussion;
pub mod history;
pub mod memory;
pub mod prompt;
pub mod session;
pub mod world;

// Re-export commonly used types
pub use agent::{
    entities::{AgentId, AgentProfile, AgentRecord},
    trace::TraceEntry,
};
pub use clustering::{
    theme::{AnswerEntry, ClusterMode, Sentiment, ThemeCluster},
    validation::{ThemeViolation, UNCLASSIFIED_LABEL, check_exclusive, normalize_exclusive},
};
pub use config::OutputFormat;
pub use core::{error::DomainError, question::Question, string::preview};
pub use discussion::group::DiscussionGroup;
pub use history::HistoryRecord;
pub use memory::{
    entities::{ConversationMessage, MemoryRecord, MessageRole, render_conversation},
    similarity::cosine_similarity,
};
pub use prompt::{ParticipantRef, PromptTemplate};
pub use session::{phase::Phase, queue::PendingQueue, summary::DeliberationSummary};
pub use world::{
    circle::{CircleSlot, arrange_in_circle, circle_points},
    geometry::{Position, centroid},
    grouping::{GroupingParams, PositionedAgent, form_groups},
    random::{RandomSource, ScriptedRandom, StdRandom, between, sample, shuffle},
};
