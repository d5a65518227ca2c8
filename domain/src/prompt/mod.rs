//! Prompt domain
//!
//! System prompts for each remote call of the deliberation flow.

mod template;

pub use template::{ParticipantRef, PromptTemplate};
