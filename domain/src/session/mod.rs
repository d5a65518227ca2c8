//! Session domain
//!
//! The phase state machine value, the follow-up queue and the end-of-run
//! summary.

pub mod phase;
pub mod queue;
pub mod summary;
