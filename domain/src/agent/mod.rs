//! Agent domain
//!
//! A simulated participant: an immutable profile (id, name, persona) plus the
//! per-question runtime record (reasoning trace and current answer).

pub mod entities;
pub mod trace;
