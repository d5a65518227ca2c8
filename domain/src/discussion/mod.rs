//! Discussion domain
//!
//! A [`group::DiscussionGroup`] is formed once per discussion round and lives
//! only for that round.

pub mod group;
