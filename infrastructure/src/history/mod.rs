//! History repositories
//!
//! - [`JsonlHistoryRepository`]: one JSON line per completed question
//! - [`InMemoryHistoryRepository`]: process-local, for `--no-history` runs and tests

mod jsonl;
mod memory;

pub use jsonl::JsonlHistoryRepository;
pub use memory::InMemoryHistoryRepository;
