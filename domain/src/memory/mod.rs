//! Long-term memory about the person asking

pub mod entities;
pub mod similarity;
