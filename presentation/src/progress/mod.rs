//! Progress reporting during a deliberation

pub mod reporter;
