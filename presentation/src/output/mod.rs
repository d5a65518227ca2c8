//! Output formatting for deliberation results

pub mod console;
