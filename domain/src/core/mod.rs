//! Core domain concepts shared across all subdomains.
//!
//! - [`question::Question`]: a validated question posed to the crowd
//! - [`error::DomainError`]: domain-level errors
//! - [`string`]: display helpers for bubbles and summaries

pub mod error;
pub mod question;
pub mod string;
