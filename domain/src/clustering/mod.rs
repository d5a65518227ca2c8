//! Theme clustering domain

pub mod theme;
pub mod validation;
