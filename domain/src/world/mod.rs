//! Spatial concerns: positions, discussion-group formation and circle layout.
//!
//! The world itself (movement, rendering) lives outside the domain. These are
//! pure functions over positions, with randomness supplied by a
//! [`random::RandomSource`] so outcomes can be fixed in tests.

pub mod circle;
pub mod geometry;
pub mod grouping;
pub mod random;
