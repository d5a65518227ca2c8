//! Headless world and the persona roster that populates it

mod personas;
mod simulated;

pub use personas::{PersonaCatalog, PersonaError};
pub use simulated::{Bubble, BubbleKind, SimulatedWorld};
