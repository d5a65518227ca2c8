//! Session state shared between the pipeline, the background clusterer and
//! readers such as the REPL.

pub mod context;

pub use context::{PhaseReader, SessionContext};
pub(crate) use context::{PhaseWriter, ProvisionalWriter};
