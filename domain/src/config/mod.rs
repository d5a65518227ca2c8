//! Settings shared by the config file, the CLI and the formatter
//!
//! Only value objects live here; loading belongs to infrastructure.

mod output_format;

pub use output_format::OutputFormat;
