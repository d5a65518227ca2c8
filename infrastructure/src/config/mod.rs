//! Configuration file loading for crowd-deliberation
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `DELIBERATION_*` environment variables (`__` separates nested keys)
//! 2. `--config <path>` specified file
//! 3. Project root: `./deliberation.toml` or `./.deliberation.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/crowd-deliberation/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, ConfigValidationError, FileConfig, FileDiscussionConfig, FileHistoryConfig,
    FileLoggingConfig, FileMemoryConfig, FileOutputConfig, FilePipelineConfig, FileProviderConfig,
    FileSessionConfig, FileWorldConfig, ProviderKind, Severity,
};
pub use loader::ConfigLoader;
