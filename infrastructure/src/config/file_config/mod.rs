//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod discussion;
mod history;
mod logging;
mod memory;
mod output;
mod pipeline;
mod provider;
mod session;
mod world;

pub use discussion::FileDiscussionConfig;
pub use history::FileHistoryConfig;
pub use logging::FileLoggingConfig;
pub use memory::FileMemoryConfig;
pub use output::FileOutputConfig;
pub use pipeline::FilePipelineConfig;
pub use provider::{FileProviderConfig, ProviderKind};
pub use session::FileSessionConfig;
pub use world::FileWorldConfig;

use deliberation_application::PipelineParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Problems found in a loaded configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("discussion group sizes must satisfy 2 <= min <= max (got min {min}, max {max})")]
    InvalidGroupSize { min: usize, max: usize },

    #[error("{field} cannot be 0")]
    Zero { field: &'static str },

    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} is capped at {max} (got {value})")]
    AboveMaximum {
        field: &'static str,
        value: usize,
        max: usize,
    },

    #[error("{field} must be within [0, 1] (got {value})")]
    OutOfUnitRange { field: &'static str, value: f32 },

    #[error("provider.base_url is required for the endpoint provider")]
    MissingBaseUrl,

    #[error("memory is enabled but memory.access_token is not set; memory features stay off")]
    MissingAccessToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Startup continues
    Warning,
    /// Startup aborts
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub error: ConfigValidationError,
}

impl ConfigIssue {
    fn error(error: ConfigValidationError) -> Self {
        Self {
            severity: Severity::Error,
            error,
        }
    }

    fn warning(error: ConfigValidationError) -> Self {
        Self {
            severity: Severity::Warning,
            error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub session: FileSessionConfig,
    pub pipeline: FilePipelineConfig,
    pub discussion: FileDiscussionConfig,
    pub world: FileWorldConfig,
    pub provider: FileProviderConfig,
    pub memory: FileMemoryConfig,
    pub history: FileHistoryConfig,
    pub output: FileOutputConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        use ConfigValidationError::*;

        let mut issues = Vec::new();

        let d = &self.discussion;
        if d.min_group_size < 2 || d.max_group_size < d.min_group_size {
            issues.push(ConfigIssue::error(InvalidGroupSize {
                min: d.min_group_size,
                max: d.max_group_size,
            }));
        }
        for (field, value) in [
            ("discussion.proximity_threshold", d.proximity_threshold),
            ("discussion.circle_radius", d.circle_radius),
            ("world.width", self.world.width),
            ("world.height", self.world.height),
        ] {
            if value.is_nan() || value <= 0.0 {
                issues.push(ConfigIssue::error(NotPositive { field, value }));
            }
        }

        for (field, value) in [
            ("session.agents", self.session.agents),
            ("pipeline.think_batch_size", self.pipeline.think_batch_size),
            (
                "pipeline.background_interval_secs",
                self.pipeline.background_interval_secs as usize,
            ),
        ] {
            if value == 0 {
                issues.push(ConfigIssue::error(Zero { field }));
            }
        }

        if self.pipeline.thought_sample_size > PipelineParams::MAX_THOUGHT_BUBBLES {
            issues.push(ConfigIssue::warning(AboveMaximum {
                field: "pipeline.thought_sample_size",
                value: self.pipeline.thought_sample_size,
                max: PipelineParams::MAX_THOUGHT_BUBBLES,
            }));
        }

        let m = &self.memory;
        for (field, value) in [
            ("memory.dedup_threshold", m.dedup_threshold),
            ("memory.recall_threshold", m.recall_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                issues.push(ConfigIssue::error(OutOfUnitRange { field, value }));
            }
        }
        if m.enabled && m.access_token.as_deref().is_none_or(|t| t.trim().is_empty()) {
            issues.push(ConfigIssue::warning(MissingAccessToken));
        }

        if self.provider.resolved_base_url().is_none() {
            issues.push(ConfigIssue::error(MissingBaseUrl));
        }

        issues
    }
}
