//! Discussion geometry from TOML (`[discussion]` section)

use deliberation_domain::GroupingParams;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiscussionConfig {
    pub proximity_threshold: f64,
    pub min_group_size: usize,
    pub max_group_size: usize,
    pub circle_radius: f64,
}

impl Default for FileDiscussionConfig {
    fn default() -> Self {
        let defaults = GroupingParams::default();
        Self {
            proximity_threshold: defaults.proximity_threshold,
            min_group_size: defaults.min_group_size,
            max_group_size: defaults.max_group_size,
            circle_radius: defaults.circle_radius,
        }
    }
}

impl FileDiscussionConfig {
    pub fn to_grouping(&self) -> GroupingParams {
        GroupingParams {
            proximity_threshold: self.proximity_threshold,
            min_group_size: self.min_group_size,
            max_group_size: self.max_group_size,
            circle_radius: self.circle_radius,
        }
    }
}
