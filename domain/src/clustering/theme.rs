//! Theme clusters

use crate::agent::entities::AgentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall tone of a theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// A group of similar answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeCluster {
    pub label: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub agent_ids: Vec<AgentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

impl ThemeCluster {
    pub fn new(label: impl Into<String>, agent_ids: Vec<AgentId>) -> Self {
        Self {
            label: label.into(),
            count: agent_ids.len(),
            agent_ids,
            sentiment: None,
        }
    }

    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    /// Share of `total`, as a percentage
    pub fn share(&self, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        self.count as f64 * 100.0 / total as f64
    }
}

/// How the clusterer may assign answers to themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterMode {
    /// Every answer in exactly one theme; counts sum to the number of answers
    Exclusive,
    /// An answer may count toward several themes
    Overlap,
}

impl ClusterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterMode::Exclusive => "exclusive",
            ClusterMode::Overlap => "overlap",
        }
    }
}

impl fmt::Display for ClusterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One agent's current answer, as sent to the clusterer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEntry {
    pub agent_id: AgentId,
    pub answer: String,
}

impl AnswerEntry {
    pub fn new(agent_id: impl Into<AgentId>, answer: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            answer: answer.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let theme = ThemeCluster::new("Yes", vec!["a1".into(), "a3".into()])
            .with_sentiment(Sentiment::Positive);
        let json = serde_json::to_value(&theme).unwrap();
        assert_eq!(json["label"], "Yes");
        assert_eq!(json["count"], 2);
        assert_eq!(json["agentIds"][1], "a3");
        assert_eq!(json["sentiment"], "positive");
    }

    #[test]
    fn test_missing_optional_fields() {
        let theme: ThemeCluster = serde_json::from_str(r#"{"label":"Maybe"}"#).unwrap();
        assert_eq!(theme.count, 0);
        assert!(theme.agent_ids.is_empty());
        assert!(theme.sentiment.is_none());
    }

    #[test]
    fn test_share() {
        let theme = ThemeCluster::new("No", vec!["a2".into()]);
        assert!((theme.share(4) - 25.0).abs() < f64::EPSILON);
        assert_eq!(theme.share(0), 0.0);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(serde_json::to_string(&ClusterMode::Overlap).unwrap(), "\"overlap\"");
        assert_eq!(ClusterMode::Exclusive.to_string(), "exclusive");
    }
}
