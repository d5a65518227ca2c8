//! Exclusive-mode theme validation
//!
//! The authoritative clustering must place every answered agent in exactly
//! one theme. Models do not always comply, so results are checked and then
//! normalized before they are published.

use crate::agent::entities::AgentId;
use crate::clustering::theme::{AnswerEntry, ThemeCluster};
use std::collections::HashSet;

/// Label of the catch-all theme for answers the model left out
pub const UNCLASSIFIED_LABEL: &str = "Unclassified";

/// A way the exclusive invariant was broken
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeViolation {
    UnknownAgent { label: String, agent: AgentId },
    DuplicateAgent { agent: AgentId },
    CountMismatch { label: String, count: usize, members: usize },
    MissingAgent { agent: AgentId },
    TotalMismatch { total: usize, expected: usize },
}

/// Every violation of the exclusive invariant, in discovery order
pub fn check_exclusive(themes: &[ThemeCluster], answers: &[AnswerEntry]) -> Vec<ThemeViolation> {
    let known: HashSet<&AgentId> = answers.iter().map(|a| &a.agent_id).collect();
    let mut seen: HashSet<&AgentId> = HashSet::new();
    let mut violations = Vec::new();

    for theme in themes {
        if theme.count != theme.agent_ids.len() {
            violations.push(ThemeViolation::CountMismatch {
                label: theme.label.clone(),
                count: theme.count,
                members: theme.agent_ids.len(),
            });
        }
        for agent in &theme.agent_ids {
            if !known.contains(agent) {
                violations.push(ThemeViolation::UnknownAgent {
                    label: theme.label.clone(),
                    agent: agent.clone(),
                });
            } else if !seen.insert(agent) {
                violations.push(ThemeViolation::DuplicateAgent {
                    agent: agent.clone(),
                });
            }
        }
    }

    for answer in answers {
        if !seen.contains(&answer.agent_id) {
            violations.push(ThemeViolation::MissingAgent {
                agent: answer.agent_id.clone(),
            });
        }
    }

    let total: usize = themes.iter().map(|t| t.count).sum();
    if total != answers.len() {
        violations.push(ThemeViolation::TotalMismatch {
            total,
            expected: answers.len(),
        });
    }

    violations
}

/// Rewrite `themes` so the exclusive invariant holds.
///
/// Unknown ids are dropped, an agent listed twice stays in the first theme,
/// counts are recomputed from membership, empty themes are removed and
/// answered agents the model skipped land in [`UNCLASSIFIED_LABEL`]. The
/// result is ordered by count, largest first.
pub fn normalize_exclusive(themes: Vec<ThemeCluster>, answers: &[AnswerEntry]) -> Vec<ThemeCluster> {
    let known: HashSet<&AgentId> = answers.iter().map(|a| &a.agent_id).collect();
    let mut claimed: HashSet<AgentId> = HashSet::new();
    let mut normalized = Vec::with_capacity(themes.len() + 1);

    for mut theme in themes {
        theme.agent_ids.retain(|id| known.contains(id) && claimed.insert(id.clone()));
        theme.count = theme.agent_ids.len();
        if theme.count > 0 {
            normalized.push(theme);
        }
    }

    let leftovers: Vec<AgentId> = answers
        .iter()
        .filter(|a| !claimed.contains(&a.agent_id))
        .map(|a| a.agent_id.clone())
        .collect();
    if !leftovers.is_empty() {
        match normalized.iter_mut().find(|t| t.label == UNCLASSIFIED_LABEL) {
            Some(existing) => {
                existing.agent_ids.extend(leftovers);
                existing.count = existing.agent_ids.len();
            }
            None => normalized.push(ThemeCluster::new(UNCLASSIFIED_LABEL, leftovers)),
        }
    }

    // stable: ties keep the model's order
    normalized.sort_by(|a, b| b.count.cmp(&a.count));
    normalized
}
