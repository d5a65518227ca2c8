//! Proximity grouping
//!
//! Partitions positioned agents into discussion groups. Each group grows
//! around a seed agent from its unclaimed neighbors; agents with no neighbor in
//! range sit the round out.

use crate::agent::entities::AgentId;
use crate::core::error::DomainError;
use crate::discussion::group::DiscussionGroup;
use crate::world::geometry::{Position, centroid};
use crate::world::random::{RandomSource, between, shuffle};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tunables for group formation and circle layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupingParams {
    /// Neighbors must be strictly closer than this to the seed
    pub proximity_threshold: f64,
    pub min_group_size: usize,
    pub max_group_size: usize,
    /// Radius of the circle members walk to
    pub circle_radius: f64,
}

impl Default for GroupingParams {
    fn default() -> Self {
        Self {
            proximity_threshold: 200.0,
            min_group_size: 2,
            max_group_size: 6,
            circle_radius: 42.0,
        }
    }
}

impl GroupingParams {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.min_group_size < 2 || self.max_group_size < self.min_group_size {
            return Err(DomainError::InvalidGroupBounds {
                min: self.min_group_size,
                max: self.max_group_size,
            });
        }
        Ok(())
    }
}

/// An agent id with its position at grouping time
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedAgent {
    pub id: AgentId,
    pub position: Position,
}

impl PositionedAgent {
    pub fn new(id: impl Into<AgentId>, position: Position) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}

/// Form disjoint discussion groups from agent positions.
///
/// Group sizes are drawn uniformly from `min..=min(max, neighbors + 1)`; a
/// seed takes its neighbors in (shuffled) iteration order.
pub fn form_groups(
    agents: &[PositionedAgent],
    params: &GroupingParams,
    random: &dyn RandomSource,
) -> Vec<DiscussionGroup> {
    let mut order: Vec<&PositionedAgent> = agents.iter().collect();
    shuffle(&mut order, random);

    let mut claimed: HashSet<&AgentId> = HashSet::new();
    let mut groups = Vec::new();

    for seed in &order {
        if claimed.contains(&seed.id) {
            continue;
        }

        let neighbors: Vec<&PositionedAgent> = order
            .iter()
            .copied()
            .filter(|other| {
                other.id != seed.id
                    && !claimed.contains(&other.id)
                    && seed.position.distance_to(&other.position) < params.proximity_threshold
            })
            .collect();

        if neighbors.is_empty() {
            continue;
        }

        let upper = params.max_group_size.min(neighbors.len() + 1);
        if upper < params.min_group_size {
            continue;
        }
        let size = between(params.min_group_size, upper, random);

        let members: Vec<&PositionedAgent> = std::iter::once(*seed)
            .chain(neighbors.into_iter().take(size - 1))
            .collect();
        for member in &members {
            claimed.insert(&member.id);
        }

        let positions: Vec<Position> = members.iter().map(|m| m.position).collect();
        let center = centroid(&positions).unwrap_or(seed.position);
        groups.push(DiscussionGroup::new(
            members.iter().map(|m| m.id.clone()).collect(),
            center,
        ));
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::random::{ScriptedRandom, StdRandom};
    use std::collections::HashMap;

    fn agent(id: &str, x: f64, y: f64) -> PositionedAgent {
        PositionedAgent::new(id, Position::new(x, y))
    }

    fn three_pairs() -> Vec<PositionedAgent> {
        vec![
            agent("a1", 0.0, 0.0),
            agent("a2", 50.0, 0.0),
            agent("b1", 1000.0, 0.0),
            agent("b2", 1050.0, 0.0),
            agent("c1", 2000.0, 0.0),
            agent("c2", 2050.0, 0.0),
        ]
    }

    fn crowd(seed: u64, n: usize) -> Vec<PositionedAgent> {
        let random = StdRandom::seeded(seed);
        (0..n)
            .map(|i| {
                agent(
                    &format!("agent_{i}"),
                    random.next_index(800) as f64,
                    random.next_index(500) as f64,
                )
            })
            .collect()
    }

    #[test]
    fn test_three_separated_pairs_form_three_groups() {
        for random in [
            ScriptedRandom::Highest,
            ScriptedRandom::Lowest,
            ScriptedRandom::sequence(vec![3, 1, 4, 1, 5, 9, 2, 6]),
        ] {
            let groups = form_groups(&three_pairs(), &GroupingParams::default(), &random);
            assert_eq!(groups.len(), 3);
            for group in &groups {
                assert_eq!(group.len(), 2);
                let prefix = &group.member_ids()[0].as_str()[..1];
                assert!(group.member_ids().iter().all(|id| id.as_str().starts_with(prefix)));
            }
        }
    }

    #[test]
    fn test_isolated_agent_left_out() {
        let agents = vec![
            agent("a1", 0.0, 0.0),
            agent("a2", 10.0, 0.0),
            agent("loner", 5000.0, 5000.0),
        ];
        let groups = form_groups(&agents, &GroupingParams::default(), &ScriptedRandom::Highest);
        assert_eq!(groups.len(), 1);
        assert!(!groups[0].contains(&AgentId::from("loner")));
    }

    #[test]
    fn test_threshold_is_strict() {
        let agents = vec![agent("a1", 0.0, 0.0), agent("a2", 200.0, 0.0)];
        let groups = form_groups(&agents, &GroupingParams::default(), &ScriptedRandom::Highest);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_center_is_centroid() {
        let agents = vec![agent("a1", 0.0, 0.0), agent("a2", 100.0, 50.0)];
        let groups = form_groups(&agents, &GroupingParams::default(), &ScriptedRandom::Highest);
        assert_eq!(groups[0].center(), Position::new(50.0, 25.0));
    }

    #[test]
    fn test_dense_cluster_capped_at_max() {
        let agents: Vec<_> = (0..10).map(|i| agent(&format!("a{i}"), i as f64, 0.0)).collect();
        let groups = form_groups(&agents, &GroupingParams::default(), &ScriptedRandom::Highest);
        // identity order, always the largest size: 6 then the remaining 4
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 6);
        assert_eq!(groups[1].len(), 4);
        assert_eq!(groups[0].seed(), Some(&AgentId::from("a0")));
    }

    #[test]
    fn test_min_size_respected_with_lowest_draws() {
        let agents: Vec<_> = (0..7).map(|i| agent(&format!("a{i}"), i as f64, 0.0)).collect();
        let groups = form_groups(&agents, &GroupingParams::default(), &ScriptedRandom::Lowest);
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.len() == 2));
    }

    #[test]
    fn test_properties_hold_for_random_crowds() {
        let params = GroupingParams::default();
        for seed in 0..25 {
            let agents = crowd(seed, 40);
            let positions: HashMap<_, _> =
                agents.iter().map(|a| (a.id.clone(), a.position)).collect();
            let groups = form_groups(&agents, &params, &StdRandom::seeded(seed + 100));

            let mut seen = HashSet::new();
            for group in &groups {
                assert!(group.len() >= params.min_group_size);
                assert!(group.len() <= params.max_group_size);

                let seed_pos = positions[group.seed().unwrap()];
                for id in group.member_ids() {
                    assert!(seen.insert(id.clone()), "{id} grouped twice");
                    assert!(seed_pos.distance_to(&positions[id]) < params.proximity_threshold);
                }
            }
            assert!(seen.len() <= agents.len());
        }
    }

    #[test]
    fn test_validate_bounds() {
        assert!(GroupingParams::default().validate().is_ok());
        let bad = GroupingParams {
            min_group_size: 4,
            max_group_size: 3,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let too_small = GroupingParams {
            min_group_size: 1,
            ..Default::default()
        };
        assert!(too_small.validate().is_err());
    }
}
