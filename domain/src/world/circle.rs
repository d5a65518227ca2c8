//! Circle arrangement for discussion groups

use crate::agent::entities::AgentId;
use crate::discussion::group::DiscussionGroup;
use crate::world::geometry::Position;
use std::f64::consts::{FRAC_PI_2, TAU};

/// `n` equally spaced points around `center`, starting at the top and going
/// clockwise in screen coordinates (y grows downward).
pub fn circle_points(center: Position, radius: f64, n: usize) -> Vec<Position> {
    (0..n)
        .map(|i| {
            let angle = TAU * i as f64 / n as f64 - FRAC_PI_2;
            Position::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

/// Where one member should stand and what it should face
#[derive(Debug, Clone, PartialEq)]
pub struct CircleSlot {
    pub agent: AgentId,
    pub target: Position,
    pub facing: Position,
}

/// One walk command per member, in membership order
pub fn arrange_in_circle(group: &DiscussionGroup, radius: f64) -> Vec<CircleSlot> {
    let center = group.center();
    group
        .member_ids()
        .iter()
        .zip(circle_points(center, radius, group.len()))
        .map(|(agent, target)| CircleSlot {
            agent: agent.clone(),
            target,
            facing: center,
        })
        .collect()
}
