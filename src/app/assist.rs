//! Lenkhilfe nach Pure-Pursuit: Zielpunkt mit fester Vorausschau auf einer Spur.

use glam::Vec3;

use super::queries::RoadQueries;
use crate::core::{LaneId, Traveler};

/// Pure-Pursuit-Lenkhilfe.
///
/// Größere Vorausschau lenkt ruhiger, schneidet Kurven aber stärker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringAssist {
    /// Vorausschau entlang der Spur in Welteinheiten
    pub lookahead: f32,
    /// Lenkwinkel (Radiant), der einem Lenkeinschlag von 1.0 entspricht
    pub max_steer_angle: f32,
}

impl Default for SteeringAssist {
    fn default() -> Self {
        Self {
            lookahead: 15.0,
            max_steer_angle: 0.6,
        }
    }
}

impl SteeringAssist {
    /// Punkt `lookahead` Einheiten hinter der Projektion von `position` auf die Spur.
    ///
    /// Endet die Spur vorher, wird ihr letzter Wegpunkt geliefert.
    pub fn target_on_lane(
        &self,
        queries: &RoadQueries<'_>,
        lane_id: LaneId,
        position: Vec3,
    ) -> Option<Vec3> {
        let lane = queries.lane(lane_id)?;
        let hit = lane.closest_point(position);
        if hit.is_degenerate() {
            return None;
        }

        let mut remaining = self.lookahead.max(0.0);
        let mut current = hit.point;
        for waypoint in &lane.waypoints()[hit.segment_index + 1..] {
            let next = waypoint.pose.position;
            let step = current.distance(next);
            if step >= remaining {
                return Some(current + (next - current).normalize_or_zero() * remaining);
            }
            remaining -= step;
            current = next;
        }
        Some(current)
    }

    /// Lenkeinschlag in `[-1, 1]` Richtung `target` (positiv = rechts).
    pub fn steer_towards(&self, traveler: &Traveler, target: Vec3) -> f32 {
        let to_target = target - traveler.position;
        let forward = traveler.forward;
        let angle = (to_target.x * forward.z - to_target.z * forward.x)
            .atan2(to_target.x * forward.x + to_target.z * forward.z);
        if self.max_steer_angle <= f32::EPSILON {
            return angle.signum();
        }
        (angle / self.max_steer_angle).clamp(-1.0, 1.0)
    }
}
