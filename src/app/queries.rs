//! Read-only Abfrage-API für Verkehr, Lenkhilfe und Beinahe-Unfall-Erkennung.
//!
//! Alle Abfragen laufen über `core::closest_point`; die Fassade wählt nur die
//! passende Punktliste.

use glam::Vec3;

use crate::core::{is_point_ahead, ClosestPoint, Lane, LaneId, LaneSet, PathIndex, Traveler};

/// Geborgte Sicht auf Pfad-Index und Spuren eines Frames.
#[derive(Debug, Clone, Copy)]
pub struct RoadQueries<'a> {
    path: &'a PathIndex,
    lanes: &'a LaneSet,
}

impl<'a> RoadQueries<'a> {
    pub fn new(path: &'a PathIndex, lanes: &'a LaneSet) -> Self {
        Self { path, lanes }
    }

    /// Nächster Punkt + Tangente auf dem gesamten Pfad.
    pub fn closest_point_on_path(&self, position: Vec3) -> ClosestPoint {
        self.path.closest_point(position)
    }

    /// Nächster Punkt im Nah-Fenster (günstiger, aber nur um den Fahrer).
    pub fn closest_point_near(&self, position: Vec3) -> ClosestPoint {
        self.path.closest_point_on_near_window(position)
    }

    /// Nächster Punkt + Tangente auf einer Spur.
    pub fn closest_point_on_lane(&self, lane_id: LaneId, position: Vec3) -> ClosestPoint {
        self.lanes.closest_point_on_lane(lane_id, position)
    }

    /// Spur mit geringstem Abstand.
    pub fn closest_lane_to(&self, position: Vec3) -> Option<LaneId> {
        self.lanes.closest_lane_to(position)
    }

    pub fn lane(&self, lane_id: LaneId) -> Option<&'a Lane> {
        self.lanes.get(lane_id)
    }

    /// Liegt `point` vor dem Fahrer?
    pub fn is_point_ahead(&self, traveler: &Traveler, point: Vec3) -> bool {
        is_point_ahead(traveler.position, traveler.forward, point)
    }

    /// Fährt ein Objekt gegen die Richtung seiner Spur?
    ///
    /// Linke Spuren gelten als Gegenverkehr: dort ist Fahren in Pfadrichtung
    /// falsch, auf rechten Spuren Fahren gegen die Pfadrichtung.
    pub fn is_wrong_direction(&self, position: Vec3, forward: Vec3) -> bool {
        let Some(lane) = self.closest_lane_to(position).and_then(|id| self.lane(id)) else {
            return false;
        };
        let hit = lane.closest_point(position);
        let along = forward.dot(hit.tangent);
        if lane.left_side() {
            along > 0.0
        } else {
            along < 0.0
        }
    }
}
