//! Spuren: seitlich versetzte, punktweise ausgerichtete Kopien des Pfads.

use glam::Vec3;
use indexmap::IndexMap;

use super::closest_point::{closest_point_on_polyline, ClosestPoint};
use super::floating_origin::OriginShift;
use super::path_index::{PathIndex, PathPointRef};
use super::pose::Pose;
use super::segment::SegmentId;
use crate::shared::options::LaneOptions;

/// ID einer Spur.
pub type LaneId = u32;

/// Wegpunkt einer Spur, gekoppelt an genau einen Pfadpunkt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub source: PathPointRef,
    pub pose: Pose,
}

/// Eine Spur mit festem seitlichem Versatz.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    id: LaneId,
    offset: f32,
    left_side: bool,
    waypoints: Vec<Waypoint>,
}

impl Lane {
    /// Erstellt eine Spur. Ohne konfigurierten Versatz wird er einmalig aus
    /// der Ausgangsposition übernommen.
    pub fn new(options: &LaneOptions) -> Self {
        let offset = options.offset.unwrap_or(options.initial_position.x);
        Self {
            id: options.id,
            offset,
            left_side: offset < 0.0,
            waypoints: Vec::new(),
        }
    }

    pub fn id(&self) -> LaneId {
        self.id
    }

    /// Vorzeichenbehafteter seitlicher Versatz.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Liegt die Spur links der Mittellinie (Gegenverkehr)?
    pub fn left_side(&self) -> bool {
        self.left_side
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    fn waypoint_pose(&self, path_pose: Pose) -> Pose {
        path_pose.offset_right(self.offset)
    }

    /// Erzeugt alle Wegpunkte neu aus dem Pfad-Index.
    pub fn create_waypoints(&mut self, path: &PathIndex) {
        let waypoints: Vec<Waypoint> = path
            .points()
            .iter()
            .map(|p| Waypoint {
                source: p.source,
                pose: self.waypoint_pose(p.pose()),
            })
            .collect();
        self.waypoints = waypoints;
    }

    /// Inkrementeller Abgleich nach dem Recyceln eines Segments.
    ///
    /// Wegpunkte werden in die Reihenfolge des Pfad-Index gebracht; nur die
    /// Wegpunkte des recycelten Segments erhalten eine neue Pose.
    pub fn resync_after_segment_recycle(&mut self, path: &PathIndex, segment_id: SegmentId) {
        if self.waypoints.len() != path.len() {
            log::warn!(
                "Spur {}: {} Wegpunkte für {} Pfadpunkte, baue neu auf",
                self.id,
                self.waypoints.len(),
                path.len()
            );
            self.create_waypoints(path);
            return;
        }

        self.waypoints
            .sort_by_key(|w| path.index_of(w.source).unwrap_or(usize::MAX));

        let offset = self.offset;
        for (waypoint, point) in self.waypoints.iter_mut().zip(path.points()) {
            if waypoint.source != point.source {
                // Quelle nicht mehr im Index: Wegpunkt übernimmt den Pfadpunkt
                waypoint.source = point.source;
                waypoint.pose = point.pose().offset_right(offset);
            } else if point.source.segment == segment_id {
                waypoint.pose = point.pose().offset_right(offset);
            }
        }
    }

    /// Nächster Punkt auf dieser Spur.
    pub fn closest_point(&self, target: Vec3) -> ClosestPoint {
        closest_point_on_polyline(target, self.waypoints.iter().map(|w| w.pose.position))
    }

    fn translate(&mut self, offset: Vec3) {
        for waypoint in &mut self.waypoints {
            waypoint.pose.position += offset;
        }
    }
}

/// Alle Spuren, in Konfigurationsreihenfolge.
#[derive(Debug, Clone, Default)]
pub struct LaneSet {
    lanes: IndexMap<LaneId, Lane>,
}

impl LaneSet {
    pub fn new(options: &[LaneOptions]) -> Self {
        let lanes = options
            .iter()
            .map(|opts| (opts.id, Lane::new(opts)))
            .collect();
        Self { lanes }
    }

    pub fn get(&self, lane_id: LaneId) -> Option<&Lane> {
        self.lanes.get(&lane_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lane> + '_ {
        self.lanes.values()
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Erzeugt die Wegpunkte aller Spuren (einmalig nach dem Pool-Aufbau).
    pub fn create_waypoints(&mut self, path: &PathIndex) {
        for lane in self.lanes.values_mut() {
            lane.create_waypoints(path);
        }
        log::debug!(
            "{} Spuren mit je {} Wegpunkten erzeugt",
            self.lanes.len(),
            path.len()
        );
    }

    /// Inkrementeller Abgleich aller Spuren nach einem Recycle-Vorgang.
    pub fn resync_after_segment_recycle(&mut self, path: &PathIndex, segment_id: SegmentId) {
        for lane in self.lanes.values_mut() {
            lane.resync_after_segment_recycle(path, segment_id);
        }
    }

    /// Nächster Punkt auf einer Spur; unbekannte Spur → Degenerat-Sentinel.
    pub fn closest_point_on_lane(&self, lane_id: LaneId, target: Vec3) -> ClosestPoint {
        self.lanes
            .get(&lane_id)
            .map(|lane| lane.closest_point(target))
            .unwrap_or(ClosestPoint::DEGENERATE)
    }

    /// Spur mit dem geringsten Abstand zu `target`. Bei Gleichstand gewinnt
    /// die zuerst konfigurierte Spur.
    pub fn closest_lane_to(&self, target: Vec3) -> Option<LaneId> {
        let mut best: Option<(LaneId, f32)> = None;
        for lane in self.lanes.values() {
            let hit = lane.closest_point(target);
            if hit.is_degenerate() {
                continue;
            }
            if best.is_none_or(|(_, distance)| hit.distance < distance) {
                best = Some((lane.id, hit.distance));
            }
        }
        best.map(|(id, _)| id)
    }
}

impl OriginShift for LaneSet {
    fn shift_origin(&mut self, offset: Vec3) {
        for lane in self.lanes.values_mut() {
            lane.translate(offset);
        }
    }
}
