//! Pfad-Index: alle Kontroll-Knoten des Pools als eine nach Fahrtachse
//! sortierte Liste, plus gedrosselt aktualisiertes Nah-Fenster.

use std::collections::{HashMap, HashSet};

use glam::{Quat, Vec3};

use super::closest_point::{closest_point_on_polyline, ClosestPoint};
use super::floating_origin::OriginShift;
use super::pool::SegmentPool;
use super::pose::Pose;
use super::segment::SegmentId;
use super::spatial::{SpatialIndex, SpatialMatch};

/// Verweis auf einen Kontroll-Knoten (Identität eines Pfadpunkts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathPointRef {
    pub segment: SegmentId,
    pub node: usize,
}

/// Ein Pfadpunkt mit zwischengespeicherter Welt-Pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    /// Quelle (Segment + Knotenindex)
    pub source: PathPointRef,
    /// Weltposition
    pub position: Vec3,
    /// Orientierung des Knotens
    pub rotation: Quat,
    /// Koordinate auf der Fahrtachse (Sortierschlüssel)
    pub travel: f32,
}

impl PathPoint {
    fn from_pose(source: PathPointRef, pose: Pose) -> Self {
        Self {
            source,
            position: pose.position,
            rotation: pose.rotation,
            travel: pose.travel_coordinate(),
        }
    }

    fn update_pose(&mut self, pose: Pose) {
        self.position = pose.position;
        self.rotation = pose.rotation;
        self.travel = pose.travel_coordinate();
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }
}

/// Drosselung auf ein Wall-Clock-Intervall (nicht frame-gebunden).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshThrottle {
    interval: f64,
    last: Option<f64>,
}

impl RefreshThrottle {
    pub fn new(interval_secs: f64) -> Self {
        Self {
            interval: interval_secs.max(0.0),
            last: None,
        }
    }

    /// `true` wenn seit dem letzten Lauf mindestens das Intervall vergangen ist.
    /// Markiert den Lauf dann als erfolgt.
    pub fn ready(&mut self, now_secs: f64) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => now_secs - last >= self.interval,
        };
        if due {
            self.last = Some(now_secs);
        }
        due
    }

    /// Erzwingt den nächsten Lauf.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Flacher, sortierter Index über alle Pfadpunkte.
#[derive(Debug, Clone)]
pub struct PathIndex {
    points: Vec<PathPoint>,
    positions_by_ref: HashMap<PathPointRef, usize>,
    spatial: SpatialIndex,
    near_window: Vec<PathPoint>,
    throttle: RefreshThrottle,
}

impl PathIndex {
    /// Erstellt einen leeren Index mit dem gegebenen Aktualisierungsintervall.
    pub fn new(refresh_interval_secs: f64) -> Self {
        Self {
            points: Vec::new(),
            positions_by_ref: HashMap::new(),
            spatial: SpatialIndex::empty(),
            near_window: Vec::new(),
            throttle: RefreshThrottle::new(refresh_interval_secs),
        }
    }

    /// Baut die komplette Punktliste aus allen aktiven Segmenten neu auf.
    ///
    /// Duplikate (gleiche Quelle) werden verworfen; das Nah-Fenster wird geleert.
    pub fn rebuild(&mut self, pool: &SegmentPool) {
        let mut seen: HashSet<PathPointRef> = HashSet::new();
        self.points.clear();

        for segment in pool.chain() {
            for (node, pose) in segment.world_nodes().enumerate() {
                let source = PathPointRef {
                    segment: segment.id(),
                    node,
                };
                if seen.insert(source) {
                    self.points.push(PathPoint::from_pose(source, pose));
                }
            }
        }

        self.near_window.clear();
        self.throttle.reset();
        self.reindex();
        log::debug!("Pfad-Index neu aufgebaut: {} Punkte", self.points.len());
    }

    /// Aktualisiert nur die Punkte eines recycelten Segments und sortiert neu.
    ///
    /// Punkte, deren Knoten nicht mehr existiert, werden in diesem Durchlauf
    /// übersprungen.
    pub fn resync_segment(&mut self, pool: &SegmentPool, segment_id: SegmentId) {
        let Some(segment) = pool.segment(segment_id) else {
            log::warn!("Resync für unbekanntes Segment {} übersprungen", segment_id);
            return;
        };

        let mut updated = 0usize;
        for point in self
            .points
            .iter_mut()
            .filter(|p| p.source.segment == segment_id)
        {
            if let Some(pose) = segment.node_world(point.source.node) {
                point.update_pose(pose);
                updated += 1;
            }
        }

        self.near_window.retain(|p| p.source.segment != segment_id);
        self.reindex();
        log::debug!(
            "Pfad-Index: {} Punkte von Segment {} aktualisiert",
            updated,
            segment_id
        );
    }

    /// Stabile Sortierung nach Fahrtachse + Neuaufbau der Lookups.
    ///
    /// Nach einem Recycle ist die Liste bis auf die Punkte eines Segments
    /// bereits sortiert; die adaptive Sortierung läuft dann nahezu linear.
    /// Lookup-Map und KD-Tree werden komplett neu erzeugt: O(n log n) pro
    /// Recycle bei wenigen hundert Punkten.
    fn reindex(&mut self) {
        self.points.sort_by(|a, b| a.travel.total_cmp(&b.travel));
        self.positions_by_ref = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (p.source, i))
            .collect();
        self.spatial = SpatialIndex::from_positions(self.points.iter().map(|p| p.position));
    }

    /// Alle Pfadpunkte, aufsteigend nach Fahrtachse.
    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Aktueller Listenindex eines Pfadpunkts.
    pub fn index_of(&self, source: PathPointRef) -> Option<usize> {
        self.positions_by_ref.get(&source).copied()
    }

    /// Aktuelles Nah-Fenster, aufsteigend nach Fahrtachse.
    pub fn near_window(&self) -> &[PathPoint] {
        &self.near_window
    }

    /// Aktualisiert das Nah-Fenster, falls das Intervall abgelaufen ist.
    ///
    /// Gibt `true` zurück, wenn tatsächlich aktualisiert wurde.
    pub fn tick_near_window(
        &mut self,
        now_secs: f64,
        traveler_position: Vec3,
        traveler_forward: Vec3,
        max_distance: f32,
        min_front_distance: f32,
    ) -> bool {
        if !self.throttle.ready(now_secs) {
            return false;
        }
        self.refresh_near_window(
            traveler_position,
            traveler_forward,
            max_distance,
            min_front_distance,
        );
        true
    }

    /// Baut das Nah-Fenster neu auf.
    ///
    /// Ein Punkt bleibt, wenn er näher als `max_distance` liegt und entweder
    /// näher als `min_front_distance` oder vor dem Fahrer liegt. Sehr nahe
    /// Punkte zählen damit auch hinter dem Fahrer als "vorne".
    pub fn refresh_near_window(
        &mut self,
        traveler_position: Vec3,
        traveler_forward: Vec3,
        max_distance: f32,
        min_front_distance: f32,
    ) {
        let points = &self.points;
        self.near_window = self
            .spatial
            .within_radius(traveler_position, max_distance)
            .into_iter()
            .filter_map(|m| {
                let point = points.get(m.index)?;
                let in_front = m.distance < min_front_distance
                    || traveler_forward.dot(point.position - traveler_position) > 0.0;
                in_front.then_some(*point)
            })
            .collect();
        self.near_window
            .sort_by(|a, b| a.travel.total_cmp(&b.travel));
    }

    /// Nächster Punkt auf dem gesamten Pfad.
    pub fn closest_point(&self, target: Vec3) -> ClosestPoint {
        closest_point_on_polyline(target, self.points.iter().map(|p| p.position))
    }

    /// Nächster Punkt auf dem Nah-Fenster.
    pub fn closest_point_on_near_window(&self, target: Vec3) -> ClosestPoint {
        closest_point_on_polyline(target, self.near_window.iter().map(|p| p.position))
    }

    /// Nächster Pfad-Knoten (kein projizierter Punkt).
    pub fn nearest_point(&self, target: Vec3) -> Option<(&PathPoint, f32)> {
        let SpatialMatch { index, distance } = self.spatial.nearest(target)?;
        self.points.get(index).map(|p| (p, distance))
    }

    /// Verschiebt alle zwischengespeicherten Positionen starr.
    pub fn translate(&mut self, offset: Vec3) {
        for point in self.points.iter_mut().chain(self.near_window.iter_mut()) {
            let pose = Pose::new(point.position + offset, point.rotation);
            point.update_pose(pose);
        }
        self.spatial = SpatialIndex::from_positions(self.points.iter().map(|p| p.position));
    }
}

impl OriginShift for PathIndex {
    fn shift_origin(&mut self, offset: Vec3) {
        self.translate(offset);
    }
}

#[cfg(test)]
mod tests;
