//! Straßensegment: Kette von Kontroll-Knoten ("Bones") mit End-Anker.
//!
//! Knoten-Posen werden segment-lokal gespeichert; die Welt-Pose ergibt sich
//! aus `root * local`. Beim Recyceln wird nur `root` versetzt, die Knoten
//! selbst werden vom Kurvenprofil-Generator in-place neu gesetzt.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::closest_point::{closest_point_on_polyline, ClosestPoint};
use super::curve_profile::CurveProfile;
use super::pose::Pose;
use super::RoadError;

/// Stabile ID eines Segments im Pool (Index in den Pool-Speicher).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub u32);

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaker Verweis auf Collider/Visuals des externen Renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepresentationHandle(pub u64);

/// Vorlage, aus der Segmente einmalig instanziiert werden.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentPrefab {
    /// Name (nur für Logging)
    pub name: String,
    /// Anzahl der Kontroll-Knoten
    pub node_count: usize,
    /// Abstand der Knoten entlang der lokalen Fahrtachse
    pub node_spacing: f32,
    /// Abstand des End-Ankers hinter dem letzten Knoten
    pub anchor_distance: f32,
}

impl SegmentPrefab {
    /// Gerade Vorlage, deren Anker einen Knotenabstand hinter dem letzten Knoten liegt.
    pub fn straight(name: &str, node_count: usize, node_spacing: f32) -> Self {
        Self {
            name: name.to_string(),
            node_count,
            node_spacing,
            anchor_distance: node_spacing,
        }
    }

    /// Prüft die Vorlage auf Mindestanforderungen.
    pub fn validate(&self) -> Result<(), RoadError> {
        if self.node_count < 2 {
            return Err(RoadError::InvalidPrefab {
                name: self.name.clone(),
                node_count: self.node_count,
            });
        }
        Ok(())
    }

    /// Kanonische Ruhe-Posen (segment-lokal, gerade entlang +Z).
    pub fn rest_nodes(&self) -> Vec<Pose> {
        (0..self.node_count)
            .map(|i| Pose::from_position(Vec3::new(0.0, 0.0, i as f32 * self.node_spacing)))
            .collect()
    }

    /// Gesamtlänge von Wurzel bis Anker im Ruhezustand.
    pub fn length(&self) -> f32 {
        self.node_count.saturating_sub(1) as f32 * self.node_spacing + self.anchor_distance
    }
}

/// Ein recycelbares Straßensegment.
#[derive(Debug, Clone)]
pub struct Segment {
    id: SegmentId,
    prefab_name: String,
    /// Welt-Pose der Segment-Wurzel
    root: Pose,
    /// Aufgezeichnete Ruhe-Posen (lokal), Basis jeder Randomisierung
    rest_nodes: Vec<Pose>,
    /// Aktuelle Knoten-Posen (lokal)
    nodes: Vec<Pose>,
    /// Anker relativ zum letzten Knoten
    anchor_offset: Pose,
    profile: CurveProfile,
    representation: RepresentationHandle,
    generation: u32,
}

impl Segment {
    /// Instanziiert ein Segment aus einer Vorlage an der gegebenen Wurzel-Pose.
    pub fn instantiate(id: SegmentId, prefab: &SegmentPrefab, root: Pose) -> Self {
        let rest_nodes = prefab.rest_nodes();
        Self::from_rest_nodes(
            id,
            &prefab.name,
            root,
            rest_nodes,
            Pose::from_position(Vec3::new(0.0, 0.0, prefab.anchor_distance)),
        )
    }

    /// Erstellt ein Segment direkt aus lokalen Ruhe-Posen.
    pub fn from_rest_nodes(
        id: SegmentId,
        name: &str,
        root: Pose,
        rest_nodes: Vec<Pose>,
        anchor_offset: Pose,
    ) -> Self {
        Self {
            id,
            prefab_name: name.to_string(),
            root,
            nodes: rest_nodes.clone(),
            rest_nodes,
            anchor_offset,
            profile: CurveProfile::NONE,
            representation: RepresentationHandle(id.0 as u64),
            generation: 0,
        }
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn prefab_name(&self) -> &str {
        &self.prefab_name
    }

    /// Welt-Pose der Wurzel.
    pub fn root_pose(&self) -> Pose {
        self.root
    }

    /// Setzt die Wurzel (Knoten bleiben lokal unverändert).
    pub fn set_root(&mut self, root: Pose) {
        self.root = root;
    }

    /// Verschiebt das Segment starr.
    pub fn translate(&mut self, offset: Vec3) {
        self.root.position += offset;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Welt-Pose eines Knotens.
    pub fn node_world(&self, index: usize) -> Option<Pose> {
        self.nodes.get(index).map(|local| self.root.transform(local))
    }

    /// Welt-Posen aller Knoten in Kettenreihenfolge.
    pub fn world_nodes(&self) -> impl Iterator<Item = Pose> + '_ {
        self.nodes.iter().map(move |local| self.root.transform(local))
    }

    /// Lokale Knoten-Posen.
    pub fn local_nodes(&self) -> &[Pose] {
        &self.nodes
    }

    /// Aufgezeichnete Ruhe-Posen.
    pub fn rest_nodes(&self) -> &[Pose] {
        &self.rest_nodes
    }

    /// Welt-Pose des End-Ankers. `None`, wenn das Segment keine Knoten hat.
    ///
    /// Position vom letzten Knoten, Orientierung von der Wurzel: die Kurve
    /// versetzt die Kette seitlich, dreht aber nie die Fahrtrichtung.
    pub fn end_anchor(&self) -> Option<Pose> {
        let tail = self.nodes.last()?;
        let local = Pose::new(
            tail.position + self.anchor_offset.position,
            self.anchor_offset.rotation,
        );
        Some(self.root.transform(&local))
    }

    /// Aktuelles Kurvenprofil.
    pub fn profile(&self) -> CurveProfile {
        self.profile
    }

    pub fn representation(&self) -> RepresentationHandle {
        self.representation
    }

    /// Anzahl bisheriger Recycle-Vorgänge.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub(crate) fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Setzt alle Knoten auf die Ruhe-Posen zurück.
    pub fn reset_to_rest(&mut self) {
        self.nodes.copy_from_slice(&self.rest_nodes);
        self.profile = CurveProfile::NONE;
    }

    pub(crate) fn nodes_and_rest_mut(&mut self) -> (&mut [Pose], &[Pose]) {
        (&mut self.nodes, &self.rest_nodes)
    }

    pub(crate) fn set_profile(&mut self, profile: CurveProfile) {
        self.profile = profile;
    }

    /// Nächster Punkt auf der Mittellinie dieses Segments.
    pub fn closest_point(&self, target: Vec3) -> ClosestPoint {
        closest_point_on_polyline(target, self.world_nodes().map(|pose| pose.position))
    }
}
