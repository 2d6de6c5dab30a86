//! Segment-Pool: geordnete Kette aktiver Segmente und Recycling.
//!
//! Segmente werden einmalig instanziiert und danach nie zerstört, sondern nur
//! ans Kettenende versetzt und neu gekrümmt. Pro Tick wird höchstens ein
//! Segment recycelt.

use glam::Vec3;

use super::curve_profile::CurveProfileEvaluator;
use super::floating_origin::OriginShift;
use super::pose::Pose;
use super::segment::{Segment, SegmentId, SegmentPrefab};
use super::traveler::Traveler;
use super::RoadError;
use crate::shared::options::MIN_POOL_SIZE;

/// Toleranz für die Kontinuitätsprüfung Anker ↔ Wurzel.
pub const CHAIN_EPSILON: f32 = 1e-3;

/// Geordnete Kette aller aktiven Segmente.
#[derive(Debug, Clone)]
pub struct SegmentPool {
    /// Speicher, Index = `SegmentId.0`
    segments: Vec<Segment>,
    /// Kettenreihenfolge (Kopf = ältestes Segment, Ende = neuestes)
    order: Vec<SegmentId>,
    recycle_distance: f32,
}

impl SegmentPool {
    /// Erstellt einen leeren Pool.
    pub fn new(recycle_distance: f32) -> Self {
        Self {
            segments: Vec::new(),
            order: Vec::new(),
            recycle_distance,
        }
    }

    /// Instanziiert die Start-Kette aus den Vorlagen.
    ///
    /// Jede Vorlage wird mindestens einmal instanziiert; reicht das nicht für
    /// `min_count`, werden die Vorlagen zyklisch wiederverwendet. Jedes Segment
    /// wird am Anker seines Vorgängers angesetzt.
    pub fn create_initial_chain(
        &mut self,
        prefabs: &[SegmentPrefab],
        min_count: usize,
        start: Pose,
        evaluator: &mut CurveProfileEvaluator,
        curve_segments: bool,
    ) -> Result<Vec<SegmentId>, RoadError> {
        if prefabs.is_empty() {
            log::error!("Segment-Pool: keine Vorlagen konfiguriert");
            return Err(RoadError::EmptyPrefabSet);
        }
        if min_count == 0 {
            log::error!("Segment-Pool: minimale Pool-Größe fehlt");
            return Err(RoadError::MissingMinimumPoolSize {
                configured: min_count,
                required: MIN_POOL_SIZE,
            });
        }
        for prefab in prefabs {
            prefab.validate().inspect_err(|e| log::error!("Segment-Pool: {}", e))?;
        }

        self.segments.clear();
        self.order.clear();

        let count = prefabs.len().max(min_count);
        let mut root = start;
        for i in 0..count {
            let prefab = &prefabs[i % prefabs.len()];
            let id = SegmentId(i as u32);
            let mut segment = Segment::instantiate(id, prefab, root);
            if curve_segments {
                evaluator.randomize_curve(&mut segment);
            }
            if let Some(anchor) = segment.end_anchor() {
                root = anchor;
            }
            self.segments.push(segment);
            self.order.push(id);
        }

        log::info!(
            "Segment-Pool aufgebaut: {} Segmente aus {} Vorlagen",
            count,
            prefabs.len()
        );
        Ok(self.order.clone())
    }

    /// Prüft alle Segmente und recycelt höchstens eines.
    ///
    /// Ein Segment ist geeignet, wenn sein Anker weiter als die Recycle-Distanz
    /// entfernt und hinter dem Betrachter liegt. Das aktuelle Kettenende ist
    /// nie geeignet. Segmente ohne auflösbaren Anker werden übersprungen.
    pub fn tick(
        &mut self,
        viewer: &Traveler,
        evaluator: &mut CurveProfileEvaluator,
    ) -> Option<SegmentId> {
        let tail = self.tail_id()?;
        let candidate = self
            .order
            .iter()
            .copied()
            .filter(|id| *id != tail)
            .find(|id| match self.segment(*id).and_then(Segment::end_anchor) {
                Some(anchor) => viewer.is_behind(anchor.position, self.recycle_distance),
                None => {
                    log::debug!("Segment {} ohne Anker, übersprungen", id);
                    false
                }
            })?;

        self.recycle_segment(candidate, evaluator).then_some(candidate)
    }

    /// Versetzt ein Segment an den Anker des aktuellen Kettenendes und krümmt es neu.
    ///
    /// Gibt `false` zurück, wenn das Segment unbekannt ist, bereits das Ende
    /// bildet oder das Ende keinen Anker hat.
    pub fn recycle_segment(
        &mut self,
        segment_id: SegmentId,
        evaluator: &mut CurveProfileEvaluator,
    ) -> bool {
        let Some(tail) = self.tail_id() else {
            return false;
        };
        if tail == segment_id {
            return false;
        }
        let Some(anchor) = self.segment(tail).and_then(Segment::end_anchor) else {
            log::warn!("Kettenende {} ohne Anker, Recycling ausgesetzt", tail);
            return false;
        };
        let Some(position) = self.order.iter().position(|id| *id == segment_id) else {
            return false;
        };
        let Some(segment) = self.segments.get_mut(segment_id.0 as usize) else {
            return false;
        };

        segment.set_root(anchor);
        let profile = evaluator.randomize_curve(segment);
        segment.bump_generation();

        self.order.remove(position);
        self.order.push(segment_id);

        log::debug!(
            "Segment {} recycelt (Generation {}, Winkel {:.2})",
            segment_id,
            segment.generation(),
            profile.angle
        );
        true
    }

    /// Segment per ID.
    pub fn segment(&self, segment_id: SegmentId) -> Option<&Segment> {
        self.segments.get(segment_id.0 as usize)
    }

    /// Segmente in Kettenreihenfolge.
    pub fn chain(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.order.iter().filter_map(|id| self.segment(*id))
    }

    /// Kettenreihenfolge als IDs.
    pub fn order(&self) -> &[SegmentId] {
        &self.order
    }

    pub fn tail_id(&self) -> Option<SegmentId> {
        self.order.last().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn recycle_distance(&self) -> f32 {
        self.recycle_distance
    }

    /// Prüft `anchor(i) ≈ root(i + 1)` für die gesamte Kette.
    pub fn is_contiguous(&self, epsilon: f32) -> bool {
        let segments: Vec<&Segment> = self.chain().collect();
        segments.windows(2).all(|pair| {
            pair[0]
                .end_anchor()
                .is_some_and(|anchor| anchor.abs_diff_eq(&pair[1].root_pose(), epsilon))
        })
    }

    #[cfg(test)]
    pub(crate) fn from_segments(segments: Vec<Segment>, recycle_distance: f32) -> Self {
        let order = segments.iter().map(Segment::id).collect();
        Self {
            segments,
            order,
            recycle_distance,
        }
    }
}

impl OriginShift for SegmentPool {
    fn shift_origin(&mut self, offset: Vec3) {
        for segment in &mut self.segments {
            segment.translate(offset);
        }
    }
}
