//! Schnittstelle zum externen Renderer/Collider-Baker.
//!
//! Nach jeder Kurvenänderung wird ein Neuaufbau angefordert; das
//! Straßensystem wartet nicht auf das Ergebnis.

use crate::core::{Pose, RepresentationHandle, Segment, SegmentId};

/// Empfänger von Neuaufbau-Anforderungen.
pub trait RepresentationSink {
    /// Fordert einen Neuaufbau für die aktuellen Knoten-Posen an (fire-and-forget).
    fn request_rebuild(&mut self, segment: &Segment);
}

/// Verwirft alle Anforderungen (Headless-Betrieb).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RepresentationSink for NullSink {
    fn request_rebuild(&mut self, _segment: &Segment) {}
}

/// Eine gepufferte Neuaufbau-Anforderung.
#[derive(Debug, Clone, PartialEq)]
pub struct BakeRequest {
    pub segment: SegmentId,
    pub handle: RepresentationHandle,
    /// Welt-Posen der Knoten zum Zeitpunkt der Anforderung
    pub nodes: Vec<Pose>,
}

/// Sammelt Anforderungen, bis der Renderer sie abholt.
///
/// Mehrfache Anforderungen für dasselbe Segment ersetzen die ältere.
#[derive(Debug, Default, Clone)]
pub struct BakeQueue {
    pending: Vec<BakeRequest>,
}

impl BakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[BakeRequest] {
        &self.pending
    }

    /// Entnimmt alle wartenden Anforderungen.
    pub fn drain(&mut self) -> Vec<BakeRequest> {
        std::mem::take(&mut self.pending)
    }
}

impl RepresentationSink for BakeQueue {
    fn request_rebuild(&mut self, segment: &Segment) {
        let request = BakeRequest {
            segment: segment.id(),
            handle: segment.representation(),
            nodes: segment.world_nodes().collect(),
        };
        match self.pending.iter_mut().find(|r| r.segment == request.segment) {
            Some(existing) => *existing = request,
            None => self.pending.push(request),
        }
    }
}
