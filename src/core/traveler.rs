//! Fahrer/Kamera-Zustand, wie er vom externen Fahrzeug pro Tick geliefert wird.

use glam::Vec3;

use super::floating_origin::OriginShift;
use super::pose::TRAVEL_AXIS;

/// Position und Blickrichtung des Fahrers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Traveler {
    pub position: Vec3,
    /// Vorwärtsrichtung (muss nicht normalisiert sein)
    pub forward: Vec3,
}

impl Traveler {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self { position, forward }
    }

    /// Koordinate auf der Fahrtachse.
    pub fn travel_coordinate(&self) -> f32 {
        self.position.dot(TRAVEL_AXIS)
    }

    /// Liegt `point` weiter als `min_distance` entfernt hinter dem Fahrer?
    pub fn is_behind(&self, point: Vec3, min_distance: f32) -> bool {
        let to_point = point - self.position;
        to_point.length() > min_distance && self.forward.dot(to_point) < 0.0
    }
}

impl Default for Traveler {
    fn default() -> Self {
        Self::new(Vec3::ZERO, TRAVEL_AXIS)
    }
}

impl OriginShift for Traveler {
    fn shift_origin(&mut self, offset: Vec3) {
        self.position += offset;
    }
}

/// Beliebiges externes Objekt, das beim Floating-Origin-Shift mitwandert
/// (z.B. Kamera, Verkehrsautos).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackedTransform {
    pub position: Vec3,
}

impl OriginShift for TrackedTransform {
    fn shift_origin(&mut self, offset: Vec3) {
        self.position += offset;
    }
}
