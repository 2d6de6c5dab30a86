//! Floating-Origin-Korrektur: verschiebt die gesamte Welt starr zurück,
//! sobald der Fahrer die Grenze auf der Fahrtachse überschreitet.

use glam::Vec3;

use super::pose::TRAVEL_AXIS;
use crate::shared::options::FloatingOriginOptions;

/// Weltgruppe, die beim Origin-Shift mitverschoben wird.
pub trait OriginShift {
    /// Verschiebt die Gruppe starr um `offset` (keine Rotation).
    fn shift_origin(&mut self, offset: Vec3);
}

/// Kumulativer Distanzzähler (z.B. für die Punktewertung).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DistanceCounter {
    pub value: f64,
}

impl DistanceCounter {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

/// Temporärer Anker: sammelt alle Gruppen, wird als Ganzes verschoben und
/// danach wieder aufgelöst.
pub struct ShiftAnchor<'a> {
    members: Vec<&'a mut dyn OriginShift>,
    offset: Vec3,
}

impl<'a> ShiftAnchor<'a> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            offset: Vec3::ZERO,
        }
    }

    /// Hängt eine Gruppe an den Anker.
    pub fn attach(&mut self, group: &'a mut dyn OriginShift) {
        self.members.push(group);
    }

    /// Verschiebt den Anker (wirkt erst beim Auflösen).
    pub fn translate(&mut self, offset: Vec3) {
        self.offset += offset;
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Löst den Anker auf: alle Gruppen erhalten dieselbe Verschiebung.
    pub fn release(self) -> usize {
        let count = self.members.len();
        for member in self.members {
            member.shift_origin(self.offset);
        }
        count
    }
}

impl Default for ShiftAnchor<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Überwacht die Fahrtachse und führt den Origin-Shift aus.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingOrigin {
    limit: f32,
    distance_unit_scale: f32,
    shift_count: u32,
}

impl FloatingOrigin {
    pub fn new(options: &FloatingOriginOptions) -> Self {
        Self {
            limit: options.limit,
            distance_unit_scale: options.distance_unit_scale,
            shift_count: 0,
        }
    }

    pub fn limit(&self) -> f32 {
        self.limit
    }

    /// Anzahl bisher ausgeführter Shifts.
    pub fn shift_count(&self) -> u32 {
        self.shift_count
    }

    /// `true` wenn die Fahrtachsen-Koordinate die Grenze überschreitet.
    pub fn needs_shift(&self, travel_coordinate: f32) -> bool {
        travel_coordinate > self.limit
    }

    /// Verschiebung eines Shifts: exakt `-limit` entlang der Fahrtachse.
    pub fn shift_offset(&self) -> Vec3 {
        -TRAVEL_AXIS * self.limit
    }

    /// Betrag, um den der Distanzzähler pro Shift verringert wird.
    pub fn counter_decrement(&self) -> f64 {
        self.limit as f64 / self.distance_unit_scale as f64
    }

    /// Führt den Shift aus, falls nötig. Alle Gruppen und der Zähler werden im
    /// selben Schritt angepasst.
    pub fn apply(
        &mut self,
        travel_coordinate: f32,
        groups: Vec<&mut dyn OriginShift>,
        counter: &mut DistanceCounter,
    ) -> Option<Vec3> {
        if !self.needs_shift(travel_coordinate) {
            return None;
        }

        let offset = self.shift_offset();
        let mut anchor = ShiftAnchor::new();
        for group in groups {
            anchor.attach(group);
        }
        anchor.translate(offset);
        let moved = anchor.release();

        counter.value -= self.counter_decrement();
        self.shift_count += 1;

        log::info!(
            "Floating Origin: {} Gruppen um {:.1} verschoben (Shift #{})",
            moved,
            offset.z,
            self.shift_count
        );
        Some(offset)
    }
}
