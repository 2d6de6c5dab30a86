//! Ereignisse des Straßensystems und typisierter Ereigniskanal.
//!
//! Der Kanal gehört dem `RoadSystem`. Abonnenten werden beim Aufbau
//! registriert und beim expliziten Teardown wieder entfernt.

use crate::core::SegmentId;

/// Struktur-Ereignis des Segment-Pools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoadEvent {
    /// Start-Kette vollständig aufgebaut (einmalig)
    AllSegmentsAligned { segments: Vec<SegmentId> },
    /// Ein einzelnes Segment wurde ans Kettenende versetzt
    SegmentRecycled { segment: SegmentId },
}

/// Interne Abonnenten der Pool-Ereignisse.
///
/// Die Reihenfolge der Registrierung ist die Zustellreihenfolge: der
/// Pfad-Index muss vor den Spuren aktualisiert werden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadSubscriber {
    PathIndex,
    LaneSet,
}

/// Warteschlange + Abonnentenliste.
#[derive(Debug, Default)]
pub struct RoadEventBus {
    queue: Vec<RoadEvent>,
    subscribers: Vec<RoadSubscriber>,
    delivered: u64,
}

impl RoadEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registriert einen Abonnenten (doppelte Registrierung wird ignoriert).
    pub fn subscribe(&mut self, subscriber: RoadSubscriber) {
        if !self.subscribers.contains(&subscriber) {
            self.subscribers.push(subscriber);
        }
    }

    /// Entfernt einen Abonnenten.
    pub fn unsubscribe(&mut self, subscriber: RoadSubscriber) {
        self.subscribers.retain(|s| *s != subscriber);
    }

    pub fn subscribers(&self) -> &[RoadSubscriber] {
        &self.subscribers
    }

    pub fn is_subscribed(&self, subscriber: RoadSubscriber) -> bool {
        self.subscribers.contains(&subscriber)
    }

    pub fn send(&mut self, event: RoadEvent) {
        self.queue.push(event);
    }

    /// Entnimmt alle wartenden Ereignisse.
    pub fn drain(&mut self) -> Vec<RoadEvent> {
        let events = std::mem::take(&mut self.queue);
        self.delivered += events.len() as u64;
        events
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Anzahl bisher zugestellter Ereignisse.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Entfernt alle Abonnenten und verwirft wartende Ereignisse.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.subscribers.clear();
    }
}
