//! Verdrahtung aller Dienste: Pool, Pfad-Index, Spuren, Floating Origin.
//!
//! Pro Frame: Recycling-Prüfung → Ereignis-Zustellung → Origin-Prüfung →
//! gedrosseltes Nah-Fenster. Nur dieser Ablauf schreibt in Pfad-Index und
//! Spuren; Abfragen sind read-only.

use glam::Vec3;

use super::events::{RoadEvent, RoadEventBus, RoadSubscriber};
use super::queries::RoadQueries;
use super::representation::RepresentationSink;
use crate::core::{
    CurveProfileEvaluator, DistanceCounter, FloatingOrigin, LaneSet, OriginShift, PathIndex,
    Pose, RoadError, SegmentId, SegmentPool, Traveler,
};
use crate::shared::RoadOptions;

/// Ergebnis eines Frames.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    /// In diesem Frame recyceltes Segment
    pub recycled: Option<SegmentId>,
    /// Ausgeführte Origin-Verschiebung
    pub origin_shift: Option<Vec3>,
    /// Nah-Fenster wurde neu aufgebaut
    pub near_window_refreshed: bool,
}

/// Das komplette Straßensystem.
pub struct RoadSystem {
    options: RoadOptions,
    evaluator: CurveProfileEvaluator,
    pool: SegmentPool,
    path: PathIndex,
    lanes: LaneSet,
    floating_origin: FloatingOrigin,
    events: RoadEventBus,
    sink: Box<dyn RepresentationSink>,
    frame: u64,
    active: bool,
}

impl std::fmt::Debug for RoadSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoadSystem")
            .field("segments", &self.pool.len())
            .field("path_points", &self.path.len())
            .field("lanes", &self.lanes.len())
            .field("frame", &self.frame)
            .field("active", &self.active)
            .finish()
    }
}

impl RoadSystem {
    /// Baut Pool, Pfad-Index und Spuren auf. Konfigurationsfehler sind fatal.
    pub fn new(options: RoadOptions, sink: Box<dyn RepresentationSink>) -> Result<Self, RoadError> {
        options
            .validate()
            .inspect_err(|e| log::error!("Konfiguration ungültig: {}", e))?;

        let mut events = RoadEventBus::new();
        events.subscribe(RoadSubscriber::PathIndex);
        events.subscribe(RoadSubscriber::LaneSet);

        let mut system = Self {
            evaluator: CurveProfileEvaluator::new(options.curve.clone()),
            pool: SegmentPool::new(options.recycle_distance),
            path: PathIndex::new(options.near_window.refresh_interval_secs),
            lanes: LaneSet::new(&options.lanes),
            floating_origin: FloatingOrigin::new(&options.floating_origin),
            events,
            sink,
            frame: 0,
            active: true,
            options,
        };

        let segments = system.pool.create_initial_chain(
            &system.options.prefabs,
            system.options.min_pool_size,
            Pose::IDENTITY,
            &mut system.evaluator,
            system.options.curve.curve_initial_segments,
        )?;
        for segment in system.pool.chain() {
            system.sink.request_rebuild(segment);
        }
        system
            .events
            .send(RoadEvent::AllSegmentsAligned { segments });
        system.dispatch_events();

        log::info!(
            "Straßensystem bereit: {} Segmente, {} Pfadpunkte, {} Spuren",
            system.pool.len(),
            system.path.len(),
            system.lanes.len()
        );
        Ok(system)
    }

    /// Ein Frame. `now_secs` ist Wall-Clock-Zeit für die Drosselung des Nah-Fensters.
    ///
    /// `external` sind weitere Weltgruppen (Kamera, Verkehr), die beim
    /// Origin-Shift mitverschoben werden.
    pub fn update(
        &mut self,
        traveler: &mut Traveler,
        now_secs: f64,
        counter: &mut DistanceCounter,
        external: &mut [&mut dyn OriginShift],
    ) -> TickReport {
        let mut report = TickReport::default();
        if !self.active {
            return report;
        }
        self.frame += 1;

        report.recycled = self.pool.tick(traveler, &mut self.evaluator);
        if let Some(segment_id) = report.recycled {
            if let Some(segment) = self.pool.segment(segment_id) {
                self.sink.request_rebuild(segment);
            }
            self.events.send(RoadEvent::SegmentRecycled {
                segment: segment_id,
            });
        }
        self.dispatch_events();

        let travel = traveler.travel_coordinate();
        if self.floating_origin.needs_shift(travel) {
            let mut groups: Vec<&mut dyn OriginShift> =
                vec![&mut self.pool, &mut self.path, &mut self.lanes, &mut *traveler];
            for group in external.iter_mut() {
                groups.push(&mut **group);
            }
            report.origin_shift = self.floating_origin.apply(travel, groups, counter);
        }

        let window = &self.options.near_window;
        report.near_window_refreshed = self.path.tick_near_window(
            now_secs,
            traveler.position,
            traveler.forward,
            window.max_distance,
            window.min_front_distance,
        );

        report
    }

    /// Stellt alle wartenden Ereignisse in Registrierungsreihenfolge zu.
    fn dispatch_events(&mut self) {
        for event in self.events.drain() {
            for subscriber in self.events.subscribers() {
                deliver(&event, *subscriber, &self.pool, &mut self.path, &mut self.lanes);
            }
        }
    }

    /// Meldet alle Abonnenten ab und stoppt weitere Updates.
    pub fn teardown(&mut self) {
        self.events.clear();
        self.active = false;
        log::info!("Straßensystem nach {} Frames beendet", self.frame);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Read-only Abfragen auf dem aktuellen Stand.
    pub fn queries(&self) -> RoadQueries<'_> {
        RoadQueries::new(&self.path, &self.lanes)
    }

    pub fn pool(&self) -> &SegmentPool {
        &self.pool
    }

    pub fn path_index(&self) -> &PathIndex {
        &self.path
    }

    pub fn lanes(&self) -> &LaneSet {
        &self.lanes
    }

    pub fn floating_origin(&self) -> &FloatingOrigin {
        &self.floating_origin
    }

    pub fn events(&self) -> &RoadEventBus {
        &self.events
    }

    pub fn options(&self) -> &RoadOptions {
        &self.options
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

fn deliver(
    event: &RoadEvent,
    subscriber: RoadSubscriber,
    pool: &SegmentPool,
    path: &mut PathIndex,
    lanes: &mut LaneSet,
) {
    match (event, subscriber) {
        (RoadEvent::AllSegmentsAligned { .. }, RoadSubscriber::PathIndex) => path.rebuild(pool),
        (RoadEvent::AllSegmentsAligned { .. }, RoadSubscriber::LaneSet) => {
            lanes.create_waypoints(path)
        }
        (RoadEvent::SegmentRecycled { segment }, RoadSubscriber::PathIndex) => {
            path.resync_segment(pool, *segment)
        }
        (RoadEvent::SegmentRecycled { segment }, RoadSubscriber::LaneSet) => {
            lanes.resync_after_segment_recycle(path, *segment)
        }
    }
}
