//! Endless Road: Headless-Simulation.
//!
//! Fährt einen Fahrer über die endlose Straße und protokolliert Recycling
//! und Floating-Origin-Verschiebungen. Optional: Pfad zur TOML-Konfiguration
//! als erstes Argument.

use endless_road::app::SteeringAssist;
use endless_road::core::OriginShift;
use endless_road::{
    DistanceCounter, RepresentationSink, RoadOptions, RoadSystem, Segment, TrackedTransform,
    Traveler,
};
use glam::Vec3;

/// Abstand der Kamera hinter dem Fahrer.
const CAMERA_TRAIL: Vec3 = Vec3::new(0.0, 3.0, -8.0);

/// Protokolliert Neuaufbau-Anforderungen statt zu rendern.
struct LogSink;

impl RepresentationSink for LogSink {
    fn request_rebuild(&mut self, segment: &Segment) {
        log::debug!(
            "Neuaufbau angefordert: Segment {} ({}), Profil-Winkel {:.2}",
            segment.id(),
            segment.prefab_name(),
            segment.profile().angle
        );
    }
}

fn main() -> anyhow::Result<()> {
    // Logger initialisieren
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Endless Road v{} startet...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(RoadOptions::config_path);
    let options = RoadOptions::load_from_file(&config_path);
    if !config_path.exists() {
        // Vorlage für eigene Anpassungen anlegen
        if let Err(e) = options.save_to_file(&config_path) {
            log::warn!("Standard-Optionen konnten nicht gespeichert werden: {}", e);
        }
    }
    let simulation = options.simulation.clone();

    let mut system = RoadSystem::new(options, Box::new(LogSink))?;
    let assist = SteeringAssist::default();
    let follow_lane = system.lanes().iter().find(|l| !l.left_side()).map(|l| l.id());

    let mut traveler = Traveler::new(Vec3::ZERO, Vec3::Z);
    let mut camera = TrackedTransform {
        position: traveler.position + CAMERA_TRAIL,
    };
    let mut counter = DistanceCounter::default();
    let unit_scale = system.options().floating_origin.distance_unit_scale as f64;

    let mut recycles = 0u32;
    for frame in 0..simulation.frames {
        let now = frame as f64 * simulation.frame_dt;

        let queries = system.queries();
        let target = follow_lane
            .and_then(|lane| assist.target_on_lane(&queries, lane, traveler.position))
            .unwrap_or_else(|| {
                let hit = queries.closest_point_on_path(traveler.position);
                hit.point + hit.direction() * assist.lookahead
            });
        if let Some(direction) = (target - traveler.position).try_normalize() {
            traveler.forward = direction;
        }
        let step = simulation.speed * simulation.frame_dt as f32;
        traveler.position += traveler.forward * step;
        camera.position = traveler.position + CAMERA_TRAIL;
        counter.value += step as f64 / unit_scale;

        let mut external: [&mut dyn OriginShift; 1] = [&mut camera];
        let report = system.update(&mut traveler, now, &mut counter, &mut external);
        if let Some(segment) = report.recycled {
            recycles += 1;
            log::debug!("Frame {}: Segment {} recycelt", frame, segment);
        }
        if let Some(offset) = report.origin_shift {
            log::info!(
                "Frame {}: Welt um {:.1} verschoben, Zähler {:.3}",
                frame,
                offset.z,
                counter.value
            );
        }
    }

    log::info!(
        "Simulation beendet: {} Frames, {} Recycles, {} Origin-Shifts, Zähler {:.3}",
        simulation.frames,
        recycles,
        system.floating_origin().shift_count(),
        counter.value
    );
    system.teardown();
    Ok(())
}
