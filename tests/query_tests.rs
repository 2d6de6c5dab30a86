use approx::assert_relative_eq;
use endless_road::{
    BakeQueue, DistanceCounter, LaneOptions, NullSink, RepresentationSink, RoadOptions,
    RoadSystem, Segment, SegmentId, SegmentPrefab, SteeringAssist, Traveler,
};
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;

fn straight_options() -> RoadOptions {
    let mut options = RoadOptions {
        prefabs: vec![SegmentPrefab::straight("gerade", 5, 10.0)],
        min_pool_size: 3,
        ..RoadOptions::default()
    };
    options.curve.lateral_range = 0.0;
    options.curve.min_angle = 0.0;
    options.curve.max_angle = 0.0;
    options
}

fn build() -> RoadSystem {
    RoadSystem::new(straight_options(), Box::new(NullSink))
        .expect("Konfiguration sollte gültig sein")
}

#[test]
fn test_closest_point_on_path_projects_onto_centerline() {
    let system = build();
    let hit = system
        .queries()
        .closest_point_on_path(Vec3::new(5.0, 0.0, 5.0));

    assert!(!hit.is_degenerate());
    assert_relative_eq!(hit.point.x, 0.0, epsilon = 1e-4);
    assert_relative_eq!(hit.point.z, 5.0, epsilon = 1e-4);
    assert_relative_eq!(hit.distance, 5.0, epsilon = 1e-4);
    assert_relative_eq!(hit.direction().z, 1.0, epsilon = 1e-4);
}

#[test]
fn test_closest_point_on_lane_uses_lane_offset() {
    let system = build();
    let queries = system.queries();

    let right = queries.closest_point_on_lane(1, Vec3::new(5.0, 0.0, 25.0));
    assert_relative_eq!(right.point.x, 3.5, epsilon = 1e-4);
    assert_relative_eq!(right.distance, 1.5, epsilon = 1e-4);

    let left = queries.closest_point_on_lane(0, Vec3::new(5.0, 0.0, 25.0));
    assert_relative_eq!(left.point.x, -3.5, epsilon = 1e-4);
    assert_relative_eq!(left.distance, 8.5, epsilon = 1e-4);
}

#[test]
fn test_unknown_lane_returns_sentinel() {
    let system = build();
    let hit = system.queries().closest_point_on_lane(99, Vec3::ZERO);

    assert!(hit.is_degenerate());
    assert!(hit.distance.is_infinite());
}

#[test]
fn test_closest_lane_picks_nearest_offset() {
    let system = build();
    let queries = system.queries();

    assert_eq!(queries.closest_lane_to(Vec3::new(2.0, 0.0, 30.0)), Some(1));
    assert_eq!(queries.closest_lane_to(Vec3::new(-2.0, 0.0, 30.0)), Some(0));
}

#[test]
fn test_lane_offset_taken_from_initial_position() {
    let mut options = straight_options();
    options.lanes = vec![LaneOptions {
        id: 7,
        offset: None,
        initial_position: Vec3::new(-2.0, 0.0, 0.0),
    }];
    let system =
        RoadSystem::new(options, Box::new(NullSink)).expect("Konfiguration sollte gültig sein");

    let lane = system.queries().lane(7).expect("Spur 7 sollte existieren");
    assert_relative_eq!(lane.offset(), -2.0);
    assert!(lane.left_side());
    assert!(lane
        .waypoints()
        .iter()
        .all(|w| (w.pose.position.x + 2.0).abs() < 1e-4));
}

#[test]
fn test_near_window_follows_traveler() {
    let mut system = build();
    let mut traveler = Traveler::new(Vec3::new(0.0, 0.0, 60.0), Vec3::Z);
    let mut counter = DistanceCounter::default();

    let report = system.update(&mut traveler, 0.0, &mut counter, &mut []);
    assert!(report.near_window_refreshed);

    let window = system.path_index().near_window();
    assert!(!window.is_empty());
    // Punkte weit hinten (z < 40) gehören nicht ins Fenster
    assert!(window.iter().all(|p| p.position.z > 40.0));
    assert!(window.windows(2).all(|w| w[0].travel <= w[1].travel));

    let near = system
        .queries()
        .closest_point_near(Vec3::new(1.0, 0.0, 80.0));
    assert_relative_eq!(near.point.z, 80.0, epsilon = 1e-4);

    // Innerhalb des Intervalls keine erneute Aktualisierung
    let again = system.update(&mut traveler, 0.1, &mut counter, &mut []);
    assert!(!again.near_window_refreshed);
}

#[test]
fn test_point_ahead_and_wrong_direction() {
    let system = build();
    let queries = system.queries();
    let traveler = Traveler::new(Vec3::new(3.5, 0.0, 20.0), Vec3::Z);

    assert!(queries.is_point_ahead(&traveler, Vec3::new(0.0, 0.0, 30.0)));
    assert!(!queries.is_point_ahead(&traveler, Vec3::new(0.0, 0.0, 10.0)));

    // Rechte Spur: mit der Pfadrichtung ist korrekt
    assert!(!queries.is_wrong_direction(Vec3::new(3.5, 0.0, 20.0), Vec3::Z));
    assert!(queries.is_wrong_direction(Vec3::new(3.5, 0.0, 20.0), -Vec3::Z));
    // Linke Spur ist Gegenverkehr
    assert!(queries.is_wrong_direction(Vec3::new(-3.5, 0.0, 20.0), Vec3::Z));
    assert!(!queries.is_wrong_direction(Vec3::new(-3.5, 0.0, 20.0), -Vec3::Z));
}

#[test]
fn test_steering_assist_targets_lane_ahead() {
    let system = build();
    let queries = system.queries();
    let assist = SteeringAssist::default();
    let traveler = Traveler::new(Vec3::new(0.0, 0.0, 12.0), Vec3::Z);

    let target = assist
        .target_on_lane(&queries, 1, traveler.position)
        .expect("Spur 1 sollte Wegpunkte haben");
    assert_relative_eq!(target.x, 3.5, epsilon = 1e-4);
    assert_relative_eq!(target.z, 27.0, epsilon = 1e-3);

    let steer = assist.steer_towards(&traveler, target);
    assert!(steer > 0.0 && steer < 1.0, "Lenkeinschlag {steer}");

    let left = assist.steer_towards(&traveler, Vec3::new(-40.0, 0.0, 13.0));
    assert_relative_eq!(left, -1.0);

    assert!(assist.target_on_lane(&queries, 99, traveler.position).is_none());
}

/// Teilt die Warteschlange mit dem Test, während das System die Box besitzt.
struct SharedQueue(Rc<RefCell<BakeQueue>>);

impl RepresentationSink for SharedQueue {
    fn request_rebuild(&mut self, segment: &Segment) {
        self.0.borrow_mut().request_rebuild(segment);
    }
}

#[test]
fn test_rebuild_requested_for_every_placed_segment() {
    let queue = Rc::new(RefCell::new(BakeQueue::new()));
    let mut system = RoadSystem::new(
        straight_options(),
        Box::new(SharedQueue(Rc::clone(&queue))),
    )
    .expect("Konfiguration sollte gültig sein");

    let initial = queue.borrow_mut().drain();
    assert_eq!(initial.len(), 3);
    assert!(initial.iter().all(|r| r.nodes.len() == 5));

    let mut traveler = Traveler::new(Vec3::new(0.0, 0.0, 111.0), Vec3::Z);
    let mut counter = DistanceCounter::default();
    system.update(&mut traveler, 0.0, &mut counter, &mut []);

    let after_recycle = queue.borrow_mut().drain();
    assert_eq!(after_recycle.len(), 1);
    assert_eq!(after_recycle[0].segment, SegmentId(0));
    assert_relative_eq!(after_recycle[0].nodes[0].position.z, 150.0, epsilon = 1e-3);
}
