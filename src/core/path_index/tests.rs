use super::*;
use crate::core::{CurveProfileEvaluator, Segment, SegmentPrefab};
use crate::shared::options::CurveOptions;
use approx::assert_relative_eq;

fn evaluator() -> CurveProfileEvaluator {
    CurveProfileEvaluator::new(CurveOptions {
        seed: Some(21),
        ..CurveOptions::default()
    })
}

fn straight_pool() -> SegmentPool {
    let mut pool = SegmentPool::new(20.0);
    pool.create_initial_chain(
        &[SegmentPrefab::straight("test", 5, 10.0)],
        3,
        Pose::IDENTITY,
        &mut evaluator(),
        false,
    )
    .expect("Kette erwartet");
    pool
}

fn assert_sorted(points: &[PathPoint]) {
    assert!(points.windows(2).all(|w| w[0].travel <= w[1].travel));
}

/// Pfad entlang der Z-Achse mit Punkten bei z = 0, 10, ..., 200.
fn line_index() -> PathIndex {
    let nodes: Vec<Pose> = (0..21)
        .map(|i| Pose::from_position(Vec3::new(0.0, 0.0, i as f32 * 10.0)))
        .collect();
    let segment = Segment::from_rest_nodes(
        SegmentId(0),
        "linie",
        Pose::IDENTITY,
        nodes,
        Pose::IDENTITY,
    );
    let pool = SegmentPool::from_segments(vec![segment], 20.0);
    let mut index = PathIndex::new(0.25);
    index.rebuild(&pool);
    index
}

#[test]
fn test_rebuild_flattens_and_sorts() {
    let pool = straight_pool();
    let mut index = PathIndex::new(0.25);
    index.rebuild(&pool);

    assert_eq!(index.len(), 15);
    assert_sorted(index.points());
    assert_eq!(index.points()[0].position, Vec3::ZERO);
    assert_eq!(index.points()[14].position, Vec3::new(0.0, 0.0, 140.0));
    assert_eq!(
        index.index_of(PathPointRef {
            segment: SegmentId(1),
            node: 0
        }),
        Some(5)
    );
}

#[test]
fn test_resync_moves_recycled_points_to_end() {
    let mut pool = straight_pool();
    let mut index = PathIndex::new(0.25);
    index.rebuild(&pool);

    assert!(pool.recycle_segment(SegmentId(0), &mut evaluator()));
    index.resync_segment(&pool, SegmentId(0));

    assert_eq!(index.len(), 15);
    assert_sorted(index.points());
    let tail_sources: Vec<SegmentId> = index.points()[10..]
        .iter()
        .map(|p| p.source.segment)
        .collect();
    assert!(tail_sources.iter().all(|s| *s == SegmentId(0)));
    // Wurzelknoten des recycelten Segments liegt auf dem alten Ende-Anker
    assert_relative_eq!(index.points()[10].position.z, 150.0, epsilon = 1e-4);
}

#[test]
fn test_rebuild_equals_incremental_resync() {
    let mut pool = straight_pool();
    let mut incremental = PathIndex::new(0.25);
    incremental.rebuild(&pool);

    let mut eval = evaluator();
    for id in [0, 1, 2, 0] {
        assert!(pool.recycle_segment(SegmentId(id), &mut eval));
        incremental.resync_segment(&pool, SegmentId(id));
    }

    let mut full = PathIndex::new(0.25);
    full.rebuild(&pool);
    assert_eq!(incremental.points(), full.points());
}

/// Pfad aus einzelnen Punkten auf der Z-Achse.
fn index_from_z(values: &[f32]) -> PathIndex {
    let nodes: Vec<Pose> = values
        .iter()
        .map(|z| Pose::from_position(Vec3::new(0.0, 0.0, *z)))
        .collect();
    let segment = Segment::from_rest_nodes(SegmentId(0), "punkte", Pose::IDENTITY, nodes, Pose::IDENTITY);
    let pool = SegmentPool::from_segments(vec![segment], 20.0);
    let mut index = PathIndex::new(0.25);
    index.rebuild(&pool);
    index
}

#[test]
fn test_near_window_scenario() {
    let mut index = index_from_z(&[-80.0, -15.0, 10.0, 200.0]);

    index.refresh_near_window(Vec3::ZERO, Vec3::Z, 125.0, 20.0);
    let window: Vec<f32> = index.near_window().iter().map(|p| p.position.z).collect();
    // 15 hinter dem Fahrer bleibt, 80 hinter dem Fahrer und 200 entfernt fliegen raus
    assert_eq!(window, vec![-15.0, 10.0]);

    index.refresh_near_window(Vec3::ZERO, -Vec3::Z, 125.0, 20.0);
    let window: Vec<f32> = index.near_window().iter().map(|p| p.position.z).collect();
    // Richtung egal: 200 bleibt draußen, 15 bleibt drin
    assert_eq!(window, vec![-80.0, -15.0, 10.0]);
}

#[test]
fn test_near_window_evicts_far_points_regardless_of_heading() {
    let mut index = line_index();
    index.refresh_near_window(Vec3::new(0.0, 0.0, -100.0), Vec3::Z, 125.0, 20.0);
    let window: Vec<f32> = index.near_window().iter().map(|p| p.position.z).collect();

    // z=100 liegt 200 Einheiten voraus → nicht im Fenster
    assert!(!window.contains(&100.0));
    assert_eq!(window, vec![0.0, 10.0, 20.0]);
}

#[test]
fn test_near_window_close_points_count_as_front() {
    let mut index = line_index();
    // Blick nach hinten: nur sehr nahe Punkte hinter dem Blick bleiben
    index.refresh_near_window(Vec3::new(0.0, 0.0, 100.0), -Vec3::Z, 125.0, 20.0);
    let window: Vec<f32> = index.near_window().iter().map(|p| p.position.z).collect();

    assert!(window.contains(&110.0));
    assert!(!window.contains(&120.0));
    assert!(window.contains(&0.0));
}

#[test]
fn test_tick_near_window_is_throttled() {
    let mut index = line_index();
    assert!(index.tick_near_window(0.0, Vec3::ZERO, Vec3::Z, 125.0, 20.0));
    assert!(!index.tick_near_window(0.1, Vec3::ZERO, Vec3::Z, 125.0, 20.0));
    assert!(index.tick_near_window(0.3, Vec3::ZERO, Vec3::Z, 125.0, 20.0));
}

#[test]
fn test_closest_point_scenario() {
    let nodes = vec![
        Pose::from_position(Vec3::new(0.0, 0.0, 0.0)),
        Pose::from_position(Vec3::new(0.0, 0.0, 10.0)),
        Pose::from_position(Vec3::new(0.0, 0.0, 20.0)),
    ];
    let segment = Segment::from_rest_nodes(SegmentId(0), "s", Pose::IDENTITY, nodes, Pose::IDENTITY);
    let pool = SegmentPool::from_segments(vec![segment], 20.0);
    let mut index = PathIndex::new(0.25);
    index.rebuild(&pool);

    let hit = index.closest_point(Vec3::new(5.0, 0.0, 5.0));
    assert_eq!(hit.point, Vec3::new(0.0, 0.0, 5.0));
    assert_eq!(hit.tangent, Vec3::new(0.0, 0.0, 10.0));
    assert_relative_eq!(hit.distance, 5.0);
}

#[test]
fn test_empty_index_returns_sentinel() {
    let index = PathIndex::new(0.25);
    let hit = index.closest_point(Vec3::new(1.0, 2.0, 3.0));
    assert!(hit.is_degenerate());
    assert_eq!(hit.point, Vec3::ZERO);
    assert_eq!(hit.tangent, Vec3::Z);
    assert!(index.closest_point_on_near_window(Vec3::ONE).is_degenerate());
    assert!(index.nearest_point(Vec3::ONE).is_none());
}

#[test]
fn test_nearest_point_uses_spatial_index() {
    let index = line_index();
    let (point, distance) = index
        .nearest_point(Vec3::new(1.0, 0.0, 41.0))
        .expect("Treffer erwartet");
    assert_eq!(point.position, Vec3::new(0.0, 0.0, 40.0));
    assert_relative_eq!(distance, 2.0f32.sqrt(), epsilon = 1e-5);
}

#[test]
fn test_translate_keeps_order_and_shifts_window() {
    let mut index = line_index();
    index.refresh_near_window(Vec3::new(0.0, 0.0, 100.0), Vec3::Z, 125.0, 20.0);
    let window_len = index.near_window().len();

    index.translate(Vec3::new(0.0, 0.0, -100.0));

    assert_eq!(index.points()[0].position.z, -100.0);
    assert_eq!(index.points()[0].travel, -100.0);
    assert_eq!(index.near_window().len(), window_len);
    assert_sorted(index.points());
    let (nearest, _) = index.nearest_point(Vec3::ZERO).expect("Treffer erwartet");
    assert_eq!(nearest.position, Vec3::ZERO);
}

#[test]
fn test_long_recycle_run_keeps_travel_order_and_heading() {
    let mut evaluator = CurveProfileEvaluator::new(CurveOptions {
        seed: Some(7),
        ..CurveOptions::default()
    });
    let mut pool = SegmentPool::new(20.0);
    pool.create_initial_chain(
        &[SegmentPrefab::straight("test", 5, 10.0)],
        3,
        Pose::IDENTITY,
        &mut evaluator,
        true,
    )
    .expect("Kette erwartet");
    let mut index = PathIndex::new(0.25);
    index.rebuild(&pool);

    for step in 0..3000 {
        let head = pool.order()[0];
        assert!(pool.recycle_segment(head, &mut evaluator));
        index.resync_segment(&pool, head);

        let chain_sources: Vec<PathPointRef> = pool
            .chain()
            .flat_map(|segment| {
                (0..segment.node_count()).map(move |node| PathPointRef {
                    segment: segment.id(),
                    node,
                })
            })
            .collect();
        let sorted_sources: Vec<PathPointRef> =
            index.points().iter().map(|p| p.source).collect();
        assert_eq!(sorted_sources, chain_sources, "Schritt {step}");

        let tail = pool
            .tail_id()
            .and_then(|id| pool.segment(id))
            .and_then(Segment::end_anchor)
            .expect("Anker erwartet");
        assert!(
            tail.forward().angle_between(Vec3::Z) < 1e-3,
            "Schritt {step}: Fahrtrichtung gedreht"
        );
    }
    assert!(pool.is_contiguous(crate::core::CHAIN_EPSILON));
}
