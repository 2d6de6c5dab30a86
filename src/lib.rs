//! Endless Road Library.
//! Endlose Straße aus einem recycelten Segment-Pool, mit Pfad- und Spur-Abfragen.

pub mod app;
pub mod core;
pub mod shared;

pub use app::{
    BakeQueue, NullSink, RepresentationSink, RoadEvent, RoadQueries, RoadSystem, SteeringAssist,
    TickReport,
};
pub use core::{
    closest_point_on_polyline, ClosestPoint, CurveProfile, CurveProfileEvaluator,
    DistanceCounter, Lane, LaneId, LaneSet, PathIndex, PathPoint, Pose, ResponseCurve, RoadError,
    Segment, SegmentId, SegmentPool, SegmentPrefab, TrackedTransform, Traveler,
};
pub use shared::{LaneOptions, RoadOptions};
