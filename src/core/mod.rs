//! Core-Domänentypen: Segmente, Kurvenprofile, Pfad-Index, Spuren, Floating Origin.

pub mod closest_point;
pub mod curve_profile;
pub mod error;
pub mod floating_origin;
pub mod lane;
pub mod path_index;
pub mod pool;
pub mod pose;
pub mod segment;
pub mod spatial;
pub mod traveler;

pub use closest_point::{closest_point_on_polyline, is_point_ahead, ClosestPoint};
pub use curve_profile::{
    CurveInterpolation, CurveKey, CurveProfile, CurveProfileEvaluator, ResponseCurve,
};
pub use error::RoadError;
pub use floating_origin::{DistanceCounter, FloatingOrigin, OriginShift, ShiftAnchor};
pub use lane::{Lane, LaneId, LaneSet, Waypoint};
pub use path_index::{PathIndex, PathPoint, PathPointRef, RefreshThrottle};
pub use pool::{SegmentPool, CHAIN_EPSILON};
pub use pose::{look_rotation, Pose, TRAVEL_AXIS};
pub use segment::{RepresentationHandle, Segment, SegmentId, SegmentPrefab};
pub use spatial::{SpatialIndex, SpatialMatch};
pub use traveler::{TrackedTransform, Traveler};
