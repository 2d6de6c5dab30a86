//! Geteilte Typen für layer-übergreifende Verträge (Konfiguration).

pub mod options;

pub use options::{
    CurveOptions, FloatingOriginOptions, LaneOptions, NearWindowOptions, RoadOptions,
    SimulationOptions,
};
