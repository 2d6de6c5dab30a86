//! Application-Layer: Verdrahtung, Ereignisse, Abfrage-API und Lenkhilfe.

pub mod assist;
pub mod events;
pub mod queries;
pub mod representation;
pub mod system;

pub use assist::SteeringAssist;
pub use events::{RoadEvent, RoadEventBus, RoadSubscriber};
pub use queries::RoadQueries;
pub use representation::{BakeQueue, BakeRequest, NullSink, RepresentationSink};
pub use system::{RoadSystem, TickReport};
