//! Typed records for stops, routes, ridership and the derived analyses.

pub mod entities;
pub mod gtfs;
pub mod ids;

pub use entities::{
    AlternativeRoute, CoverageAnalysis, PeakHour, RidershipRecord, RouteGeometry, Stop,
};
pub use ids::{BlockId, RouteId, StopId};
