//! Entities loaded at startup and the records derived from them per request.

use geo::{Coord, LineString, Point};
use serde::Serialize;
use std::sync::Arc;

use crate::models::ids::{BlockId, RouteId, StopId};

/// A boarding location with its position as (longitude, latitude).
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub name: Arc<str>,
    pub location: Point,
}

/// A route and the path resolved for it at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    pub id: RouteId,
    pub short_name: Option<String>,
    pub long_name: String,
    pub path: LineString,
    /// `false` when `path` is the placeholder rather than a GTFS shape.
    pub has_shape: bool,
}

impl RouteGeometry {
    /// A route with no shape data. The path is a single repeated point so
    /// every route still carries a line geometry.
    pub fn without_shape(id: RouteId, short_name: Option<String>, long_name: String) -> Self {
        Self {
            id,
            short_name,
            long_name,
            path: Self::placeholder_path(),
            has_shape: false,
        }
    }

    pub fn placeholder_path() -> LineString {
        let origin = Coord { x: 0.0, y: 0.0 };
        LineString::new(vec![origin, origin])
    }
}

/// One row of the per-block ridership layer.
///
/// Metric columns are `None` when the source value could not be read as a
/// finite number; such rows are skipped by aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct RidershipRecord {
    pub block: BlockId,
    pub up_net: Option<f64>,
    pub down_net: Option<f64>,
    pub flujo: Option<f64>,
    pub aforo: Option<f64>,
    pub hora: Option<String>,
}

/// The metric columns of a [`RidershipRecord`] that coerced cleanly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMetrics {
    pub up_net: f64,
    pub down_net: f64,
    pub flujo: f64,
    pub aforo: f64,
}

impl RidershipRecord {
    pub fn metrics(&self) -> Option<RowMetrics> {
        Some(RowMetrics {
            up_net: self.up_net?,
            down_net: self.down_net?,
            flujo: self.flujo?,
            aforo: self.aforo?,
        })
    }
}

/// Mean occupancy for one hour of the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakHour {
    pub hora: String,
    pub aforo: f64,
}

/// Summary metrics for one census block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageAnalysis {
    pub cve_ageb: BlockId,
    pub up_net: i64,
    pub down_net: i64,
    pub flujo: i64,
    pub aforo: f64,
    pub horas_pico: Vec<PeakHour>,
}

/// A candidate path between two stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeRoute {
    pub origen: StopId,
    pub destino: StopId,
    pub ruta_principal: RouteId,
    pub ruta_alterna: RouteId,
    /// Minutes.
    pub tiempo_estimado: u32,
    pub transbordos: Vec<StopId>,
}
