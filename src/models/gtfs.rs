//! Rows of the GTFS feed files the service reads.
//!
//! Only the columns the service uses are declared; any other column in the
//! feed is ignored by the CSV deserializer.

use serde::Deserialize;

/// A row of `routes.txt`.
#[derive(Debug, Clone, Deserialize)]
pub struct GtfsRoute {
    pub route_id: String,
    #[serde(default)]
    pub route_short_name: Option<String>,
    #[serde(default)]
    pub route_long_name: String,
}

/// A row of `trips.txt`.
#[derive(Debug, Clone, Deserialize)]
pub struct GtfsTrip {
    pub route_id: String,
    pub trip_id: String,
    #[serde(default)]
    pub shape_id: Option<String>,
}

/// A row of `shapes.txt`.
#[derive(Debug, Clone, Deserialize)]
pub struct GtfsShapePoint {
    pub shape_id: String,
    pub shape_pt_lat: f64,
    pub shape_pt_lon: f64,
    pub shape_pt_sequence: u32,
}

/// A row of `stops.txt`.
#[derive(Debug, Clone, Deserialize)]
pub struct GtfsStop {
    pub stop_id: String,
    #[serde(default)]
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
}
