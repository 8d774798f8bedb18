//! Joins GTFS routes, trips and shapes into one geometry per route.

use geo::{Coord, LineString};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::models::gtfs::{GtfsRoute, GtfsShapePoint, GtfsTrip};
use crate::models::{RouteGeometry, RouteId};

/// Resolves a path for every route row.
///
/// A route takes the shape of the first trip (in input order) that names
/// one. Routes without a resolvable shape keep the placeholder path. This
/// never fails: missing data only degrades geometry.
pub fn combine_routes(
    routes: &[GtfsRoute],
    shapes: &[GtfsShapePoint],
    trips: &[GtfsTrip],
) -> Vec<RouteGeometry> {
    let paths = build_shape_paths(shapes);

    let mut shape_for_route: HashMap<&str, &str> = HashMap::new();
    for trip in trips {
        if let Some(shape_id) = trip.shape_id.as_deref().filter(|s| !s.is_empty()) {
            shape_for_route.entry(&trip.route_id).or_insert(shape_id);
        }
    }

    let mut missing = 0usize;
    let combined: Vec<RouteGeometry> = routes
        .iter()
        .map(|row| {
            let id = RouteId::new(&row.route_id);
            let short_name = row.route_short_name.clone().filter(|s| !s.is_empty());
            let long_name = row.route_long_name.clone();

            let path = shape_for_route
                .get(row.route_id.as_str())
                .and_then(|shape_id| paths.get(shape_id));

            match path {
                Some(path) => RouteGeometry {
                    id,
                    short_name,
                    long_name,
                    path: path.clone(),
                    has_shape: true,
                },
                None => {
                    missing += 1;
                    debug!(route_id = %row.route_id, "No shape for route, using placeholder");
                    RouteGeometry::without_shape(id, short_name, long_name)
                }
            }
        })
        .collect();

    if missing > 0 {
        warn!(
            routes = combined.len(),
            without_shape = missing,
            "Some routes have no shape data"
        );
    }

    combined
}

/// Groups shape points by shape id and orders each group by sequence number.
/// Shapes with fewer than two points are dropped.
fn build_shape_paths(shapes: &[GtfsShapePoint]) -> HashMap<&str, LineString> {
    let mut grouped: HashMap<&str, Vec<&GtfsShapePoint>> = HashMap::new();
    for point in shapes {
        grouped.entry(&point.shape_id).or_default().push(point);
    }

    grouped
        .into_iter()
        .filter_map(|(shape_id, mut points)| {
            if points.len() < 2 {
                warn!(
                    shape_id,
                    points = points.len(),
                    "Shape too short to form a path"
                );
                return None;
            }
            points.sort_by_key(|p| p.shape_pt_sequence);
            let coords = points
                .iter()
                .map(|p| Coord {
                    x: p.shape_pt_lon,
                    y: p.shape_pt_lat,
                })
                .collect::<Vec<_>>();
            Some((shape_id, LineString::new(coords)))
        })
        .collect()
}
