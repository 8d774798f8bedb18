//! Output formatting for the transit layers.
//!
//! Renders stops and routes as GeoJSON features for mapping clients, and
//! pretty-prints JSON for the CLI.

use anyhow::Result;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::models::{RouteGeometry, Stop};
use crate::store::NearbyStop;

/// Writes `value` to stdout as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    debug!(bytes = text.len(), "Printing JSON");
    println!("{text}");
    Ok(())
}

fn feature(geometry: Geometry, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn properties(value: serde_json::Value) -> JsonObject {
    match value {
        serde_json::Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}

pub fn route_feature(route: &RouteGeometry) -> Feature {
    let mut props = properties(json!({
        "route_id": route.id,
        "route_long_name": route.long_name,
        "has_shape": route.has_shape,
    }));
    if let Some(short_name) = &route.short_name {
        props.insert("route_short_name".into(), json!(short_name));
    }
    feature(Geometry::from(&route.path), props)
}

pub fn routes_collection<'a>(
    routes: impl IntoIterator<Item = &'a RouteGeometry>,
) -> FeatureCollection {
    collection(routes.into_iter().map(route_feature).collect())
}

pub fn stop_feature(stop: &Stop) -> Feature {
    let props = properties(json!({
        "stop_id": stop.id,
        "stop_name": &*stop.name,
    }));
    feature(Geometry::from(&stop.location), props)
}

pub fn stops_collection<'a>(stops: impl IntoIterator<Item = &'a Stop>) -> FeatureCollection {
    collection(stops.into_iter().map(stop_feature).collect())
}

/// Stops with their distance to the query point, closest first.
pub fn nearby_collection(nearby: &[NearbyStop<'_>]) -> FeatureCollection {
    collection(
        nearby
            .iter()
            .map(|n| {
                let mut f = stop_feature(n.stop);
                let distance = (n.distance_m * 10.0).round() / 10.0;
                if let Some(props) = f.properties.as_mut() {
                    props.insert("distancia_m".into(), json!(distance));
                }
                f
            })
            .collect(),
    )
}
