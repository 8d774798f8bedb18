//! Reading the GeoJSON layers: stop locations and per-block ridership.

use anyhow::{Result, bail};
use geo::Point;
use geojson::{Feature, FeatureCollection, GeoJson, Value};
use serde_json::Value as JsonValue;
use std::path::Path;
use tracing::warn;

use crate::models::gtfs::GtfsStop;
use crate::models::{BlockId, RidershipRecord, Stop, StopId};

pub const BLOCK_KEY: &str = "CVE_AGEB";

pub fn read_feature_collection(path: &Path) -> Result<FeatureCollection> {
    let text = std::fs::read_to_string(path)?;
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(feature) => Ok(FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        }),
        GeoJson::Geometry(_) => bail!("expected a FeatureCollection, found a bare geometry"),
    }
}

/// Builds stops from `paradas.geojson` features, skipping features without an
/// id or a point geometry.
pub fn stops_from_features(collection: &FeatureCollection) -> Vec<Stop> {
    let mut stops = Vec::with_capacity(collection.features.len());
    let mut skipped = 0usize;

    for feature in &collection.features {
        let id = feature.property("stop_id").and_then(coerce_label);
        let location = point_of(feature);

        match (id, location) {
            (Some(id), Some(location)) => {
                let name = feature
                    .property("stop_name")
                    .and_then(coerce_label)
                    .unwrap_or_default();
                stops.push(Stop {
                    id: StopId::new(id),
                    name: name.into(),
                    location,
                });
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(
            skipped,
            "Skipped stop features without stop_id or point geometry"
        );
    }

    stops
}

pub fn stops_from_gtfs(rows: &[GtfsStop]) -> Vec<Stop> {
    rows.iter()
        .filter(|row| !row.stop_id.is_empty())
        .map(|row| Stop {
            id: StopId::new(&row.stop_id),
            name: row.stop_name.as_str().into(),
            location: Point::new(row.stop_lon, row.stop_lat),
        })
        .collect()
}

/// Builds ridership rows from `aforo.geojson` features.
///
/// Features without a block id are dropped. Metric values that are not
/// finite numbers (or numeric strings) are kept as `None`.
pub fn ridership_from_features(collection: &FeatureCollection) -> Vec<RidershipRecord> {
    let mut records = Vec::with_capacity(collection.features.len());
    let mut skipped = 0usize;

    for feature in &collection.features {
        let Some(block) = feature.property(BLOCK_KEY).and_then(coerce_label) else {
            skipped += 1;
            continue;
        };

        let number = |key: &str| feature.property(key).and_then(coerce_number);

        records.push(RidershipRecord {
            block: BlockId::new(block),
            up_net: number("up_net"),
            down_net: number("down_net"),
            flujo: number("flujo"),
            aforo: number("aforo"),
            hora: feature.property("hora").and_then(coerce_label),
        });
    }

    if skipped > 0 {
        warn!(skipped, "Skipped ridership features without {BLOCK_KEY}");
    }

    records
}

fn point_of(feature: &Feature) -> Option<Point> {
    match &feature.geometry.as_ref()?.value {
        Value::Point(coords) if coords.len() >= 2 => Some(Point::new(coords[0], coords[1])),
        _ => None,
    }
}

/// Reads a JSON value as a finite number, accepting numeric strings.
pub fn coerce_number(value: &JsonValue) -> Option<f64> {
    let n = match value {
        JsonValue::Number(n) => n.as_f64()?,
        JsonValue::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Reads a JSON value as a label. Integral numbers print without a fraction.
pub fn coerce_label(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                // Integral floats print without a fraction.
                n.as_f64().filter(|f| f.is_finite()).map(|f| f.to_string())
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection(value: JsonValue) -> FeatureCollection {
        match value.to_string().parse::<GeoJson>().unwrap() {
            GeoJson::FeatureCollection(fc) => fc,
            _ => panic!("fixture is not a FeatureCollection"),
        }
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(5)), Some(5.0));
        assert_eq!(coerce_number(&json!(2.5)), Some(2.5));
        assert_eq!(coerce_number(&json!(" 7 ")), Some(7.0));
        assert_eq!(coerce_number(&json!("n/a")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!("NaN")), None);
    }

    #[test]
    fn test_coerce_label() {
        assert_eq!(coerce_label(&json!(7)), Some("7".into()));
        assert_eq!(coerce_label(&json!(7.0)), Some("7".into()));
        assert_eq!(coerce_label(&json!(" 07:00 ")), Some("07:00".into()));
        assert_eq!(coerce_label(&json!("")), None);
        assert_eq!(coerce_label(&json!(true)), None);
    }

    #[test]
    fn test_coerce_label_keeps_large_integers_distinct() {
        let max = coerce_label(&json!(u64::MAX));
        assert_eq!(max.as_deref(), Some("18446744073709551615"));
        let huge = coerce_label(&json!(1e20));
        assert_eq!(huge.as_deref(), Some("100000000000000000000"));
        assert_ne!(max, coerce_label(&json!(i64::MAX)));
    }

    #[test]
    fn test_stops_from_features() {
        let fc = collection(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"stop_id": "P1", "stop_name": "Centro"},
                 "geometry": {"type": "Point", "coordinates": [-89.62, 20.97]}},
                {"type": "Feature", "properties": {"stop_name": "Sin id"},
                 "geometry": {"type": "Point", "coordinates": [-89.60, 20.95]}},
                {"type": "Feature", "properties": {"stop_id": 42},
                 "geometry": null}
            ]
        }));

        let stops = stops_from_features(&fc);
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].id, StopId::new("P1"));
        assert_eq!(&*stops[0].name, "Centro");
        assert_eq!(stops[0].location, Point::new(-89.62, 20.97));
    }

    #[test]
    fn test_ridership_keeps_uncoercible_metrics_as_none() {
        let fc = collection(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": null,
                 "properties": {"CVE_AGEB": "AGEB001", "up_net": 5, "down_net": "2",
                                "flujo": 7, "aforo": 40.5, "hora": 8}},
                {"type": "Feature", "geometry": null,
                 "properties": {"CVE_AGEB": "AGEB001", "up_net": "x", "down_net": 1,
                                "flujo": 4, "aforo": 60}},
                {"type": "Feature", "geometry": null,
                 "properties": {"up_net": 1}}
            ]
        }));

        let records = ridership_from_features(&fc);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].down_net, Some(2.0));
        assert_eq!(records[0].hora.as_deref(), Some("8"));
        assert!(records[1].up_net.is_none());
        assert!(records[1].metrics().is_none());
    }
}
