//! Reading the GTFS CSV tables.
//!
//! Every GTFS file is optional: a missing or unreadable file is logged and
//! treated as an empty table.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::DataPaths;
use crate::models::gtfs::{GtfsRoute, GtfsShapePoint, GtfsStop, GtfsTrip};

/// The GTFS tables the service uses.
#[derive(Debug, Default)]
pub struct GtfsFeed {
    pub routes: Vec<GtfsRoute>,
    pub trips: Vec<GtfsTrip>,
    pub shapes: Vec<GtfsShapePoint>,
    pub stops: Vec<GtfsStop>,
}

impl GtfsFeed {
    #[tracing::instrument(skip_all, fields(dir = %paths.gtfs_dir.display()))]
    pub fn load(paths: &DataPaths) -> Self {
        Self {
            routes: load_optional(&paths.gtfs_file("routes.txt")),
            trips: load_optional(&paths.gtfs_file("trips.txt")),
            shapes: load_optional(&paths.gtfs_file("shapes.txt")),
            stops: load_optional(&paths.gtfs_file("stops.txt")),
        }
    }
}

fn load_optional<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    if !path.exists() {
        warn!(file = %path.display(), "GTFS file not found");
        return Vec::new();
    }

    match read_rows(path) {
        Ok(rows) => {
            info!(file = %path.display(), rows = rows.len(), "Loaded GTFS file");
            rows
        }
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Unreadable GTFS file, treating as absent");
            Vec::new()
        }
    }
}

/// Deserializes every row of a CSV file, skipping rows that do not fit `T`.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    // Fail on a bad header row rather than skipping every record.
    rdr.headers()
        .with_context(|| format!("reading header of {}", path.display()))?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.deserialize() {
        match result {
            Ok(record) => rows.push(record),
            Err(e) => {
                skipped += 1;
                debug!(file = %path.display(), error = %e, "Skipping malformed row");
            }
        }
    }

    if skipped > 0 {
        warn!(file = %path.display(), skipped, "Skipped malformed rows");
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("vayven_gtfs_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("gtfs")).unwrap();
        dir
    }

    #[test]
    fn test_read_rows_skips_malformed() {
        let dir = temp_dir("malformed");
        let path = dir.join("gtfs/shapes.txt");
        fs::write(
            &path,
            "shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence\n\
             S1,20.97,-89.62,1\n\
             S1,not-a-number,-89.61,2\n\
             S1,20.98,-89.60,3\n",
        )
        .unwrap();

        let rows: Vec<GtfsShapePoint> = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].shape_pt_sequence, 3);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_files_give_empty_tables() {
        let dir = temp_dir("missing");
        fs::write(
            dir.join("gtfs/routes.txt"),
            "route_id,route_short_name,route_long_name,route_type\nR1,1,Centro - Norte,3\n",
        )
        .unwrap();

        let feed = GtfsFeed::load(&DataPaths::from_dir(&dir));
        assert_eq!(feed.routes.len(), 1);
        assert_eq!(feed.routes[0].route_long_name, "Centro - Norte");
        assert_eq!(feed.routes[0].route_short_name.as_deref(), Some("1"));
        assert!(feed.trips.is_empty());
        assert!(feed.shapes.is_empty());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_trips_without_shape_column() {
        let dir = temp_dir("noshape");
        fs::write(
            dir.join("gtfs/trips.txt"),
            "route_id,service_id,trip_id\nR1,WK,T1\n",
        )
        .unwrap();

        let feed = GtfsFeed::load(&DataPaths::from_dir(&dir));
        assert_eq!(feed.trips.len(), 1);
        assert!(feed.trips[0].shape_id.is_none());

        fs::remove_dir_all(&dir).unwrap();
    }
}
