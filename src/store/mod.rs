//! The static data store.
//!
//! Everything is read once at startup from the data directory and then held
//! read-only for the life of the process. Request handlers only ever borrow
//! from [`StaticDataStore`].

pub mod gtfs;
pub mod layers;
pub mod ridership;
pub mod routes;
pub mod stops;

use tracing::{error, info, warn};

use crate::analyzers::combine::combine_routes;
use crate::config::DataPaths;
use crate::error::{DataLoadError, ServiceError};

pub use gtfs::GtfsFeed;
pub use ridership::RidershipTable;
pub use routes::RouteTable;
pub use stops::{NearbyStop, StopTable};

pub struct StaticDataStore {
    stops: Option<StopTable>,
    routes: RouteTable,
    ridership: Option<RidershipTable>,
}

impl StaticDataStore {
    /// Loads every table under `paths`.
    ///
    /// A missing layer is logged and left empty. Loading fails if the data
    /// directory does not exist, if a layer file exists but cannot be parsed,
    /// or if neither stops nor ridership end up available.
    #[tracing::instrument(skip_all, fields(root = %paths.root.display()))]
    pub fn load(paths: &DataPaths) -> Result<Self, DataLoadError> {
        if !paths.root.is_dir() {
            return Err(DataLoadError::Missing(paths.root.clone()));
        }

        let feed = GtfsFeed::load(paths);
        let ridership = load_ridership(paths)?;
        let stops = load_stops(paths, &feed)?;

        if stops.is_none() && ridership.is_none() {
            error!("No stop data and no ridership data available");
            return Err(DataLoadError::NoData);
        }

        let routes = RouteTable::new(combine_routes(&feed.routes, &feed.shapes, &feed.trips));
        if routes.is_empty() {
            warn!("No route data found");
        }

        let store = Self::from_tables(stops, routes, ridership);
        info!(
            stops = store.stops.as_ref().map_or(0, StopTable::len),
            routes = store.routes.len(),
            ridership_rows = store.ridership.as_ref().map_or(0, RidershipTable::len),
            blocks = store.ridership.as_ref().map_or(0, |r| r.blocks().len()),
            "Static data loaded"
        );

        Ok(store)
    }

    /// Assembles a store from tables already in memory. Empty tables are
    /// treated as never loaded.
    pub fn from_tables(
        stops: Option<StopTable>,
        routes: RouteTable,
        ridership: Option<RidershipTable>,
    ) -> Self {
        Self {
            stops: stops.filter(|t| !t.is_empty()),
            routes,
            ridership: ridership.filter(|t| !t.is_empty()),
        }
    }

    pub fn stops(&self) -> Result<&StopTable, ServiceError> {
        self.stops
            .as_ref()
            .ok_or(ServiceError::DataUnavailable("Stop"))
    }

    pub fn ridership(&self) -> Result<&RidershipTable, ServiceError> {
        self.ridership
            .as_ref()
            .ok_or(ServiceError::DataUnavailable("Ridership"))
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }
}

fn load_ridership(paths: &DataPaths) -> Result<Option<RidershipTable>, DataLoadError> {
    let path = &paths.ridership;
    if !path.exists() {
        warn!(file = %path.display(), "GeoJSON file not found");
        return Ok(None);
    }

    let collection = layers::read_feature_collection(path)
        .map_err(|source| DataLoadError::corrupt(path, source))?;
    let records = layers::ridership_from_features(&collection);
    info!(file = %path.display(), rows = records.len(), "Loaded GeoJSON file");

    if records.is_empty() {
        warn!(file = %path.display(), "Ridership layer has no usable rows");
        return Ok(None);
    }

    Ok(Some(RidershipTable::new(records)))
}

fn load_stops(paths: &DataPaths, feed: &GtfsFeed) -> Result<Option<StopTable>, DataLoadError> {
    let path = &paths.stops;
    let stops = if path.exists() {
        let collection = layers::read_feature_collection(path)
            .map_err(|source| DataLoadError::corrupt(path, source))?;
        let stops = layers::stops_from_features(&collection);
        info!(file = %path.display(), rows = stops.len(), "Loaded GeoJSON file");
        stops
    } else {
        warn!(file = %path.display(), "GeoJSON file not found, falling back to GTFS stops.txt");
        layers::stops_from_gtfs(&feed.stops)
    };

    if stops.is_empty() {
        warn!("No stop data found");
        return Ok(None);
    }

    Ok(Some(StopTable::new(stops)))
}
