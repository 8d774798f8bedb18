//! Runtime configuration handed from the CLI to the library.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 5_000;

/// Locations of the static files read at startup.
///
/// Laid out under a single data directory:
/// ```text
/// data/
///   aforo.geojson
///   paradas.geojson
///   gtfs/routes.txt, trips.txt, shapes.txt, stops.txt
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub root: PathBuf,
    pub ridership: PathBuf,
    pub stops: PathBuf,
    pub gtfs_dir: PathBuf,
}

impl DataPaths {
    pub fn from_dir(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            ridership: root.join("aforo.geojson"),
            stops: root.join("paradas.geojson"),
            gtfs_dir: root.join("gtfs"),
            root,
        }
    }

    pub fn gtfs_file(&self, name: &str) -> PathBuf {
        self.gtfs_dir.join(name)
    }
}

/// Settings for the HTTP/WebSocket service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub data: DataPaths,
    /// Upper bound on a single broadcast delivery to one connection.
    pub send_timeout: Duration,
}

impl ServiceConfig {
    pub fn new(bind: SocketAddr, data_dir: impl AsRef<Path>, send_timeout_ms: u64) -> Self {
        Self {
            bind,
            data: DataPaths::from_dir(data_dir),
            send_timeout: Duration::from_millis(send_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_paths_layout() {
        let paths = DataPaths::from_dir("/srv/data");
        assert_eq!(paths.ridership, PathBuf::from("/srv/data/aforo.geojson"));
        assert_eq!(paths.stops, PathBuf::from("/srv/data/paradas.geojson"));
        assert_eq!(
            paths.gtfs_file("shapes.txt"),
            PathBuf::from("/srv/data/gtfs/shapes.txt")
        );
    }

    #[test]
    fn test_default_bind_parses() {
        let bind: SocketAddr = DEFAULT_BIND.parse().unwrap();
        let config = ServiceConfig::new(bind, "data", DEFAULT_SEND_TIMEOUT_MS);
        assert_eq!(config.bind.port(), 8000);
        assert_eq!(config.send_timeout, Duration::from_secs(5));
    }
}
