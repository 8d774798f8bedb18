//! The stop table: id lookup plus an R-tree for nearest-stop queries.
//!
//! The R-tree works on raw (lon, lat) degrees to pick candidates; reported
//! distances are haversine metres.

use geo::{Distance, Haversine, Point};
use rstar::{AABB, PointDistance, RTree, RTreeObject};
use std::collections::HashMap;

use crate::models::{Stop, StopId};

#[derive(Clone)]
struct StopNode {
    index: usize,
    point: [f64; 2],
}

impl RTreeObject for StopNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for StopNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// A stop returned by [`StopTable::nearest`].
#[derive(Debug, Clone, Copy)]
pub struct NearbyStop<'a> {
    pub stop: &'a Stop,
    pub distance_m: f64,
}

pub struct StopTable {
    stops: Vec<Stop>,
    by_id: HashMap<StopId, usize>,
    tree: RTree<StopNode>,
}

impl StopTable {
    /// Builds the table. When an id repeats, the first occurrence wins.
    pub fn new(stops: Vec<Stop>) -> Self {
        let mut by_id = HashMap::with_capacity(stops.len());
        let mut unique = Vec::with_capacity(stops.len());

        for stop in stops {
            if by_id.contains_key(&stop.id) {
                tracing::warn!(stop_id = %stop.id, "Duplicate stop id, keeping the first");
                continue;
            }
            by_id.insert(stop.id.clone(), unique.len());
            unique.push(stop);
        }

        let tree = RTree::bulk_load(
            unique
                .iter()
                .enumerate()
                .map(|(index, stop)| StopNode {
                    index,
                    point: [stop.location.x(), stop.location.y()],
                })
                .collect(),
        );

        Self {
            stops: unique,
            by_id,
            tree,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Stop> {
        self.by_id.get(id).map(|&index| &self.stops[index])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Stops in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Stop> {
        self.stops.iter()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// The `n` stops closest to `point`, closest first.
    pub fn nearest(&self, point: Point, n: usize) -> Vec<NearbyStop<'_>> {
        self.tree
            .nearest_neighbor_iter(&[point.x(), point.y()])
            .take(n)
            .map(|node| {
                let stop = &self.stops[node.index];
                NearbyStop {
                    stop,
                    distance_m: Haversine.distance(point, stop.location),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: &str, lon: f64, lat: f64) -> Stop {
        Stop {
            id: StopId::new(id),
            name: format!("Parada {id}").into(),
            location: Point::new(lon, lat),
        }
    }

    fn table() -> StopTable {
        StopTable::new(vec![
            stop("P1", -89.6200, 20.9700),
            stop("P2", -89.6100, 20.9800),
            stop("P3", -89.5000, 21.0500),
        ])
    }

    #[test]
    fn test_lookup_by_id() {
        let table = table();
        assert_eq!(table.len(), 3);
        assert!(table.contains("P2"));
        assert!(!table.contains("P99"));
        assert_eq!(table.get("P3").unwrap().location, Point::new(-89.5, 21.05));
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let table = StopTable::new(vec![stop("P1", 0.0, 0.0), stop("P1", 1.0, 1.0)]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("P1").unwrap().location, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_nearest_orders_by_distance() {
        let table = table();
        let nearby = table.nearest(Point::new(-89.6190, 20.9710), 2);

        assert_eq!(nearby.len(), 2);
        assert_eq!(nearby[0].stop.id, StopId::new("P1"));
        assert_eq!(nearby[1].stop.id, StopId::new("P2"));
        assert!(nearby[0].distance_m < nearby[1].distance_m);
        // Roughly 150 m between the query point and P1.
        assert!(nearby[0].distance_m > 50.0 && nearby[0].distance_m < 300.0);
    }

    #[test]
    fn test_nearest_on_empty_table() {
        let table = StopTable::new(Vec::new());
        assert!(table.is_empty());
        assert!(table.nearest(Point::new(0.0, 0.0), 5).is_empty());
    }
}
