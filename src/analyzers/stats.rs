//! Aggregates behind the debug/introspection endpoints.

use serde::Serialize;
use std::collections::HashMap;

use crate::analyzers::utility::mean;
use crate::error::ServiceError;
use crate::models::{BlockId, StopId};
use crate::store::StaticDataStore;

pub const SAMPLE_SIZE: usize = 20;
pub const TOP_BLOCKS: usize = 5;

#[derive(Debug, Serialize)]
pub struct BlockSample {
    pub total_agebs: usize,
    pub sample_agebs: Vec<BlockId>,
}

#[derive(Debug, Serialize)]
pub struct StopSample {
    pub total_stops: usize,
    pub sample_stops: Vec<StopId>,
}

/// Mean occupancy of one block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockOccupancy {
    pub ageb: BlockId,
    pub aforo_promedio: f64,
}

#[derive(Debug, Serialize)]
pub struct SystemStats {
    pub total_agebs: usize,
    pub total_paradas: usize,
    pub total_rutas: usize,
    pub aforo_total: f64,
    pub top_agebs_por_aforo: Vec<BlockOccupancy>,
}

/// Blocks in first-seen order.
pub fn block_sample(store: &StaticDataStore) -> Result<BlockSample, ServiceError> {
    let table = store.ridership()?;
    Ok(BlockSample {
        total_agebs: table.blocks().len(),
        sample_agebs: table.blocks().iter().take(SAMPLE_SIZE).cloned().collect(),
    })
}

/// Stops in load order.
pub fn stop_sample(store: &StaticDataStore) -> Result<StopSample, ServiceError> {
    let table = store.stops()?;
    Ok(StopSample {
        total_stops: table.len(),
        sample_stops: table
            .iter()
            .take(SAMPLE_SIZE)
            .map(|s| s.id.clone())
            .collect(),
    })
}

/// Totals over every table. Missing tables count as zero.
pub fn system_stats(store: &StaticDataStore) -> SystemStats {
    let ridership = store.ridership().ok();

    let aforo_total = ridership
        .map(|t| t.records().iter().filter_map(|r| r.aforo).sum())
        .unwrap_or(0.0);

    let top_agebs_por_aforo = ridership
        .map(|t| top_blocks_by_occupancy(t.blocks(), t.records(), TOP_BLOCKS))
        .unwrap_or_default();

    SystemStats {
        total_agebs: ridership.map_or(0, |t| t.blocks().len()),
        total_paradas: store.stops().map_or(0, |t| t.len()),
        total_rutas: store.routes().len(),
        aforo_total,
        top_agebs_por_aforo,
    }
}

/// Blocks ranked by mean `aforo` over their valid rows, highest first. Ties
/// keep first-seen order.
fn top_blocks_by_occupancy(
    blocks: &[BlockId],
    records: &[crate::models::RidershipRecord],
    n: usize,
) -> Vec<BlockOccupancy> {
    let mut values: HashMap<&BlockId, Vec<f64>> = HashMap::new();
    for record in records {
        if let Some(metrics) = record.metrics() {
            values.entry(&record.block).or_default().push(metrics.aforo);
        }
    }

    let mut ranked: Vec<BlockOccupancy> = blocks
        .iter()
        .filter_map(|block| {
            let v = values.get(block)?;
            Some(BlockOccupancy {
                ageb: block.clone(),
                aforo_promedio: mean(v),
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.aforo_promedio.total_cmp(&a.aforo_promedio));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RidershipRecord, Stop};
    use crate::store::{RidershipTable, RouteTable, StopTable};
    use geo::Point;

    fn row(block: &str, aforo: Option<f64>) -> RidershipRecord {
        RidershipRecord {
            block: BlockId::new(block),
            up_net: Some(0.0),
            down_net: Some(0.0),
            flujo: Some(0.0),
            aforo,
            hora: None,
        }
    }

    fn store() -> StaticDataStore {
        let rows = vec![
            row("A", Some(10.0)),
            row("B", Some(90.0)),
            row("C", Some(30.0)),
            row("A", Some(30.0)),
            row("D", Some(20.0)),
            row("E", Some(20.0)),
            row("F", Some(5.0)),
            row("G", None),
        ];
        let stops = (0..25)
            .map(|i| Stop {
                id: StopId::new(format!("P{i}")),
                name: "x".into(),
                location: Point::new(i as f64, 0.0),
            })
            .collect();

        StaticDataStore::from_tables(
            Some(StopTable::new(stops)),
            RouteTable::default(),
            Some(RidershipTable::new(rows)),
        )
    }

    #[test]
    fn test_system_stats() {
        let stats = system_stats(&store());

        assert_eq!(stats.total_agebs, 7);
        assert_eq!(stats.total_paradas, 25);
        assert_eq!(stats.total_rutas, 0);
        assert_eq!(stats.aforo_total, 205.0);

        let top: Vec<&str> = stats
            .top_agebs_por_aforo
            .iter()
            .map(|b| b.ageb.as_str())
            .collect();
        // A averages 20 and ties with D and E; first seen wins.
        assert_eq!(top, vec!["B", "C", "A", "D", "E"]);
    }

    #[test]
    fn test_samples_are_capped() {
        let store = store();
        let stops = stop_sample(&store).unwrap();
        assert_eq!(stops.total_stops, 25);
        assert_eq!(stops.sample_stops.len(), SAMPLE_SIZE);
        assert_eq!(stops.sample_stops[0], StopId::new("P0"));

        let blocks = block_sample(&store).unwrap();
        assert_eq!(blocks.total_agebs, 7);
        assert_eq!(blocks.sample_agebs[0], BlockId::new("A"));
    }

    #[test]
    fn test_ranking_ignores_rows_with_unreadable_metrics() {
        let mut partial = row("A", Some(1000.0));
        partial.up_net = None;
        let blocks = [BlockId::new("A"), BlockId::new("B")];
        let records = [row("A", Some(10.0)), partial, row("B", Some(20.0))];

        let top = top_blocks_by_occupancy(&blocks, &records, TOP_BLOCKS);
        assert_eq!(top[0].ageb, BlockId::new("B"));
        assert_eq!(top[1].aforo_promedio, 10.0);
    }

    #[test]
    fn test_empty_store_counts_zero() {
        let store = StaticDataStore::from_tables(None, RouteTable::default(), None);
        let stats = system_stats(&store);

        assert_eq!(stats.total_agebs, 0);
        assert_eq!(stats.aforo_total, 0.0);
        assert!(stats.top_agebs_por_aforo.is_empty());
        let err = block_sample(&store).err();
        assert!(matches!(err, Some(ServiceError::DataUnavailable(_))));
        assert!(stop_sample(&store).is_err());
    }
}
