//! Per-block ridership aggregation.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::analyzers::utility::{mean, round_to, round_to_i64};
use crate::error::ServiceError;
use crate::models::entities::RowMetrics;
use crate::models::{BlockId, CoverageAnalysis, PeakHour, RidershipRecord};
use crate::store::RidershipTable;

/// Number of hours reported in [`CoverageAnalysis::horas_pico`].
pub const PEAK_HOURS: usize = 3;

/// Aggregates every ridership row recorded for `block`.
///
/// Fails with `NotFound` when the block has no rows at all. Rows whose
/// metrics did not coerce are left out of the sums and means but still make
/// the block exist.
#[tracing::instrument(skip(table))]
pub fn analyze_coverage(
    table: &RidershipTable,
    block: &str,
) -> Result<CoverageAnalysis, ServiceError> {
    if !table.has_block(block) {
        info!("AGEB not found");
        return Err(ServiceError::block_not_found(block));
    }

    let rows: Vec<&RidershipRecord> = table.rows_for(block).collect();
    let analysis = aggregate_block(BlockId::new(block), &rows);

    debug!(
        rows = rows.len(),
        up_net = analysis.up_net,
        down_net = analysis.down_net,
        flujo = analysis.flujo,
        aforo = analysis.aforo,
        "Coverage computed"
    );

    Ok(analysis)
}

/// Sums and means over the valid rows of one block.
pub fn aggregate_block(block: BlockId, rows: &[&RidershipRecord]) -> CoverageAnalysis {
    let valid: Vec<(&RidershipRecord, RowMetrics)> = rows
        .iter()
        .filter_map(|row| row.metrics().map(|m| (*row, m)))
        .collect();

    let excluded = rows.len() - valid.len();
    if excluded > 0 {
        debug!(block = %block, excluded, "Excluded rows with unreadable metrics");
    }

    let sum = |f: fn(&RowMetrics) -> f64| valid.iter().map(|(_, m)| f(m)).sum::<f64>();
    let aforos: Vec<f64> = valid.iter().map(|(_, m)| m.aforo).collect();

    CoverageAnalysis {
        cve_ageb: block,
        up_net: round_to_i64(sum(|m| m.up_net)),
        down_net: round_to_i64(sum(|m| m.down_net)),
        flujo: round_to_i64(sum(|m| m.flujo)),
        aforo: mean(&aforos),
        horas_pico: peak_hours(&valid),
    }
}

/// Top hours by mean occupancy, highest first. Ties keep the hour seen first.
fn peak_hours(rows: &[(&RidershipRecord, RowMetrics)]) -> Vec<PeakHour> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_hour: HashMap<&str, Vec<f64>> = HashMap::new();

    for (row, metrics) in rows {
        let Some(hora) = row.hora.as_deref() else {
            continue;
        };
        let values = by_hour.entry(hora).or_default();
        if values.is_empty() {
            order.push(hora);
        }
        values.push(metrics.aforo);
    }

    let mut hourly: Vec<(&str, f64)> = order
        .into_iter()
        .map(|hora| (hora, mean(&by_hour[hora])))
        .collect();

    // Stable sort keeps first-seen order among equal means.
    hourly.sort_by(|a, b| b.1.total_cmp(&a.1));

    hourly
        .into_iter()
        .take(PEAK_HOURS)
        .map(|(hora, aforo)| PeakHour {
            hora: hora.to_string(),
            aforo: round_to(aforo, 2),
        })
        .collect()
}
