//! Alternative routes between two stops.

use geo::{Distance, Haversine};
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::models::{AlternativeRoute, StopId};
use crate::services::RoutePlanner;
use crate::store::StopTable;

/// Validates both stops, resolves their coordinates and asks `planner` for
/// candidates. Every result echoes the requested ids verbatim.
///
/// The origin is checked before the destination, so when both are unknown
/// the error names the origin.
#[tracing::instrument(skip(stops, planner))]
pub async fn find_alternatives(
    stops: &StopTable,
    planner: &dyn RoutePlanner,
    origin_id: &str,
    destination_id: &str,
) -> Result<Vec<AlternativeRoute>, ServiceError> {
    let origin = stops.get(origin_id).ok_or_else(|| {
        warn!("Origin stop not found");
        ServiceError::stop_not_found(origin_id)
    })?;
    let destination = stops.get(destination_id).ok_or_else(|| {
        warn!("Destination stop not found");
        ServiceError::stop_not_found(destination_id)
    })?;

    let distance_m = Haversine.distance(origin.location, destination.location);
    debug!(distance_m, "Resolved stop coordinates");

    let planned = planner.plan(origin, destination).await?;
    info!(alternatives = planned.len(), "Alternatives computed");

    Ok(planned
        .into_iter()
        .map(|alt| AlternativeRoute {
            origen: StopId::new(origin_id),
            destino: StopId::new(destination_id),
            ruta_principal: alt.primary_route,
            ruta_alterna: alt.alternate_route,
            tiempo_estimado: alt.estimated_minutes,
            transbordos: alt.transfer_points,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RouteId, Stop};
    use crate::services::{PlaceholderPlanner, PlannedAlternative};
    use async_trait::async_trait;
    use geo::Point;

    fn stops() -> StopTable {
        StopTable::new(vec![
            Stop {
                id: StopId::new("P1"),
                name: "Centro".into(),
                location: Point::new(-89.62, 20.97),
            },
            Stop {
                id: StopId::new("P7"),
                name: "Norte".into(),
                location: Point::new(-89.60, 21.02),
            },
        ])
    }

    #[tokio::test]
    async fn test_placeholder_echoes_ids() {
        let alternatives = find_alternatives(&stops(), &PlaceholderPlanner, "P1", "P7")
            .await
            .unwrap();

        assert_eq!(alternatives.len(), 1);
        let alt = &alternatives[0];
        assert_eq!(alt.origen, StopId::new("P1"));
        assert_eq!(alt.destino, StopId::new("P7"));
        assert_eq!(alt.ruta_principal, RouteId::new("R1"));
        assert_eq!(alt.ruta_alterna, RouteId::new("R2"));
        assert_eq!(alt.tiempo_estimado, 30);
        assert_eq!(alt.transbordos, vec![StopId::new("P1"), StopId::new("P2")]);
    }

    #[tokio::test]
    async fn test_unknown_destination_is_named() {
        let err = find_alternatives(&stops(), &PlaceholderPlanner, "P1", "P99")
            .await
            .unwrap_err();

        match err {
            ServiceError::NotFound { id, .. } => assert_eq!(id, "P99"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_origin_is_named_even_with_valid_destination() {
        let err = find_alternatives(&stops(), &PlaceholderPlanner, "P404", "P7")
            .await
            .unwrap_err();

        match err {
            ServiceError::NotFound { id, .. } => assert_eq!(id, "P404"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    struct FailingPlanner;

    #[async_trait]
    impl RoutePlanner for FailingPlanner {
        async fn plan(&self, _: &Stop, _: &Stop) -> anyhow::Result<Vec<PlannedAlternative>> {
            anyhow::bail!("router offline")
        }
    }

    #[tokio::test]
    async fn test_planner_failure_is_unexpected() {
        let err = find_alternatives(&stops(), &FailingPlanner, "P1", "P7")
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Unexpected(_)));
        assert_eq!(err.status(), 500);
    }
}
