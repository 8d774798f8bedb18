//! Trait and types for computing candidate paths between two stops.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{RouteId, Stop, StopId};

/// One candidate returned by a [`RoutePlanner`], before it is tied to the
/// requested origin and destination ids.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedAlternative {
    pub primary_route: RouteId,
    pub alternate_route: RouteId,
    pub estimated_minutes: u32,
    pub transfer_points: Vec<StopId>,
}

/// Abstraction over a path finder through the transit network.
#[async_trait]
pub trait RoutePlanner: Send + Sync {
    /// Returns candidate alternatives between two resolved stops.
    async fn plan(&self, origin: &Stop, destination: &Stop) -> Result<Vec<PlannedAlternative>>;
}

/// Returns one fixed alternative for any pair of stops.
///
/// No network search is performed; this keeps the response shape stable for
/// clients until a real router is plugged in.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderPlanner;

#[async_trait]
impl RoutePlanner for PlaceholderPlanner {
    async fn plan(&self, _from: &Stop, _to: &Stop) -> Result<Vec<PlannedAlternative>> {
        Ok(vec![PlannedAlternative {
            primary_route: RouteId::new("R1"),
            alternate_route: RouteId::new("R2"),
            estimated_minutes: 30,
            transfer_points: vec![StopId::new("P1"), StopId::new("P2")],
        }])
    }
}
