//! Fan-out of route status changes to subscribed connections.
//!
//! Delivery is best effort: every send runs in its own task with a timeout,
//! and a connection whose send fails or times out is dropped from the set.
//! Nothing is retried and no error reaches the publisher.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::models::RouteId;

pub type ConnectionId = u64;

/// A live subscriber that can be sent updates.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn send(&self, update: &RouteUpdate) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    RouteUpdate,
}

/// The message delivered to every subscriber.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteUpdate {
    #[serde(rename = "type")]
    pub kind: UpdateKind,
    pub route_id: RouteId,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// An inbound status report from a publisher.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusReport {
    pub route_id: String,
    pub status: String,
}

/// Outcome of one [`Broadcaster::publish`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub dropped: usize,
}

pub struct Broadcaster {
    next_id: AtomicU64,
    connections: RwLock<HashMap<ConnectionId, Arc<dyn Connection>>>,
    statuses: RwLock<HashMap<RouteId, String>>,
    send_timeout: Duration,
}

impl Broadcaster {
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            connections: RwLock::new(HashMap::new()),
            statuses: RwLock::new(HashMap::new()),
            send_timeout,
        }
    }

    pub async fn subscribe(&self, connection: Arc<dyn Connection>) -> ConnectionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut connections = self.connections.write().await;
        connections.insert(id, connection);
        info!(
            connection = id,
            active = connections.len(),
            "Subscriber connected"
        );
        id
    }

    /// Returns `false` if the connection was already gone.
    pub async fn unsubscribe(&self, id: ConnectionId) -> bool {
        let mut connections = self.connections.write().await;
        let removed = connections.remove(&id).is_some();
        if removed {
            info!(
                connection = id,
                active = connections.len(),
                "Subscriber disconnected"
            );
        }
        removed
    }

    /// Records the status and sends a [`RouteUpdate`] to every subscriber.
    pub async fn publish(&self, route_id: RouteId, status: String) -> PublishReport {
        self.statuses
            .write()
            .await
            .insert(route_id.clone(), status.clone());

        let update = Arc::new(RouteUpdate {
            kind: UpdateKind::RouteUpdate,
            route_id,
            status,
            timestamp: Utc::now(),
        });

        // Snapshot so no lock is held while sending.
        let targets: Vec<(ConnectionId, Arc<dyn Connection>)> = self
            .connections
            .read()
            .await
            .iter()
            .map(|(id, conn)| (*id, conn.clone()))
            .collect();

        let mut sends = JoinSet::new();
        for (id, connection) in targets {
            let update = update.clone();
            let timeout = self.send_timeout;
            sends.spawn(async move {
                let sent = tokio::time::timeout(timeout, connection.send(&update));
                let outcome = match sent.await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(_) => Err(format!("send timed out after {timeout:?}")),
                };
                (id, outcome)
            });
        }

        let mut report = PublishReport::default();
        let mut failed = Vec::new();
        while let Some(joined) = sends.join_next().await {
            match joined {
                Ok((_, Ok(()))) => report.delivered += 1,
                Ok((id, Err(reason))) => {
                    debug!(connection = id, reason = %reason, "Delivery failed");
                    failed.push(id);
                }
                Err(e) => warn!(error = %e, "Delivery task aborted"),
            }
        }

        if !failed.is_empty() {
            let mut connections = self.connections.write().await;
            for id in &failed {
                if connections.remove(id).is_some() {
                    report.dropped += 1;
                }
            }
            info!(
                dropped = report.dropped,
                active = connections.len(),
                "Dropped dead subscribers"
            );
        }

        debug!(
            route_id = %update.route_id,
            delivered = report.delivered,
            dropped = report.dropped,
            "Route update published"
        );
        report
    }

    /// Last known status per route.
    pub async fn statuses(&self) -> BTreeMap<RouteId, String> {
        self.statuses
            .read()
            .await
            .iter()
            .map(|(id, status)| (id.clone(), status.clone()))
            .collect()
    }
}
