//! HTTP and WebSocket surface.

pub mod response;
pub mod routes;
pub mod ws;

use axum::Router;
use axum::routing::get;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::broadcast::Broadcaster;
use crate::services::{PlaceholderPlanner, RoutePlanner};
use crate::store::StaticDataStore;

/// Everything a handler needs, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<StaticDataStore>,
    pub broadcaster: Arc<Broadcaster>,
    pub planner: Arc<dyn RoutePlanner>,
}

impl AppContext {
    pub fn new(store: StaticDataStore, send_timeout: Duration) -> Self {
        Self {
            store: Arc::new(store),
            broadcaster: Arc::new(Broadcaster::new(send_timeout)),
            planner: Arc::new(PlaceholderPlanner),
        }
    }

    pub fn with_planner(mut self, planner: Arc<dyn RoutePlanner>) -> Self {
        self.planner = planner;
        self
    }
}

pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/api/rutas", get(routes::list_routes))
        .route("/api/rutas/alternativas", get(routes::alternatives))
        .route("/api/rutas/estado", get(routes::route_statuses))
        .route("/api/rutas/{route_id}", get(routes::get_route))
        .route("/api/paradas", get(routes::list_stops))
        .route("/api/paradas/cercanas", get(routes::nearby_stops))
        .route("/api/cobertura", get(routes::missing_block))
        .route("/api/cobertura/", get(routes::missing_block))
        .route("/api/cobertura/{ageb}", get(routes::coverage))
        .route("/api/debug/agebs", get(routes::debug_blocks))
        .route("/api/debug/paradas", get(routes::debug_stops))
        .route("/api/debug/stats", get(routes::debug_stats))
        .route("/ws/va-y-ven", get(ws::websocket))
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Serves until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    ctx: AppContext,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "Listening");

    axum::serve(listener, build_router(ctx))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped");
    Ok(())
}
