//! HTTP handlers.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use geo::Point;
use geojson::{Feature, FeatureCollection};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::info;

use crate::analyzers::stats::{self, BlockSample, StopSample, SystemStats};
use crate::analyzers::{analyze_coverage, find_alternatives};
use crate::error::ServiceError;
use crate::models::{AlternativeRoute, CoverageAnalysis, RouteId};
use crate::output::{nearby_collection, route_feature, routes_collection, stops_collection};
use crate::server::AppContext;
use crate::server::response::{ApiResponse, ApiResult};

pub const ROOT_MESSAGE: &str = "API de Transporte Mérida - Sistema Va y Ven";
pub const DEFAULT_NEARBY: usize = 5;
pub const MAX_NEARBY: usize = 50;

const OUT_OF_RANGE: &str = "lon must be within [-180, 180] and lat within [-90, 90]";

pub async fn root() -> Json<Value> {
    Json(json!({ "message": ROOT_MESSAGE }))
}

pub async fn not_found() -> impl IntoResponse {
    let body = ApiResponse::<()>::error("Not found");
    (StatusCode::NOT_FOUND, body)
}

pub async fn list_routes(State(ctx): State<AppContext>) -> ApiResponse<FeatureCollection> {
    ApiResponse::success(routes_collection(ctx.store.routes().iter()))
}

pub async fn get_route(
    State(ctx): State<AppContext>,
    Path(route_id): Path<String>,
) -> ApiResult<Feature> {
    ctx.store
        .routes()
        .get(&route_id)
        .map(|route| ApiResponse::success(route_feature(route)))
        .ok_or_else(|| ServiceError::route_not_found(route_id))
}

#[derive(Debug, Serialize)]
pub struct RouteStatuses {
    pub routes: BTreeMap<RouteId, String>,
}

pub async fn route_statuses(State(ctx): State<AppContext>) -> ApiResponse<RouteStatuses> {
    ApiResponse::success(RouteStatuses {
        routes: ctx.broadcaster.statuses().await,
    })
}

pub async fn list_stops(State(ctx): State<AppContext>) -> ApiResult<FeatureCollection> {
    let stops = ctx.store.stops()?;
    Ok(ApiResponse::success(stops_collection(stops.iter())))
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    lon: Option<f64>,
    lat: Option<f64>,
    limite: Option<usize>,
}

pub async fn nearby_stops(
    State(ctx): State<AppContext>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> ApiResult<FeatureCollection> {
    let Query(query) = query.map_err(|e| ServiceError::validation(e.body_text()))?;

    let (Some(lon), Some(lat)) = (query.lon, query.lat) else {
        return Err(ServiceError::validation("Both lon and lat parameters are required"));
    };
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(ServiceError::validation(OUT_OF_RANGE));
    }
    let limit = query.limite.unwrap_or(DEFAULT_NEARBY).clamp(1, MAX_NEARBY);

    let stops = ctx.store.stops()?;
    let nearby = stops.nearest(Point::new(lon, lat), limit);
    Ok(ApiResponse::success(nearby_collection(&nearby)))
}

#[derive(Debug, Deserialize)]
pub struct AlternativesQuery {
    origen: Option<String>,
    destino: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AlternativesData {
    pub alternatives: Vec<AlternativeRoute>,
}

pub async fn alternatives(
    State(ctx): State<AppContext>,
    query: Result<Query<AlternativesQuery>, QueryRejection>,
) -> ApiResult<AlternativesData> {
    let Query(query) = query.map_err(|e| ServiceError::validation(e.body_text()))?;

    let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    let (Some(origen), Some(destino)) = (present(query.origen), present(query.destino)) else {
        return Err(ServiceError::validation("Both origen and destino parameters are required"));
    };

    let stops = ctx.store.stops()?;
    let planner = ctx.planner.as_ref();
    let alternatives = find_alternatives(stops, planner, &origen, &destino).await?;
    Ok(ApiResponse::success(AlternativesData { alternatives }))
}

#[derive(Debug, Serialize)]
pub struct CoverageData {
    pub analysis: CoverageAnalysis,
}

pub async fn coverage(
    State(ctx): State<AppContext>,
    Path(ageb): Path<String>,
) -> ApiResult<CoverageData> {
    let ageb = ageb.trim();
    if ageb.is_empty() {
        return missing_block().await;
    }

    let table = ctx.store.ridership()?;
    let analysis = analyze_coverage(table, ageb)?;
    info!(ageb, "Coverage analysis served");
    Ok(ApiResponse::success(CoverageData { analysis }))
}

pub async fn missing_block() -> ApiResult<CoverageData> {
    Err(ServiceError::validation("AGEB parameter is required"))
}

pub async fn debug_blocks(State(ctx): State<AppContext>) -> ApiResult<BlockSample> {
    Ok(ApiResponse::success(stats::block_sample(&ctx.store)?))
}

pub async fn debug_stops(State(ctx): State<AppContext>) -> ApiResult<StopSample> {
    Ok(ApiResponse::success(stats::stop_sample(&ctx.store)?))
}

pub async fn debug_stats(State(ctx): State<AppContext>) -> ApiResponse<SystemStats> {
    ApiResponse::success(stats::system_stats(&ctx.store))
}
