//! Read-only HTTP API over the current catalog.
//!
//! Provides endpoints for:
//! - Build status and catalog summary
//! - Maps, a map's layers, one layer record
//! - Layer info by name and layer search
//! - Triggering a rebuild
//!
//! Catalog endpoints answer 503 until a build has been committed.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use layer_catalog::{BuildState, Catalog, CatalogSummary, DetailStatus, Environment, SourceConfig};
use vtiles_common::{LayerRecord, ZoomFilter};

use crate::state::{spawn_refresh, AppState};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub service: &'static str,
    pub environment: Environment,
    pub build: BuildState,
    pub summary: Option<CatalogSummary>,
    pub links: LinksResponse,
}

/// Outbound links for clients rendering the catalog next to a map.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinksResponse {
    pub map_style: String,
    pub open_historical_map: String,
    pub vector_tiles: String,
}

impl From<&SourceConfig> for LinksResponse {
    fn from(config: &SourceConfig) -> Self {
        Self {
            map_style: config.map_style_url.clone(),
            open_historical_map: config.links.open_historical_map.clone(),
            vector_tiles: config.links.vector_tiles.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapResponse {
    pub name: String,
    pub attribution: Option<String>,
    pub minzoom: u8,
    pub maxzoom: u8,
    pub layer_count: usize,
    pub detail: Option<DetailStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerResponse {
    #[serde(flatten)]
    pub layer: LayerRecord,
    pub plain_fields: Vec<String>,
    pub locale_fields: Vec<String>,
    pub filter_min_areas: Vec<String>,
    pub tegola_config_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Error body: `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// No catalog committed yet; carries the build error or "loading".
    Unavailable(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: Arc<AppState>, prometheus: Option<PrometheusHandle>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/api/status", get(status_handler))
        .route("/api/maps", get(maps_handler))
        .route("/api/maps/:map/layers", get(map_layers_handler))
        .route("/api/layers/:map/:layer", get(layer_handler))
        .route("/api/info/:name", get(info_handler))
        .route("/api/search", get(search_handler))
        .route("/api/rebuild", post(rebuild_handler));

    if let Some(handle) = prometheus {
        router = router
            .route("/metrics", get(metrics_handler))
            .layer(Extension(handle));
    }

    router
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

/// Start the HTTP server.
pub async fn run_server(
    state: Arc<AppState>,
    prometheus: Option<PrometheusHandle>,
    addr: SocketAddr,
) -> anyhow::Result<()> {
    let app = create_router(state, prometheus);

    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
async fn health_handler() -> impl IntoResponse {
    "OK"
}

/// GET /metrics - Prometheus exposition
async fn metrics_handler(Extension(handle): Extension<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}

/// GET /api/status - Build state and catalog counts
async fn status_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    let summary = state.session.current().await.map(|c| c.summary());
    Json(StatusResponse {
        service: "schema-browser",
        environment: state.config().environment,
        build: state.session.state().await,
        summary,
        links: LinksResponse::from(state.config()),
    })
}

/// GET /api/maps
async fn maps_handler(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Json<Vec<MapResponse>>> {
    let catalog = current_catalog(&state).await?;

    let maps = catalog
        .maps
        .iter()
        .map(|m| MapResponse {
            name: m.name.clone(),
            attribution: m.attribution.clone(),
            minzoom: m.minzoom,
            maxzoom: m.maxzoom,
            layer_count: m.layers.len(),
            detail: catalog.detail_status(&m.name).cloned(),
        })
        .collect();
    Ok(Json(maps))
}

/// GET /api/maps/:map/layers
async fn map_layers_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(map): Path<String>,
) -> ApiResult<Json<Vec<LayerRecord>>> {
    let catalog = current_catalog(&state).await?;
    if catalog.map(&map).is_none() {
        return Err(ApiError::NotFound(format!("Unknown map '{}'", map)));
    }
    Ok(Json(catalog.layers_for_map(&map).cloned().collect()))
}

/// GET /api/layers/:map/:layer
async fn layer_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((map, layer)): Path<(String, String)>,
) -> ApiResult<Json<LayerResponse>> {
    let catalog = current_catalog(&state).await?;
    let record = catalog
        .layer(&map, &layer)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown layer '{}' in map '{}'", layer, map)))?;

    let (plain, locale) = record.partition_fields();
    Ok(Json(LayerResponse {
        plain_fields: plain.into_iter().map(|(name, _)| name.to_string()).collect(),
        locale_fields: locale.into_iter().map(|(name, _)| name.to_string()).collect(),
        filter_min_areas: record.filters_per_zoom_level.iter().map(min_area_label).collect(),
        tegola_config_url: record
            .tegola_config
            .as_deref()
            .map(|path| state.config().tegola_config_url(path)),
        layer: record.clone(),
    }))
}

/// GET /api/info/:name
async fn info_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let catalog = current_catalog(&state).await?;
    let entry = catalog
        .info(&name)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("No layer info for '{}'", name)))?;
    Ok(Json(entry))
}

/// GET /api/search?q=
async fn search_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<LayerRecord>>> {
    let catalog = current_catalog(&state).await?;
    Ok(Json(catalog.search(&params.q).into_iter().cloned().collect()))
}

/// POST /api/rebuild - Start a rebuild in the background
async fn rebuild_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    spawn_refresh(state);
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "status": "rebuilding" })),
    )
}

// ============================================================================
// Helpers
// ============================================================================

async fn current_catalog(state: &AppState) -> ApiResult<Arc<Catalog>> {
    if let Some(catalog) = state.session.current().await {
        return Ok(catalog);
    }
    match state.session.state().await {
        BuildState::Failed { message, .. } => Err(ApiError::Unavailable(message)),
        _ => Err(ApiError::Unavailable("Catalog is loading".to_string())),
    }
}

fn min_area_label(filter: &ZoomFilter) -> String {
    vtiles_common::format_min_area(filter.min_area.as_ref())
}
