//! HTTP API tests against a fixture upstream.

use std::sync::Arc;

use layer_catalog::{CatalogBuilder, SourceConfig};
use schema_browser::server::create_router;
use schema_browser::AppState;
use serde_json::Value;
use test_utils::fixtures::{self, paths};
use test_utils::{FixtureResponse, FixtureServer};

struct Harness {
    upstream: FixtureServer,
    state: Arc<AppState>,
    base_url: String,
}

async fn start(refresh: bool) -> Harness {
    let upstream = FixtureServer::start().await;
    fixtures::mount_defaults(&upstream);

    let builder = CatalogBuilder::from_config(SourceConfig::for_base_url(&upstream.base_url())).unwrap();
    let state = Arc::new(AppState::new(builder));
    if refresh {
        state.refresh().await.unwrap();
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let app = create_router(state.clone(), None);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Harness {
        upstream,
        state,
        base_url,
    }
}

async fn get(harness: &Harness, path: &str) -> (u16, Value) {
    let response = reqwest::get(format!("{}{}", harness.base_url, path)).await.unwrap();
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

// ============================================================================
// Before the first build
// ============================================================================

#[tokio::test]
async fn test_loading_answers_503() {
    let harness = start(false).await;

    let (status, body) = get(&harness, "/api/maps").await;
    assert_eq!(status, 503);
    assert_eq!(body["error"], "Catalog is loading");

    let (status, body) = get(&harness, "/api/status").await;
    assert_eq!(status, 200);
    assert_eq!(body["build"]["state"], "idle");
    assert!(body["summary"].is_null());
}

#[tokio::test]
async fn test_failed_build_message_is_served() {
    let harness = start(false).await;
    harness.upstream.set(paths::CAPABILITIES, FixtureResponse::status(500));
    assert!(harness.state.refresh().await.is_err());

    let (status, body) = get(&harness, "/api/search?q=water").await;
    assert_eq!(status, 503);
    assert_eq!(body["error"], "Failed to load capabilities (HTTP 500)");

    let (_, body) = get(&harness, "/api/status").await;
    assert_eq!(body["build"]["state"], "failed");
    assert_eq!(body["build"]["retryable"], true);
}

// ============================================================================
// Catalog endpoints
// ============================================================================

#[tokio::test]
async fn test_health() {
    let harness = start(false).await;
    let response = reqwest::get(format!("{}/health", harness.base_url)).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_status_summary() {
    let harness = start(true).await;
    let (status, body) = get(&harness, "/api/status").await;

    assert_eq!(status, 200);
    assert_eq!(body["environment"], "staging");
    assert_eq!(body["build"]["state"], "ready");
    assert_eq!(body["build"]["version"], 1);
    assert_eq!(body["summary"]["maps"], 2);
    assert_eq!(body["summary"]["layers"], 6);
    assert_eq!(body["summary"]["mapsWithDetail"], 1);
    assert!(body["links"]["mapStyle"]
        .as_str()
        .unwrap()
        .ends_with("/map-styles/historical/historical.json"));
    assert_eq!(body["links"]["openHistoricalMap"], "https://staging.openhistoricalmap.org");
    assert_eq!(body["links"]["vectorTiles"], "https://vtiles.staging.openhistoricalmap.org");
}

#[tokio::test]
async fn test_maps() {
    let harness = start(true).await;
    let (status, body) = get(&harness, "/api/maps").await;

    assert_eq!(status, 200);
    assert_eq!(body[0]["name"], "ohm");
    assert_eq!(body[0]["layerCount"], 4);
    assert_eq!(body[0]["detail"]["status"], "available");
    assert_eq!(body[1]["name"], "ohm_admin");
    assert_eq!(body[1]["detail"]["status"], "unavailable");
    assert_eq!(body[1]["detail"]["reason"]["kind"], "status");
    assert_eq!(body[1]["detail"]["reason"]["message"], 500);
}

#[tokio::test]
async fn test_map_layers() {
    let harness = start(true).await;

    let (status, body) = get(&harness, "/api/maps/ohm_admin/layers").await;
    assert_eq!(status, 200);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["admin_areas", "water_areas"]);
    assert_eq!(body[0]["geometryType"], "multipolygon");

    let (status, _) = get(&harness, "/api/maps/nowhere/layers").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_layer() {
    let harness = start(true).await;

    let (status, body) = get(&harness, "/api/layers/ohm/transport_lines").await;
    assert_eq!(status, 200);
    assert_eq!(body["geometryType"], "linestring");
    assert_eq!(body["description"], "Roads, railways and ferry routes");
    assert_eq!(body["plainFields"], serde_json::json!(["highway", "name"]));
    assert_eq!(body["localeFields"], serde_json::json!(["name_de", "name_fr"]));

    let (_, body) = get(&harness, "/api/layers/ohm/water_areas").await;
    assert_eq!(body["filterMinAreas"], serde_json::json!(["1,500,000", "-"]));
    assert!(body["tegolaConfigUrl"]
        .as_str()
        .unwrap()
        .ends_with("/images/tiler-server/config/providers/water_areas.toml"));

    let (status, _) = get(&harness, "/api/layers/ohm_admin/land").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_info() {
    let harness = start(true).await;

    let (status, body) = get(&harness, "/api/info/water_areas").await;
    assert_eq!(status, 200);
    assert_eq!(body["description"], "Oceans, lakes and reservoirs");

    let (status, _) = get(&harness, "/api/info/admin_areas").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_search() {
    let harness = start(true).await;

    let (status, body) = get(&harness, "/api/search?q=WATER").await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = get(&harness, "/api/search").await;
    assert_eq!(body.as_array().unwrap().len(), 6);
}

// ============================================================================
// Rebuild
// ============================================================================

#[tokio::test]
async fn test_rebuild_is_accepted() {
    let harness = start(true).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/rebuild", harness.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 202);

    for _ in 0..50 {
        if harness.upstream.hits(paths::CAPABILITIES) >= 2 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(harness.upstream.hits(paths::CAPABILITIES), 2);
}
