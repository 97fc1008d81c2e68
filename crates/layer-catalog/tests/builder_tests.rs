//! End-to-end catalog builds against the fixture server.

use std::collections::HashSet;
use std::time::Duration;

use layer_catalog::{
    filter_locales, load_locales, CatalogBuilder, CatalogError, DetailStatus, SourceConfig,
    UnavailableReason,
};
use test_utils::fixtures::{self, paths};
use test_utils::{FixtureResponse, FixtureServer};
use vtiles_common::{GeometryType, SourceKind};

async fn server_with_defaults() -> FixtureServer {
    let server = FixtureServer::start().await;
    fixtures::mount_defaults(&server);
    server
}

fn builder(server: &FixtureServer) -> CatalogBuilder {
    CatalogBuilder::from_config(SourceConfig::for_base_url(&server.base_url())).unwrap()
}

// ============================================================================
// Assembly
// ============================================================================

#[tokio::test]
async fn test_layers_in_declared_order() {
    let server = server_with_defaults().await;
    let catalog = builder(&server).build().await.unwrap();

    let keys: Vec<(&str, &str)> = catalog.layers.iter().map(|l| l.key()).collect();
    assert_eq!(
        keys,
        vec![
            ("ohm", "water_areas"),
            ("ohm", "transport_lines"),
            ("ohm", "place_centroids"),
            ("ohm", "land"),
            ("ohm_admin", "admin_areas"),
            ("ohm_admin", "water_areas"),
        ]
    );
    assert_eq!(catalog.maps.len(), 2);
}

#[tokio::test]
async fn test_map_layer_pairs_are_unique() {
    let server = server_with_defaults().await;
    let catalog = builder(&server).build().await.unwrap();

    let unique: HashSet<(&str, &str)> = catalog.layers.iter().map(|l| l.key()).collect();
    assert_eq!(unique.len(), catalog.layers.len());
}

#[tokio::test]
async fn test_zooms_and_tiles_copied_from_capabilities() {
    let server = server_with_defaults().await;
    let catalog = builder(&server).build().await.unwrap();

    let land = catalog.layer("ohm", "land").unwrap();
    assert_eq!((land.minzoom, land.maxzoom), (0, 20));
    assert_eq!(
        land.first_tile(),
        Some(format!("{}/maps/ohm/land/{{z}}/{{x}}/{{y}}.pbf", server.base_url()).as_str())
    );

    let admin_water = catalog.layer("ohm_admin", "water_areas").unwrap();
    assert_eq!((admin_water.minzoom, admin_water.maxzoom), (2, 10));
}

#[tokio::test]
async fn test_null_zooms_use_defaults() {
    let server = server_with_defaults().await;
    server.set(
        paths::CAPABILITIES,
        FixtureResponse::from(serde_json::json!({"maps": [{
            "name": "ohm",
            "minzoom": null,
            "maxzoom": null,
            "layers": [
                {"name": "land", "minzoom": null, "maxzoom": 12.0},
                {"name": "water_areas", "minzoom": 3}
            ]
        }]})),
    );

    let catalog = builder(&server).build().await.unwrap();
    let map = catalog.map("ohm").unwrap();
    assert_eq!((map.minzoom, map.maxzoom), (0, 20));

    let land = catalog.layer("ohm", "land").unwrap();
    assert_eq!((land.minzoom, land.maxzoom), (0, 12));
    let water = catalog.layer("ohm", "water_areas").unwrap();
    assert_eq!((water.minzoom, water.maxzoom), (3, 20));
}

// ============================================================================
// Geometry and fields
// ============================================================================

#[tokio::test]
async fn test_detail_geometry_wins_over_inference() {
    let server = server_with_defaults().await;
    let catalog = builder(&server).build().await.unwrap();

    // name inference would say multipolygon
    let land = catalog.layer("ohm", "land").unwrap();
    assert_eq!(land.geometry_type, GeometryType::LineString);
    assert!(land.fields.is_empty());

    let roads = catalog.layer("ohm", "transport_lines").unwrap();
    assert_eq!(roads.geometry_type, GeometryType::LineString);
    assert_eq!(roads.fields.get("highway").map(String::as_str), Some("String"));

    let water = catalog.layer("ohm", "water_areas").unwrap();
    assert_eq!(water.geometry_type, GeometryType::Polygon);
}

#[tokio::test]
async fn test_blank_detail_geometry_keeps_fields() {
    let server = server_with_defaults().await;
    let catalog = builder(&server).build().await.unwrap();

    let places = catalog.layer("ohm", "place_centroids").unwrap();
    assert_eq!(places.geometry_type, GeometryType::Point);
    assert_eq!(places.fields.get("population").map(String::as_str), Some("Number"));
}

#[tokio::test]
async fn test_failed_detail_falls_back_to_name_inference() {
    let server = server_with_defaults().await;
    let catalog = builder(&server).build().await.unwrap();

    for layer in catalog.layers_for_map("ohm_admin") {
        assert_eq!(layer.geometry_type, GeometryType::MultiPolygon, "{}", layer.name);
        assert!(layer.fields.is_empty());
    }
    assert_eq!(
        catalog.detail_status("ohm_admin"),
        Some(&DetailStatus::Unavailable {
            reason: UnavailableReason::Status(500)
        })
    );
    assert_eq!(
        catalog.detail_status("ohm"),
        Some(&DetailStatus::Available { layers: 4 })
    );
}

#[tokio::test]
async fn test_detail_timeout_is_isolated() {
    let server = server_with_defaults().await;
    server.set(
        paths::OHM_DETAIL,
        FixtureResponse::from(fixtures::ohm_detail()).with_delay(Duration::from_secs(3)),
    );

    let mut config = SourceConfig::for_base_url(&server.base_url());
    config.request_timeout = Duration::from_millis(300);
    let catalog = CatalogBuilder::from_config(config).unwrap().build().await.unwrap();

    assert!(matches!(
        catalog.detail_status("ohm"),
        Some(DetailStatus::Unavailable {
            reason: UnavailableReason::Transport(_)
        })
    ));
    assert_eq!(catalog.layer("ohm", "land").unwrap().geometry_type, GeometryType::MultiPolygon);
    assert_eq!(catalog.layer("ohm", "place_centroids").unwrap().geometry_type, GeometryType::Point);
    assert_eq!(catalog.layer("ohm", "transport_lines").unwrap().geometry_type, GeometryType::LineString);
}

#[tokio::test]
async fn test_malformed_detail_is_unavailable() {
    let server = server_with_defaults().await;
    server.set(paths::OHM_DETAIL, FixtureResponse::json("<html>not json</html>"));

    let catalog = builder(&server).build().await.unwrap();
    assert!(matches!(
        catalog.detail_status("ohm"),
        Some(DetailStatus::Unavailable {
            reason: UnavailableReason::Malformed(_)
        })
    ));
    assert_eq!(catalog.summary().maps_with_detail, 0);
}

// ============================================================================
// Layer info
// ============================================================================

#[tokio::test]
async fn test_first_info_entry_is_attached() {
    let server = server_with_defaults().await;
    let catalog = builder(&server).build().await.unwrap();

    for map in ["ohm", "ohm_admin"] {
        let water = catalog.layer(map, "water_areas").unwrap();
        assert_eq!(water.description, "Oceans, lakes and reservoirs");
        assert_eq!(water.filters_per_zoom_level.len(), 2);
        assert_eq!(water.tegola_config.as_deref(), Some("config/providers/water_areas.toml"));
    }
    assert_eq!(catalog.info_by_name.len(), 2);
}

#[tokio::test]
async fn test_missing_info_uses_derived_description() {
    let server = server_with_defaults().await;
    let catalog = builder(&server).build().await.unwrap();

    let admin = catalog.layer("ohm_admin", "admin_areas").unwrap();
    assert_eq!(admin.description, "admin areas layer");
    assert!(admin.details.is_empty());
    assert!(admin.filters_per_zoom_level.is_empty());
    assert_eq!(admin.tegola_config, None);
    assert!(catalog.info("admin_areas").is_none());
}

#[tokio::test]
async fn test_malformed_info_name_keeps_the_rest() {
    let server = server_with_defaults().await;
    server.set(
        paths::LAYERS_INFO,
        FixtureResponse::from(serde_json::json!({"by_layer_name": {
            "transport_lines": {},
            "water_areas": [{"description": "Oceans, lakes and reservoirs"}]
        }})),
    );

    let catalog = builder(&server).build().await.unwrap();
    assert_eq!(
        catalog.layer("ohm", "water_areas").unwrap().description,
        "Oceans, lakes and reservoirs"
    );
    assert_eq!(
        catalog.layer("ohm", "transport_lines").unwrap().description,
        "transport lines layer"
    );
    assert!(catalog.info("transport_lines").is_none());
}

// ============================================================================
// Fatal failures
// ============================================================================

#[tokio::test]
async fn test_root_capabilities_failure_aborts_build() {
    let server = server_with_defaults().await;
    server.set(paths::CAPABILITIES, FixtureResponse::status(503));

    let err = builder(&server).build().await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Fetch {
            source_kind: SourceKind::RootCapabilities,
            status: Some(503),
            ..
        }
    ));
    assert_eq!(err.user_message(), "Failed to load capabilities (HTTP 503)");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_layer_info_failure_aborts_build() {
    let server = server_with_defaults().await;
    server.set(paths::LAYERS_INFO, FixtureResponse::json("{\"by_layer_name\": "));

    let err = builder(&server).build().await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Parse {
            source_kind: SourceKind::LayerInfo,
            ..
        }
    ));
}

#[tokio::test]
async fn test_no_retries_and_no_detail_fetch_after_failure() {
    let server = server_with_defaults().await;
    server.set(paths::CAPABILITIES, FixtureResponse::status(500));

    assert!(builder(&server).build().await.is_err());
    assert_eq!(server.hits(paths::CAPABILITIES), 1);
    assert_eq!(server.hits(paths::LAYERS_INFO), 1);
    assert_eq!(server.hits(paths::OHM_DETAIL), 0);
}

#[tokio::test]
async fn test_each_document_fetched_once_per_build() {
    let server = server_with_defaults().await;
    builder(&server).build().await.unwrap();

    for path in [
        paths::CAPABILITIES,
        paths::LAYERS_INFO,
        paths::OHM_DETAIL,
        paths::OHM_ADMIN_DETAIL,
    ] {
        assert_eq!(server.hits(path), 1, "{}", path);
    }
}

#[tokio::test]
async fn test_zero_maps_is_empty_success() {
    let server = server_with_defaults().await;
    server.set(paths::CAPABILITIES, FixtureResponse::json(r#"{"maps": []}"#));

    let catalog = builder(&server).build().await.unwrap();
    assert!(catalog.is_empty());
    assert!(catalog.maps.is_empty());
    assert_eq!(server.hits(paths::OHM_DETAIL), 0);
}

// ============================================================================
// Locales
// ============================================================================

#[tokio::test]
async fn test_load_locales_sorted() {
    let server = server_with_defaults().await;
    let builder = builder(&server);

    let locales = load_locales(builder.source()).await.unwrap();
    let keys: Vec<&str> = locales.iter().map(|l| l.key_name.as_str()).collect();
    assert_eq!(keys, vec!["name:es", "name:de", "name:fr"]);

    let french = filter_locales(&locales, "french");
    assert_eq!(french.len(), 1);
    assert_eq!(french[0].key_name, "name:fr");
}

#[tokio::test]
async fn test_load_locales_failure() {
    let server = server_with_defaults().await;
    server.set(paths::LANGUAGES, FixtureResponse::status(404));

    let err = load_locales(builder(&server).source()).await.unwrap_err();
    assert_eq!(err.source_kind(), Some(SourceKind::Locales));
}
