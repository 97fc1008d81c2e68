//! Canned upstream documents.
//!
//! The documents describe a small two-map tile server:
//!
//! - `ohm`: `water_areas`, `transport_lines`, `place_centroids`, `land`
//! - `ohm_admin`: `admin_areas`, `water_areas`
//!
//! Only `ohm` publishes a detail document. In it `land` is declared as a
//! line layer (contradicting name inference) and `place_centroids` has an
//! empty geometry type.

use serde_json::{json, Value};

use crate::{FixtureResponse, FixtureServer};

/// Paths served by [`mount_defaults`].
pub mod paths {
    pub const CAPABILITIES: &str = "/capabilities";
    pub const OHM_DETAIL: &str = "/capabilities/ohm.json";
    pub const OHM_ADMIN_DETAIL: &str = "/capabilities/ohm_admin.json";
    pub const LAYERS_INFO: &str = "/vtiles_layers_info.json";
    pub const LANGUAGES: &str = "/vtiles_languages.geojson";
}

fn tile_url(base_url: &str, map: &str, layer: &str) -> String {
    format!("{}/maps/{}/{}/{{z}}/{{x}}/{{y}}.pbf", base_url, map, layer)
}

/// Root capabilities document with tile URLs under `base_url`.
pub fn root_capabilities(base_url: &str) -> Value {
    json!({
        "version": "v0.20.0",
        "maps": [
            {
                "name": "ohm",
                "attribution": "OpenHistoricalMap contributors",
                "minzoom": 0,
                "maxzoom": 16,
                "layers": [
                    {"name": "water_areas", "minzoom": 0, "maxzoom": 16,
                     "tiles": [tile_url(base_url, "ohm", "water_areas")]},
                    {"name": "transport_lines", "minzoom": 5, "maxzoom": 16,
                     "tiles": [tile_url(base_url, "ohm", "transport_lines")]},
                    {"name": "place_centroids", "minzoom": 3, "maxzoom": 16,
                     "tiles": [tile_url(base_url, "ohm", "place_centroids")]},
                    {"name": "land",
                     "tiles": [tile_url(base_url, "ohm", "land")]}
                ]
            },
            {
                "name": "ohm_admin",
                "layers": [
                    {"name": "admin_areas", "tiles": [tile_url(base_url, "ohm_admin", "admin_areas")]},
                    {"name": "water_areas", "minzoom": 2, "maxzoom": 10,
                     "tiles": [tile_url(base_url, "ohm_admin", "water_areas")]}
                ]
            }
        ]
    })
}

/// Root capabilities with a single map holding one layer.
pub fn single_map_capabilities(map: &str, layer: &str) -> Value {
    json!({"maps": [{"name": map, "layers": [{"name": layer}]}]})
}

/// Detail document for the `ohm` map.
pub fn ohm_detail() -> Value {
    json!({
        "vector_layers": [
            {
                "id": "transport_lines",
                "geometry_type": "line",
                "fields": {"name": "String", "highway": "String", "name_de": "String", "name_fr": "String"}
            },
            {
                "id": "water_areas",
                "geometryType": "polygon",
                "fields": {"type": "String", "area": "Number"}
            },
            {
                "id": "place_centroids",
                "geometry_type": "",
                "fields": {"population": "Number"}
            },
            {
                "id": "land",
                "geometry_type": "line"
            }
        ]
    })
}

/// Layer-info document. `water_areas` lists two entries; the first is the
/// one that applies.
pub fn layers_info() -> Value {
    json!({
        "by_layer_name": {
            "water_areas": [
                {
                    "description": "Oceans, lakes and reservoirs",
                    "details": ["Tags documented at https://wiki.openstreetmap.org/wiki/Key:water"],
                    "filters_per_zoom_level": [
                        {"zoom_level": "0-5", "filter": "area > 1000000", "tolerance": 500, "min_area": 1500000, "view_name": "water_areas_z0_5"},
                        {"zoom_level": 6, "filter": null, "tolerance": 100, "min_area": "", "view_name": "water_areas_z6"}
                    ],
                    "tegola_config": "config/providers/water_areas.toml"
                },
                {
                    "description": "Second entry, never used"
                }
            ],
            "transport_lines": [
                {
                    "description": "Roads, railways and ferry routes",
                    "details": []
                }
            ],
            "admin_areas": []
        }
    })
}

/// Languages GeoJSON document.
pub fn languages() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"key_name": "name:de", "alias": "German", "count": 120},
             "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}},
            {"type": "Feature", "properties": {"key_name": "name:es", "alias": "Spanish", "count": 340, "is_new": true},
             "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}},
            {"type": "Feature", "properties": {"key_name": "name:fr", "alias": "French", "count": 120},
             "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}}
        ]
    })
}

/// Serve the default documents. The `ohm_admin` detail document answers 500.
pub fn mount_defaults(server: &FixtureServer) {
    server.set(paths::CAPABILITIES, root_capabilities(&server.base_url()));
    server.set(paths::OHM_DETAIL, ohm_detail());
    server.set(paths::OHM_ADMIN_DETAIL, FixtureResponse::status(500));
    server.set(paths::LAYERS_INFO, layers_info());
    server.set(paths::LANGUAGES, languages());
}
