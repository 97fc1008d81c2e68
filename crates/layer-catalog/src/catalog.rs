//! The reconciled catalog and its read-only lookups.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use vtiles_common::{GeometryFamily, LayerInfoEntry, LayerInfoIndex, LayerRecord, MapDescriptor};

use crate::source::UnavailableReason;

/// Whether a map's detail document could be used.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetailStatus {
    /// Document fetched; `layers` is the number of vector layers it listed.
    Available { layers: usize },
    Unavailable { reason: UnavailableReason },
}

impl DetailStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, DetailStatus::Available { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapDetailStatus {
    pub map: String,
    #[serde(flatten)]
    pub status: DetailStatus,
}

/// Counts shown on the overview page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    pub maps: usize,
    pub layers: usize,
    pub layers_by_geometry: BTreeMap<String, usize>,
    pub maps_with_detail: usize,
    pub described_layers: usize,
}

/// One complete build result. Never mutated after assembly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Maps in root-capabilities order, each map's layers in declared order.
    pub layers: Vec<LayerRecord>,
    pub maps: Vec<MapDescriptor>,
    pub info_by_name: LayerInfoIndex,
    pub detail_status: Vec<MapDetailStatus>,
    pub built_at: DateTime<Utc>,

    #[serde(skip)]
    positions: HashMap<String, HashMap<String, usize>>,
}

impl Catalog {
    pub(crate) fn new(
        layers: Vec<LayerRecord>,
        maps: Vec<MapDescriptor>,
        info_by_name: LayerInfoIndex,
        detail_status: Vec<MapDetailStatus>,
    ) -> Self {
        let mut positions: HashMap<String, HashMap<String, usize>> = HashMap::new();
        for (i, layer) in layers.iter().enumerate() {
            positions
                .entry(layer.map.clone())
                .or_default()
                .insert(layer.name.clone(), i);
        }

        Self {
            layers,
            maps,
            info_by_name,
            detail_status,
            built_at: Utc::now(),
            positions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layer(&self, map_name: &str, layer_name: &str) -> Option<&LayerRecord> {
        let i = *self.positions.get(map_name)?.get(layer_name)?;
        self.layers.get(i)
    }

    /// Layer-info entry by layer name, independent of map.
    pub fn info(&self, layer_name: &str) -> Option<&LayerInfoEntry> {
        self.info_by_name.get(layer_name)
    }

    pub fn map(&self, map_name: &str) -> Option<&MapDescriptor> {
        self.maps.iter().find(|m| m.name == map_name)
    }

    /// A map's layers in declared order.
    pub fn layers_for_map<'a>(&'a self, map_name: &'a str) -> impl Iterator<Item = &'a LayerRecord> + 'a {
        self.layers.iter().filter(move |l| l.map == map_name)
    }

    /// First declared layer of a map, selected when none is requested.
    pub fn default_layer(&self, map_name: &str) -> Option<&LayerRecord> {
        self.layers.iter().find(|l| l.map == map_name)
    }

    pub fn detail_status(&self, map_name: &str) -> Option<&DetailStatus> {
        self.detail_status
            .iter()
            .find(|s| s.map == map_name)
            .map(|s| &s.status)
    }

    /// Layers whose name, map or description contain `query`, in catalog
    /// order. An empty query returns every layer.
    pub fn search(&self, query: &str) -> Vec<&LayerRecord> {
        self.layers.iter().filter(|l| l.matches(query)).collect()
    }

    pub fn summary(&self) -> CatalogSummary {
        let mut layers_by_geometry = BTreeMap::new();
        for layer in &self.layers {
            let family = layer.geometry_type.family();
            let key = match family {
                GeometryFamily::Other if layer.geometry_type.is_unknown() => "unknown",
                _ => family.as_str(),
            };
            *layers_by_geometry.entry(key.to_string()).or_insert(0) += 1;
        }

        CatalogSummary {
            maps: self.maps.len(),
            layers: self.layers.len(),
            layers_by_geometry,
            maps_with_detail: self.detail_status.iter().filter(|s| s.status.is_available()).count(),
            described_layers: self
                .layers
                .iter()
                .filter(|l| self.info_by_name.contains(&l.name))
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::assemble;
    use crate::source::DetailOutcome;
    use vtiles_common::{LayerSummary, RootCapabilities};

    fn catalog() -> Catalog {
        let root = RootCapabilities {
            maps: vec![
                MapDescriptor::new("ohm")
                    .with_layer(LayerSummary::new("place_points"))
                    .with_layer(LayerSummary::new("transport_lines"))
                    .with_layer(LayerSummary::new("water")),
                MapDescriptor::new("ohm_admin").with_layer(LayerSummary::new("admin_boundaries")),
            ],
        };
        let info: LayerInfoIndex =
            serde_json::from_str(r#"{"water": [{"description": "Oceans, seas and lakes"}]}"#).unwrap();
        let details = vec![
            DetailOutcome::Detail(serde_json::from_str(r#"{"vector_layers": []}"#).unwrap()),
            DetailOutcome::Unavailable(UnavailableReason::Transport("connection refused".to_string())),
        ];
        assemble(root, info, details)
    }

    #[test]
    fn test_layer_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.layer("ohm", "water").unwrap().map, "ohm");
        assert!(catalog.layer("ohm_admin", "water").is_none());
        assert!(catalog.layer("missing", "water").is_none());
    }

    #[test]
    fn test_map_and_default_layer() {
        let catalog = catalog();
        assert!(catalog.map("ohm_admin").is_some());
        assert_eq!(catalog.default_layer("ohm").unwrap().name, "place_points");
        assert!(catalog.default_layer("nope").is_none());

        let names: Vec<&str> = catalog.layers_for_map("ohm").map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["place_points", "transport_lines", "water"]);
    }

    #[test]
    fn test_info_by_name() {
        let catalog = catalog();
        assert_eq!(catalog.info("water").unwrap().description(), Some("Oceans, seas and lakes"));
        assert!(catalog.info("place_points").is_none());
    }

    #[test]
    fn test_search() {
        let catalog = catalog();
        let hits: Vec<&str> = catalog.search("LAKES").iter().map(|l| l.name.as_str()).collect();
        assert_eq!(hits, vec!["water"]);
        assert_eq!(catalog.search("ohm_admin").len(), 1);
        assert_eq!(catalog.search("").len(), 4);
    }

    #[test]
    fn test_summary() {
        let summary = catalog().summary();
        assert_eq!(summary.maps, 2);
        assert_eq!(summary.layers, 4);
        assert_eq!(summary.maps_with_detail, 1);
        assert_eq!(summary.described_layers, 1);
        assert_eq!(summary.layers_by_geometry.get("point"), Some(&1));
        assert_eq!(summary.layers_by_geometry.get("line"), Some(&1));
        assert_eq!(summary.layers_by_geometry.get("polygon"), Some(&1));
        assert_eq!(summary.layers_by_geometry.get("unknown"), Some(&1));
    }

    #[test]
    fn test_serializes_downstream_shape() {
        let json = serde_json::to_value(catalog()).unwrap();
        assert!(json["layers"].is_array());
        assert!(json["infoByName"]["water"].is_object());
        assert_eq!(json["detailStatus"][0]["status"], "available");
        assert_eq!(json["detailStatus"][1]["reason"]["kind"], "transport");
        assert!(json.get("positions").is_none());
    }
}
