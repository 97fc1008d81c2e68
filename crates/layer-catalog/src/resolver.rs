//! Geometry type and field schema resolution for one (map, layer) pair.
//!
//! Evidence is taken in a fixed order, first match wins:
//!
//! 1. The map's detail document lists the layer: use its geometry type and
//!    fields. A blank geometry type falls through to name inference for the
//!    geometry only; the detail fields are still used.
//! 2. Otherwise infer the geometry from the layer name and leave fields empty.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::trace;

use vtiles_common::{GeometryType, MapCapabilityDetail, VectorLayer};

/// Detail-document layers indexed by map name, then layer id.
///
/// Keys are kept structured so a `:` (or any other character) inside a map
/// or layer name cannot make two pairs collide.
#[derive(Debug, Clone, Default)]
pub struct DetailIndex {
    maps: HashMap<String, HashMap<String, VectorLayer>>,
}

impl DetailIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every vector layer of one map's detail document. A layer id
    /// listed twice keeps the later entry.
    pub fn add_map(&mut self, map_name: &str, detail: &MapCapabilityDetail) {
        let layers = self.maps.entry(map_name.to_string()).or_default();
        for layer in &detail.vector_layers {
            layers.insert(layer.id.clone(), layer.clone());
        }
    }

    pub fn get(&self, map_name: &str, layer_name: &str) -> Option<&VectorLayer> {
        self.maps.get(map_name)?.get(layer_name)
    }

    /// Number of indexed (map, layer) pairs.
    pub fn len(&self) -> usize {
        self.maps.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which rule produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Evidence {
    /// Geometry and fields from the detail document.
    Detail,
    /// Fields from the detail document, geometry inferred from the name.
    DetailFieldsOnly,
    /// No detail entry; geometry inferred from the name.
    NameInference,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub geometry_type: GeometryType,
    pub fields: BTreeMap<String, String>,
    pub evidence: Evidence,
}

/// Resolve geometry type and fields for `layer_name` inside `map_name`.
pub fn resolve(map_name: &str, layer_name: &str, index: &DetailIndex) -> Resolution {
    let resolution = match index.get(map_name, layer_name) {
        Some(VectorLayer {
            geometry_type: Some(geometry_type),
            fields,
            ..
        }) => Resolution {
            geometry_type: geometry_type.clone(),
            fields: fields.clone(),
            evidence: Evidence::Detail,
        },
        Some(VectorLayer { fields, .. }) => Resolution {
            geometry_type: infer_geometry(layer_name),
            fields: fields.clone(),
            evidence: Evidence::DetailFieldsOnly,
        },
        None => Resolution {
            geometry_type: infer_geometry(layer_name),
            fields: BTreeMap::new(),
            evidence: Evidence::NameInference,
        },
    };

    trace!(
        map = %map_name,
        layer = %layer_name,
        geometry = %resolution.geometry_type,
        evidence = ?resolution.evidence,
        "Resolved layer geometry"
    );
    resolution
}

/// Guess a geometry type from the serving layer's naming convention.
///
/// Rules are checked in order, so `"points_in_areas"` is a point layer.
pub fn infer_geometry(layer_name: &str) -> GeometryType {
    if layer_name.contains("centroids") || layer_name.contains("points") {
        GeometryType::Point
    } else if layer_name.contains("lines") {
        GeometryType::LineString
    } else if layer_name.contains("areas") || !layer_name.contains('_') {
        GeometryType::MultiPolygon
    } else {
        GeometryType::Unknown
    }
}
