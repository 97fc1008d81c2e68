//! Per-map detail document (TileJSON-like `vector_layers` listing).
//!
//! Servers spell the geometry key either `geometry_type` or `geometryType`.
//! Both are read here, once, and everything downstream sees a single
//! normalized [`VectorLayer::geometry_type`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{nullable, GeometryType};

/// Detailed schema for one map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMapDetail")]
pub struct MapCapabilityDetail {
    pub vector_layers: Vec<VectorLayer>,
}

/// A layer as described by a map's detail document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorLayer {
    pub id: String,
    /// `None` when neither spelling carried a non-empty value.
    pub geometry_type: Option<GeometryType>,
    /// Field name to declared type label.
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RawMapDetail {
    #[serde(default, deserialize_with = "nullable::or_default")]
    vector_layers: Vec<RawVectorLayer>,
}

#[derive(Debug, Deserialize)]
struct RawVectorLayer {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    geometry_type: Option<Value>,
    #[serde(default, rename = "geometryType")]
    geometry_type_camel: Option<Value>,
    #[serde(default)]
    fields: Option<Value>,
}

impl From<RawMapDetail> for MapCapabilityDetail {
    fn from(raw: RawMapDetail) -> Self {
        let vector_layers = raw
            .vector_layers
            .into_iter()
            .filter_map(VectorLayer::from_raw)
            .collect();
        Self { vector_layers }
    }
}

impl VectorLayer {
    fn from_raw(raw: RawVectorLayer) -> Option<Self> {
        // Without an id the entry cannot be matched to any layer.
        let id = raw.id.filter(|id| !id.is_empty())?;

        let geometry_type = [raw.geometry_type, raw.geometry_type_camel]
            .into_iter()
            .flatten()
            .find_map(|value| value.as_str().and_then(GeometryType::parse));

        let fields = match raw.fields {
            Some(Value::Object(map)) => map
                .into_iter()
                .map(|(name, label)| {
                    let label = match label {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (name, label)
                })
                .collect(),
            _ => BTreeMap::new(),
        };

        Some(Self {
            id,
            geometry_type,
            fields,
        })
    }
}
