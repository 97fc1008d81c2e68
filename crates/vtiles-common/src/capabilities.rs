//! Root capabilities document: the maps the tile server publishes and the
//! layers each one declares.

use serde::{Deserialize, Serialize};

use crate::{nullable, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};

fn default_min_zoom() -> u8 {
    DEFAULT_MIN_ZOOM
}

fn default_max_zoom() -> u8 {
    DEFAULT_MAX_ZOOM
}

/// Top-level capabilities document (`{ "maps": [...] }`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RootCapabilities {
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub maps: Vec<MapDescriptor>,
}

/// One tile map as declared by the root capabilities document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDescriptor {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,

    #[serde(default = "default_min_zoom", deserialize_with = "nullable::min_zoom")]
    pub minzoom: u8,

    #[serde(default = "default_max_zoom", deserialize_with = "nullable::max_zoom")]
    pub maxzoom: u8,

    /// Layers in declared order.
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub layers: Vec<LayerSummary>,
}

impl MapDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribution: None,
            minzoom: DEFAULT_MIN_ZOOM,
            maxzoom: DEFAULT_MAX_ZOOM,
            layers: Vec::new(),
        }
    }

    pub fn with_layer(mut self, layer: LayerSummary) -> Self {
        self.layers.push(layer);
        self
    }
}

/// A layer entry inside a map's root capabilities entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSummary {
    pub name: String,

    #[serde(default = "default_min_zoom", deserialize_with = "nullable::min_zoom")]
    pub minzoom: u8,

    #[serde(default = "default_max_zoom", deserialize_with = "nullable::max_zoom")]
    pub maxzoom: u8,

    /// Tile URL templates.
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub tiles: Vec<String>,
}

impl LayerSummary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            minzoom: DEFAULT_MIN_ZOOM,
            maxzoom: DEFAULT_MAX_ZOOM,
            tiles: Vec::new(),
        }
    }
}
