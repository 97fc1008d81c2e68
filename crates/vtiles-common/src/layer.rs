//! The reconciled layer record and helpers for presenting it.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{GeometryType, ZoomFilter};

/// Prefix shared by per-language name fields (`name_en`, `name_de`, ...).
pub const LOCALE_FIELD_PREFIX: &str = "name_";

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s)]+").expect("URL pattern is valid"));

/// One layer of one map, merged from root capabilities, the map's detail
/// document and the layer-info document.
///
/// Uniquely identified by `(map, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRecord {
    pub id: String,
    pub name: String,
    pub map: String,
    pub minzoom: u8,
    pub maxzoom: u8,
    pub tiles: Vec<String>,
    pub geometry_type: GeometryType,
    pub fields: BTreeMap<String, String>,
    pub description: String,
    pub details: Vec<String>,
    pub filters_per_zoom_level: Vec<ZoomFilter>,
    pub tegola_config: Option<String>,
}

impl LayerRecord {
    /// Description used when the layer-info document has none:
    /// `"water_areas"` becomes `"water areas layer"`.
    pub fn default_description(name: &str) -> String {
        format!("{} layer", name.replace('_', " "))
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.map, &self.name)
    }

    pub fn first_tile(&self) -> Option<&str> {
        self.tiles.first().map(String::as_str)
    }

    /// Case-insensitive substring match over name, map and description.
    /// An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        [&self.name, &self.map, &self.description]
            .iter()
            .any(|text| text.to_lowercase().contains(&query))
    }

    /// Split fields into plain fields and per-language `name_*` fields,
    /// each in name order.
    pub fn partition_fields(&self) -> (Vec<(&str, &str)>, Vec<(&str, &str)>) {
        self.fields
            .iter()
            .map(|(name, label)| (name.as_str(), label.as_str()))
            .partition(|(name, _)| !name.starts_with(LOCALE_FIELD_PREFIX))
    }
}

/// Piece of a detail line: plain text or an embedded link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailSegment<'a> {
    Text(&'a str),
    Link(&'a str),
}

/// Split a detail line into text and link segments, in order.
pub fn split_links(text: &str) -> Vec<DetailSegment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for m in URL_PATTERN.find_iter(text) {
        if m.start() > last {
            segments.push(DetailSegment::Text(&text[last..m.start()]));
        }
        segments.push(DetailSegment::Link(m.as_str()));
        last = m.end();
    }

    if last < text.len() {
        segments.push(DetailSegment::Text(&text[last..]));
    }
    segments
}
