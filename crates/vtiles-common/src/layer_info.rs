//! Layer-info document: human-authored descriptions and per-zoom filter
//! configuration, keyed by layer name independently of any map.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::nullable;

/// The layer-info document (`{ "by_layer_name": { <name>: [entry, ...] } }`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LayerInfoDocument {
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub by_layer_name: LayerInfoIndex,
}

/// Name to info lookup with at most one entry per layer name.
///
/// Only the first entry of each name's sequence is retained. If the document
/// repeats a name as a key, the first occurrence carrying an entry wins and
/// later ones are dropped. Names with an empty sequence are absent, and a
/// name whose value is not a sequence of entries is skipped with a warning.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LayerInfoIndex(BTreeMap<String, LayerInfoEntry>);

impl LayerInfoIndex {
    pub fn get(&self, name: &str) -> Option<&LayerInfoEntry> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert unless the name is already present. Returns whether it was kept.
    pub fn insert_first(&mut self, name: String, entry: LayerInfoEntry) -> bool {
        match self.0.entry(name) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }
}

impl<'de> Deserialize<'de> for LayerInfoIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IndexVisitor;

        impl<'de> Visitor<'de> for IndexVisitor {
            type Value = LayerInfoIndex;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of layer name to a list of info entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut index = LayerInfoIndex::default();
                while let Some(name) = access.next_key::<String>()? {
                    let value: serde_json::Value = access.next_value()?;
                    match first_entry(value) {
                        Ok(Some(first)) => {
                            index.insert_first(name, first);
                        }
                        Ok(None) => {}
                        Err(e) => warn!(layer = %name, error = %e, "Skipping malformed layer info"),
                    }
                }
                Ok(index)
            }
        }

        deserializer.deserialize_map(IndexVisitor)
    }
}

/// First entry of one name's sequence. `null` and `[]` carry no entry.
fn first_entry(value: Value) -> Result<Option<LayerInfoEntry>, serde_json::Error> {
    match value {
        Value::Null => Ok(None),
        Value::Array(entries) => entries
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose(),
        other => Err(serde::de::Error::invalid_type(
            serde::de::Unexpected::Other(value_kind(&other)),
            &"a list of info entries",
        )),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One entry from the layer-info document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerInfoEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Free text lines, may embed URLs.
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub details: Vec<String>,

    #[serde(default, deserialize_with = "nullable::or_default")]
    pub filters_per_zoom_level: Vec<ZoomFilter>,

    /// Path of the tegola config file that defines the layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tegola_config: Option<String>,
}

impl LayerInfoEntry {
    /// Description if present and non-empty.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    pub fn tegola_config(&self) -> Option<&str> {
        self.tegola_config.as_deref().filter(|p| !p.is_empty())
    }
}

/// Filter and simplification settings for one zoom level (or zoom range).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoomFilter {
    #[serde(default)]
    pub zoom_level: Option<ConfigValue>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub tolerance: Option<ConfigValue>,
    #[serde(default)]
    pub min_area: Option<ConfigValue>,
    #[serde(default)]
    pub view_name: Option<String>,
}

/// A scalar that upstream writes either as a number or as text
/// (`"zoom_level": 5` vs `"zoom_level": "0-5"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ConfigValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Integer(n) => Some(*n as f64),
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Zero, empty text or a blank string count as "not set".
    pub fn is_blank(&self) -> bool {
        match self {
            ConfigValue::Integer(n) => *n == 0,
            ConfigValue::Float(f) => *f == 0.0,
            ConfigValue::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Integer(n) => write!(f, "{}", n),
            ConfigValue::Float(v) => write!(f, "{}", v),
            ConfigValue::Text(s) => f.write_str(s),
        }
    }
}

/// Render a `min_area` value with thousands separators.
///
/// Unset values render as `-`; text that is not numeric is returned as is.
pub fn format_min_area(value: Option<&ConfigValue>) -> String {
    let value = match value {
        Some(v) if !v.is_blank() => v,
        _ => return "-".to_string(),
    };

    match value.as_f64() {
        Some(n) if n.is_finite() => group_thousands(n),
        _ => value.to_string(),
    }
}

fn group_thousands(n: f64) -> String {
    let rounded = format!("{:.3}", n.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if n < 0.0 { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}
