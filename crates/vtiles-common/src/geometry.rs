//! Geometry type vocabulary for vector tile layers.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Geometry type of a vector layer.
///
/// Labels from detail documents are matched case-insensitively; `"line"` is
/// folded into [`GeometryType::LineString`]. Anything unrecognised is kept
/// as [`GeometryType::Other`] rather than discarded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GeometryType {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    #[default]
    Unknown,
    Other(String),
}

/// Coarse grouping used when presenting a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryFamily {
    Point,
    Line,
    Polygon,
    Other,
}

impl GeometryFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryFamily::Point => "point",
            GeometryFamily::Line => "line",
            GeometryFamily::Polygon => "polygon",
            GeometryFamily::Other => "other",
        }
    }
}

impl GeometryType {
    /// Parse a geometry label. Returns `None` for an empty or blank label so
    /// callers can fall back to other evidence.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }

        let lower = label.to_ascii_lowercase();
        let parsed = match lower.as_str() {
            "point" => GeometryType::Point,
            "multipoint" => GeometryType::MultiPoint,
            "line" | "linestring" => GeometryType::LineString,
            "multiline" | "multilinestring" => GeometryType::MultiLineString,
            "polygon" => GeometryType::Polygon,
            "multipolygon" => GeometryType::MultiPolygon,
            "unknown" => GeometryType::Unknown,
            _ => GeometryType::Other(lower),
        };
        Some(parsed)
    }

    /// Canonical lowercase name, as serialized.
    pub fn as_str(&self) -> &str {
        match self {
            GeometryType::Point => "point",
            GeometryType::MultiPoint => "multipoint",
            GeometryType::LineString => "linestring",
            GeometryType::MultiLineString => "multilinestring",
            GeometryType::Polygon => "polygon",
            GeometryType::MultiPolygon => "multipolygon",
            GeometryType::Unknown => "unknown",
            GeometryType::Other(label) => label.as_str(),
        }
    }

    /// Name without the `multi` prefix (`multipolygon` is shown as `polygon`).
    pub fn display_label(&self) -> &str {
        let name = self.as_str();
        name.strip_prefix("multi").unwrap_or(name)
    }

    pub fn family(&self) -> GeometryFamily {
        match self {
            GeometryType::Point | GeometryType::MultiPoint => GeometryFamily::Point,
            GeometryType::LineString | GeometryType::MultiLineString => GeometryFamily::Line,
            GeometryType::Polygon | GeometryType::MultiPolygon => GeometryFamily::Polygon,
            GeometryType::Unknown | GeometryType::Other(_) => GeometryFamily::Other,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, GeometryType::Unknown)
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for GeometryType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GeometryType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label
            .as_deref()
            .and_then(GeometryType::parse)
            .unwrap_or_default())
    }
}
