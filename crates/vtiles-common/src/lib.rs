//! Common types shared by the vector tiles schema browser.
//!
//! Covers the three upstream documents published by the tile server (root
//! capabilities, per-map detail, layer info), the reconciled [`LayerRecord`],
//! and the error taxonomy used when fetching them.

pub mod capabilities;
pub mod detail;
pub mod error;
pub mod geometry;
pub mod layer;
pub mod layer_info;
pub mod locale;

mod nullable;

pub use capabilities::{LayerSummary, MapDescriptor, RootCapabilities};
pub use detail::{MapCapabilityDetail, VectorLayer};
pub use error::{CatalogError, CatalogResult, SourceKind};
pub use geometry::{GeometryFamily, GeometryType};
pub use layer::{split_links, DetailSegment, LayerRecord};
pub use layer_info::{format_min_area, ConfigValue, LayerInfoDocument, LayerInfoEntry, LayerInfoIndex, ZoomFilter};
pub use locale::{Locale, LocaleCollection};

/// Zoom level assumed when a document leaves `minzoom` out.
pub const DEFAULT_MIN_ZOOM: u8 = 0;

/// Zoom level assumed when a document leaves `maxzoom` out.
pub const DEFAULT_MAX_ZOOM: u8 = 20;
