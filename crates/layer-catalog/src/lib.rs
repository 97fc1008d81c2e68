//! Layer catalog reconciliation.
//!
//! Fetches the three documents a vector tile server publishes about its
//! layers and merges them into one ordered catalog of [`LayerRecord`]s:
//!
//! - root capabilities (which maps exist, which layers each declares)
//! - per-map detail documents (geometry type and field schema, optional)
//! - the layer-info document (descriptions and per-zoom filters by name)
//!
//! Root capabilities and layer info are required; a missing detail document
//! only degrades that map's layers to name-based geometry inference.
//!
//! [`LayerRecord`]: vtiles_common::LayerRecord

pub mod builder;
pub mod catalog;
pub mod config;
pub mod locales;
pub mod resolver;
pub mod session;
pub mod source;

pub use builder::{assemble, CatalogBuilder};
pub use catalog::{Catalog, CatalogSummary, DetailStatus, MapDetailStatus};
pub use config::{Environment, LinkConfig, SourceConfig};
pub use locales::{filter_locales, load_locales};
pub use resolver::{infer_geometry, resolve, DetailIndex, Evidence, Resolution};
pub use session::{BuildState, BuildTicket, CatalogSession, RefreshOutcome};
pub use source::{DetailOutcome, HttpSource, UnavailableReason};

pub use vtiles_common::{CatalogError, CatalogResult};
