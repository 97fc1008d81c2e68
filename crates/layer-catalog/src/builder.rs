//! Catalog build orchestration.
//!
//! Root capabilities and layer info are fetched concurrently and must both
//! succeed. Per-map detail documents are then fetched concurrently, one per
//! map, and correlated back to their map by position.

use std::collections::HashSet;
use std::time::Instant;

use futures::future::join_all;
use metrics::{counter, gauge};
use tracing::{debug, info, instrument, warn};

use vtiles_common::{CatalogResult, LayerInfoIndex, LayerRecord, RootCapabilities};

use crate::catalog::{Catalog, DetailStatus, MapDetailStatus};
use crate::config::SourceConfig;
use crate::resolver::{resolve, DetailIndex};
use crate::source::{DetailOutcome, HttpSource, UnavailableReason};

/// Runs full catalog builds against one upstream source.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    source: HttpSource,
}

impl CatalogBuilder {
    pub fn new(source: HttpSource) -> Self {
        Self { source }
    }

    pub fn from_config(config: SourceConfig) -> CatalogResult<Self> {
        Ok(Self::new(HttpSource::new(config)?))
    }

    pub fn source(&self) -> &HttpSource {
        &self.source
    }

    /// Fetch every document and assemble the catalog. Fails if either root
    /// capabilities or layer info cannot be loaded; no partial catalog is
    /// ever returned.
    #[instrument(skip(self), fields(env = %self.source.config().environment))]
    pub async fn build(&self) -> CatalogResult<Catalog> {
        let start = Instant::now();
        info!("Building layer catalog");

        let (root, info) = tokio::join!(
            self.source.fetch_root_capabilities(),
            self.source.fetch_layer_info()
        );
        let (root, info) = match (root, info) {
            (Ok(root), Ok(info)) => (root, info),
            (Err(e), _) | (_, Err(e)) => {
                counter!("catalog_builds_total", "outcome" => "failed").increment(1);
                warn!(error = %e, "Catalog build failed");
                return Err(e);
            }
        };

        let details = join_all(root.maps.iter().map(|m| self.source.fetch_map_detail(&m.name))).await;

        let catalog = assemble(root, info, details);

        counter!("catalog_builds_total", "outcome" => "success").increment(1);
        gauge!("catalog_layers").set(catalog.layers.len() as f64);
        info!(
            maps = catalog.maps.len(),
            layers = catalog.layers.len(),
            maps_with_detail = catalog.summary().maps_with_detail,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Layer catalog built"
        );
        Ok(catalog)
    }
}

/// Merge fetched documents into a catalog.
///
/// `details[i]` belongs to `root.maps[i]`. A map with no corresponding
/// outcome is treated as [`UnavailableReason::NotFetched`].
pub fn assemble(root: RootCapabilities, info: LayerInfoIndex, details: Vec<DetailOutcome>) -> Catalog {
    let mut index = DetailIndex::new();
    let mut detail_status = Vec::with_capacity(root.maps.len());
    let mut details = details.into_iter();

    for map in &root.maps {
        let outcome = details
            .next()
            .unwrap_or(DetailOutcome::Unavailable(UnavailableReason::NotFetched));

        let status = match outcome {
            DetailOutcome::Detail(detail) => {
                index.add_map(&map.name, &detail);
                DetailStatus::Available {
                    layers: detail.vector_layers.len(),
                }
            }
            DetailOutcome::Unavailable(reason) => DetailStatus::Unavailable { reason },
        };
        detail_status.push(MapDetailStatus {
            map: map.name.clone(),
            status,
        });
    }

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut layers = Vec::new();

    for map in &root.maps {
        for summary in &map.layers {
            if !seen.insert((map.name.as_str(), summary.name.as_str())) {
                warn!(map = %map.name, layer = %summary.name, "Duplicate layer in capabilities, skipping");
                continue;
            }

            let resolution = resolve(&map.name, &summary.name, &index);
            debug!(
                map = %map.name,
                layer = %summary.name,
                evidence = ?resolution.evidence,
                "Resolved layer"
            );

            let entry = info.get(&summary.name);
            layers.push(LayerRecord {
                id: summary.name.clone(),
                name: summary.name.clone(),
                map: map.name.clone(),
                minzoom: summary.minzoom,
                maxzoom: summary.maxzoom,
                tiles: summary.tiles.clone(),
                geometry_type: resolution.geometry_type,
                fields: resolution.fields,
                description: entry
                    .and_then(|e| e.description())
                    .map(str::to_string)
                    .unwrap_or_else(|| LayerRecord::default_description(&summary.name)),
                details: entry.map(|e| e.details.clone()).unwrap_or_default(),
                filters_per_zoom_level: entry
                    .map(|e| e.filters_per_zoom_level.clone())
                    .unwrap_or_default(),
                tegola_config: entry.and_then(|e| e.tegola_config()).map(str::to_string),
            });
        }
    }

    Catalog::new(layers, root.maps, info, detail_status)
}
