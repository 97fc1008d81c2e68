//! HTTP readers for the upstream documents.
//!
//! Root capabilities, layer info and locales are fatal on failure and return
//! [`CatalogError`]. Per-map detail documents never fail: any transport,
//! status or parse problem becomes [`DetailOutcome::Unavailable`].

use std::fmt;

use metrics::counter;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use vtiles_common::{
    CatalogError, CatalogResult, LayerInfoDocument, LayerInfoIndex, LocaleCollection,
    MapCapabilityDetail, RootCapabilities, SourceKind,
};

use crate::config::SourceConfig;

/// Result of fetching one map's detail document.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    Detail(MapCapabilityDetail),
    Unavailable(UnavailableReason),
}

impl DetailOutcome {
    pub fn detail(&self) -> Option<&MapCapabilityDetail> {
        match self {
            DetailOutcome::Detail(detail) => Some(detail),
            DetailOutcome::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, DetailOutcome::Detail(_))
    }
}

/// Why a detail document could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum UnavailableReason {
    /// Connection, timeout or body read failure.
    Transport(String),
    /// Server answered with a non-success status.
    Status(u16),
    /// Body was not a valid detail document.
    Malformed(String),
    /// No fetch result was supplied for this map.
    NotFetched,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::Transport(msg) => write!(f, "transport error: {}", msg),
            UnavailableReason::Status(code) => write!(f, "HTTP {}", code),
            UnavailableReason::Malformed(msg) => write!(f, "malformed document: {}", msg),
            UnavailableReason::NotFetched => f.write_str("not fetched"),
        }
    }
}

impl From<CatalogError> for UnavailableReason {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Fetch {
                status: Some(code), ..
            } => UnavailableReason::Status(code),
            CatalogError::Fetch { message, .. } => UnavailableReason::Transport(message),
            CatalogError::Parse { message, .. } => UnavailableReason::Malformed(message),
            other => UnavailableReason::Transport(other.to_string()),
        }
    }
}

/// Reads upstream documents over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    config: SourceConfig,
}

impl HttpSource {
    /// Create a source with a client configured from `config`.
    pub fn new(config: SourceConfig) -> CatalogResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(8)
            .user_agent(concat!("vtiles-schema/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Fetch the root capabilities document. Fatal on failure.
    #[instrument(skip(self))]
    pub async fn fetch_root_capabilities(&self) -> CatalogResult<RootCapabilities> {
        let caps: RootCapabilities = self
            .fetch_json(SourceKind::RootCapabilities, &self.config.capabilities_url)
            .await?;
        debug!(maps = caps.maps.len(), "Fetched root capabilities");
        Ok(caps)
    }

    /// Fetch the layer-info document, reduced to one entry per layer name.
    /// Fatal on failure.
    #[instrument(skip(self))]
    pub async fn fetch_layer_info(&self) -> CatalogResult<LayerInfoIndex> {
        let doc: LayerInfoDocument = self
            .fetch_json(SourceKind::LayerInfo, &self.config.layers_info_url)
            .await?;
        debug!(layers = doc.by_layer_name.len(), "Fetched layer info");
        Ok(doc.by_layer_name)
    }

    /// Fetch one map's detail document. Never fails.
    #[instrument(skip(self))]
    pub async fn fetch_map_detail(&self, map_name: &str) -> DetailOutcome {
        let url = self.config.map_detail_url(map_name);

        match self.fetch_json::<MapCapabilityDetail>(SourceKind::MapDetail, &url).await {
            Ok(detail) => {
                counter!("catalog_detail_fetches_total", "outcome" => "available").increment(1);
                debug!(
                    map = %map_name,
                    layers = detail.vector_layers.len(),
                    "Fetched map detail"
                );
                DetailOutcome::Detail(detail)
            }
            Err(e) => {
                counter!("catalog_detail_fetches_total", "outcome" => "unavailable").increment(1);
                let reason = UnavailableReason::from(e);
                warn!(
                    map = %map_name,
                    url = %url,
                    reason = %reason,
                    "Map detail unavailable, falling back to name inference"
                );
                DetailOutcome::Unavailable(reason)
            }
        }
    }

    /// Fetch the languages GeoJSON document. Fatal on failure.
    #[instrument(skip(self))]
    pub async fn fetch_locales(&self) -> CatalogResult<LocaleCollection> {
        self.fetch_json(SourceKind::Locales, &self.config.languages_geojson_url)
            .await
    }

    async fn fetch_json<T: DeserializeOwned>(&self, kind: SourceKind, url: &str) -> CatalogResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::fetch(kind, url, None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::fetch(
                kind,
                url,
                Some(status.as_u16()),
                format!("unexpected status {}", status),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CatalogError::fetch(kind, url, None, e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| CatalogError::parse(kind, url, e.to_string()))
    }
}
