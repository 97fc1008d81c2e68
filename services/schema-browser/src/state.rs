//! Application state and shared resources.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use layer_catalog::{CatalogBuilder, CatalogResult, CatalogSession, RefreshOutcome, SourceConfig};

/// Shared state for the API server.
pub struct AppState {
    pub session: CatalogSession,
    pub builder: CatalogBuilder,
}

impl AppState {
    pub fn new(builder: CatalogBuilder) -> Self {
        Self {
            session: CatalogSession::new(),
            builder,
        }
    }

    pub fn config(&self) -> &SourceConfig {
        self.builder.source().config()
    }

    /// Run one build and commit it if no newer build was started meanwhile.
    pub async fn refresh(&self) -> CatalogResult<RefreshOutcome> {
        self.session.refresh(&self.builder).await
    }
}

/// Rebuild the catalog in the background.
pub fn spawn_refresh(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match state.refresh().await {
            Ok(RefreshOutcome::Committed { version }) => {
                info!(version, "Catalog refreshed");
            }
            Ok(RefreshOutcome::Superseded { version }) => {
                info!(version, "Catalog refresh superseded by a newer build");
            }
            Err(e) => {
                error!(error = %e, "Catalog refresh failed");
            }
        }
    })
}
