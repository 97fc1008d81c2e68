//! Versioned holder for the current catalog.
//!
//! Every build takes a [`BuildTicket`] from [`CatalogSession::begin`]. Only
//! the most recently issued ticket may commit a catalog or record a failure,
//! so a slow build started earlier can never overwrite a newer result.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use vtiles_common::{CatalogError, CatalogResult};

use crate::builder::CatalogBuilder;
use crate::catalog::Catalog;

/// Issued when a build starts. Versions increase monotonically per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BuildTicket {
    version: u64,
}

impl BuildTicket {
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// State of the most recently initiated build.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BuildState {
    /// No build has been started.
    Idle,
    Loading {
        version: u64,
    },
    Ready {
        version: u64,
        built_at: DateTime<Utc>,
    },
    Failed {
        version: u64,
        message: String,
        retryable: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The build finished and is now the current catalog.
    Committed { version: u64 },
    /// The build finished after a newer one was started and was dropped.
    Superseded { version: u64 },
}

struct SessionInner {
    latest: u64,
    current: Option<Arc<Catalog>>,
    state: BuildState,
}

/// Owns the current catalog and decides which build results may replace it.
pub struct CatalogSession {
    inner: RwLock<SessionInner>,
}

impl CatalogSession {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(SessionInner {
                latest: 0,
                current: None,
                state: BuildState::Idle,
            }),
        }
    }

    /// Start a build. Any build begun earlier becomes stale.
    pub async fn begin(&self) -> BuildTicket {
        let mut inner = self.inner.write().await;
        inner.latest += 1;
        inner.state = BuildState::Loading {
            version: inner.latest,
        };
        debug!(version = inner.latest, "Catalog build started");
        BuildTicket {
            version: inner.latest,
        }
    }

    /// Make `catalog` current if `ticket` is the latest build.
    /// Returns false and drops the catalog otherwise.
    pub async fn commit(&self, ticket: BuildTicket, catalog: Catalog) -> bool {
        let mut inner = self.inner.write().await;
        if ticket.version != inner.latest {
            counter!("catalog_stale_builds_discarded_total").increment(1);
            info!(
                version = ticket.version,
                latest = inner.latest,
                "Discarding catalog from superseded build"
            );
            return false;
        }

        inner.state = BuildState::Ready {
            version: ticket.version,
            built_at: catalog.built_at,
        };
        inner.current = Some(Arc::new(catalog));
        true
    }

    /// Record a failed build if `ticket` is the latest build. A previously
    /// committed catalog stays current.
    pub async fn fail(&self, ticket: BuildTicket, error: &CatalogError) -> bool {
        let mut inner = self.inner.write().await;
        if ticket.version != inner.latest {
            counter!("catalog_stale_builds_discarded_total").increment(1);
            debug!(version = ticket.version, "Ignoring failure of superseded build");
            return false;
        }

        inner.state = BuildState::Failed {
            version: ticket.version,
            message: error.user_message(),
            retryable: error.is_retryable(),
        };
        true
    }

    /// Most recently committed catalog, if any.
    pub async fn current(&self) -> Option<Arc<Catalog>> {
        self.inner.read().await.current.clone()
    }

    pub async fn state(&self) -> BuildState {
        self.inner.read().await.state.clone()
    }

    /// Run one full build under a fresh ticket.
    ///
    /// Returns the build error when the build itself fails, whether or not
    /// the failure was recorded.
    pub async fn refresh(&self, builder: &CatalogBuilder) -> CatalogResult<RefreshOutcome> {
        let ticket = self.begin().await;

        match builder.build().await {
            Ok(catalog) => {
                if self.commit(ticket, catalog).await {
                    Ok(RefreshOutcome::Committed {
                        version: ticket.version,
                    })
                } else {
                    Ok(RefreshOutcome::Superseded {
                        version: ticket.version,
                    })
                }
            }
            Err(e) => {
                if !self.fail(ticket, &e).await {
                    warn!(version = ticket.version, error = %e, "Superseded build failed");
                }
                Err(e)
            }
        }
    }
}

impl Default for CatalogSession {
    fn default() -> Self {
        Self::new()
    }
}
