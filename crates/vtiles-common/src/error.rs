//! Error types for catalog construction.

use std::fmt;

use thiserror::Error;

/// Result type alias using CatalogError.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Which upstream document an error relates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    RootCapabilities,
    LayerInfo,
    MapDetail,
    Locales,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::RootCapabilities => "capabilities",
            SourceKind::LayerInfo => "layers info",
            SourceKind::MapDetail => "map capabilities",
            SourceKind::Locales => "languages data",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary error type for fetching and reconciling upstream documents.
///
/// Only the foundational documents (root capabilities, layer info) and the
/// locales document surface these errors. Per-map detail failures are
/// absorbed by the reader and never reach a caller as an error.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport failure or non-success HTTP status.
    #[error("Failed to fetch {source_kind} from {url}: {message}")]
    Fetch {
        source_kind: SourceKind,
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// Body received but not valid for the expected document shape.
    #[error("Failed to parse {source_kind} from {url}: {message}")]
    Parse {
        source_kind: SourceKind,
        url: String,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl CatalogError {
    /// Build a fetch error from a transport error or status.
    pub fn fetch(
        source_kind: SourceKind,
        url: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        CatalogError::Fetch {
            source_kind,
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    pub fn parse(source_kind: SourceKind, url: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::Parse {
            source_kind,
            url: url.into(),
            message: message.into(),
        }
    }

    /// The document the failure relates to, if any.
    pub fn source_kind(&self) -> Option<SourceKind> {
        match self {
            CatalogError::Fetch { source_kind, .. } | CatalogError::Parse { source_kind, .. } => {
                Some(*source_kind)
            }
            _ => None,
        }
    }

    /// Short message suitable for showing next to a retry button.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Fetch {
                source_kind,
                status: Some(status),
                ..
            } => format!("Failed to load {} (HTTP {})", source_kind, status),
            CatalogError::Fetch { source_kind, .. } => {
                format!("Failed to load {}: server unreachable", source_kind)
            }
            CatalogError::Parse { source_kind, .. } => {
                format!("Failed to load {}: invalid document", source_kind)
            }
            CatalogError::Config(msg) => format!("Invalid configuration: {}", msg),
            CatalogError::Client(msg) => format!("HTTP client error: {}", msg),
        }
    }

    /// Whether re-running the same build could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::Fetch { .. } | CatalogError::Parse { .. })
    }
}
