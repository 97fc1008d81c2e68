//! Upstream source configuration.
//!
//! Each deployment environment has a preset of document URLs and outbound
//! links. Individual URLs can be overridden through environment variables:
//!
//! - `CAPABILITIES_URL`
//! - `LAYERS_INFO_URL`
//! - `LANGUAGES_GEOJSON_URL`
//! - `HTTP_TIMEOUT_SECS` (default: 30)

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use vtiles_common::{CatalogError, CatalogResult};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Deployment environment selecting a preset of upstream URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(CatalogError::Config(format!("unknown environment '{}'", other))),
        }
    }
}

/// Outbound links shown next to catalog entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkConfig {
    pub open_historical_map: String,
    pub vector_tiles: String,
    pub github_base: String,
    pub github_branch: String,
    pub tegola_config_path: String,
}

/// Where to fetch each upstream document from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub environment: Environment,
    /// Root capabilities document; per-map detail documents live under it.
    pub capabilities_url: String,
    pub layers_info_url: String,
    pub languages_geojson_url: String,
    pub map_style_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub links: LinkConfig,
}

impl SourceConfig {
    /// Preset URLs for an environment.
    pub fn for_environment(environment: Environment) -> Self {
        let (api, site, tiles, bucket, branch) = match environment {
            Environment::Staging => (
                "https://vtiles.staging.openhistoricalmap.org",
                "https://staging.openhistoricalmap.org",
                "https://vtiles.staging.openhistoricalmap.org",
                "http://planet-staging.openhistoricalmap.org.s3.amazonaws.com",
                "staging",
            ),
            Environment::Production => (
                "https://vtiles.openhistoricalmap.org",
                "https://openhistoricalmap.org",
                "https://vtiles.openhistoricalmap.org",
                "https://planet.openhistoricalmap.org.s3.amazonaws.com",
                "main",
            ),
        };
        let style_host = match environment {
            Environment::Staging => "https://www.staging.openhistoricalmap.org",
            Environment::Production => "https://www.openhistoricalmap.org",
        };

        Self {
            environment,
            capabilities_url: format!("{}/capabilities", api),
            layers_info_url: format!("{}/vtiles_layers_info.json", bucket),
            languages_geojson_url: format!("{}/vtiles_languages.geojson", bucket),
            map_style_url: format!("{}/map-styles/historical/historical.json", style_host),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            links: LinkConfig {
                open_historical_map: site.to_string(),
                vector_tiles: tiles.to_string(),
                github_base: "https://github.com/OpenHistoricalMap/ohm-deploy".to_string(),
                github_branch: branch.to_string(),
                tegola_config_path: "images/tiler-server".to_string(),
            },
        }
    }

    /// All documents served from one host, using the same file names as the
    /// production layout. Used for local mirrors and tests.
    pub fn for_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let mut config = Self::for_environment(Environment::Staging);
        config.capabilities_url = format!("{}/capabilities", base);
        config.layers_info_url = format!("{}/vtiles_layers_info.json", base);
        config.languages_geojson_url = format!("{}/vtiles_languages.geojson", base);
        config
    }

    /// Preset for `environment` with overrides from the process environment.
    pub fn from_env(environment: Environment) -> Self {
        Self::for_environment(environment).with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key/value lookup. Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("CAPABILITIES_URL") {
            debug!(url = %url, "Overriding capabilities URL");
            self.capabilities_url = url;
        }
        if let Some(url) = get("LAYERS_INFO_URL") {
            debug!(url = %url, "Overriding layers info URL");
            self.layers_info_url = url;
        }
        if let Some(url) = get("LANGUAGES_GEOJSON_URL") {
            self.languages_geojson_url = url;
        }
        if let Some(secs) = get("HTTP_TIMEOUT_SECS").and_then(|v| v.trim().parse::<u64>().ok()) {
            self.request_timeout = Duration::from_secs(secs);
        }
        self
    }

    /// Check that every document URL is an absolute http(s) URL.
    pub fn validate(&self) -> CatalogResult<()> {
        let urls = [
            ("capabilities_url", &self.capabilities_url),
            ("layers_info_url", &self.layers_info_url),
            ("languages_geojson_url", &self.languages_geojson_url),
        ];
        for (name, url) in urls {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CatalogError::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }
        if self.request_timeout.is_zero() {
            return Err(CatalogError::Config("request timeout must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Detail document for one map: `<capabilities>/<map>.json`.
    pub fn map_detail_url(&self, map_name: &str) -> String {
        format!("{}/{}.json", self.capabilities_url.trim_end_matches('/'), map_name)
    }

    /// Link to a tegola config file in the deployment repository.
    pub fn tegola_config_url(&self, config_path: &str) -> String {
        format!(
            "{}/blob/{}/{}/{}",
            self.links.github_base,
            self.links.github_branch,
            self.links.tegola_config_path,
            config_path.trim_start_matches('/')
        )
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}
