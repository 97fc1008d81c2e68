//! Vector tile schema browser.
//!
//! Reconciles the layer documents published by a vector tile server and
//! either prints them (one-shot subcommands) or serves them over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use layer_catalog::{filter_locales, load_locales, Catalog, CatalogBuilder, Environment, SourceConfig};
use schema_browser::report::CatalogReport;
use schema_browser::server::run_server;
use schema_browser::state::{spawn_refresh, AppState};

#[derive(Parser, Debug)]
#[command(name = "schema-browser")]
#[command(about = "Browse the layer schema published by a vector tile server", long_about = None)]
struct Cli {
    /// Deployment environment selecting the upstream URLs
    #[arg(long, global = true, env = "VTILES_ENV", default_value = "staging")]
    env: Environment,

    /// Log filter directive (e.g., info, layer_catalog=debug); RUST_LOG overrides it
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "json")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List maps
    Maps,

    /// List the layers of a map
    Layers {
        /// Map name (e.g., ohm)
        map: String,

        /// Only layers whose name or description contain this text
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Show one layer in full
    Layer {
        map: String,
        layer: String,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// List locales from the languages document
    Locales {
        /// Only locales whose key or alias contain this text
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Serve the catalog over HTTP
    Serve {
        /// Listen address
        #[arg(short, long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
        listen: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format)?;

    let config = SourceConfig::from_env(cli.env);
    let builder = CatalogBuilder::from_config(config).context("Invalid source configuration")?;

    match cli.command {
        Commands::Maps => {
            let catalog = build(&builder).await?;
            println!("{}", CatalogReport::format_maps(&catalog));
            println!("{}", CatalogReport::format_links(builder.source().config()));
        }
        Commands::Layers { map, search } => {
            let catalog = build(&builder).await?;
            let table = CatalogReport::format_layers(&catalog, &map, &search)
                .ok_or_else(|| anyhow!("Unknown map '{}'", map))?;
            println!("{}", table);
        }
        Commands::Layer { map, layer, json } => {
            let catalog = build(&builder).await?;
            let record = catalog
                .layer(&map, &layer)
                .ok_or_else(|| anyhow!("Unknown layer '{}' in map '{}'", layer, map))?;
            if json {
                println!("{}", serde_json::to_string_pretty(record)?);
            } else {
                println!("{}", CatalogReport::format_layer(record, builder.source().config()));
            }
        }
        Commands::Locales { search } => {
            let locales = load_locales(builder.source())
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("{}", CatalogReport::format_locales(&filter_locales(&locales, &search)));
        }
        Commands::Serve { listen } => {
            let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .context("Failed to install Prometheus recorder")?;
            info!("Prometheus metrics exporter initialized");

            let addr: SocketAddr = listen.parse().context("Invalid listen address")?;
            let state = Arc::new(AppState::new(builder));
            spawn_refresh(state.clone());

            info!(env = %cli.env, "Starting schema browser server");
            run_server(state, Some(prometheus_handle), addr).await?;
        }
    }

    Ok(())
}

/// Build the catalog, reducing a failure to its user-facing message.
async fn build(builder: &CatalogBuilder) -> Result<Catalog> {
    builder.build().await.map_err(|e| anyhow!(e.user_message()))
}

fn init_tracing(log_level: &str, format: LogFormat) -> Result<()> {
    // RUST_LOG takes precedence over --log-level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // Logs go to stderr so tables on stdout stay clean
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Text => tracing::subscriber::set_global_default(builder.compact().finish())?,
    }
    Ok(())
}
