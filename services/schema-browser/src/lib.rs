//! Headless schema browser over the reconciled layer catalog.
//!
//! The library half is shared by the binary and its integration tests:
//! console reports for the one-shot subcommands and the read-only HTTP API
//! used in `serve` mode.

pub mod report;
pub mod server;
pub mod state;

pub use state::AppState;
