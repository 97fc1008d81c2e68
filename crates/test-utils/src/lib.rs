//! Shared test utilities for the vtiles-schema workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Canned upstream documents (root capabilities, map detail, layer info,
//!   languages)
//! - An in-process HTTP server that serves them, so tests exercise the real
//!   HTTP client path
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then in an async test:
//!
//! ```ignore
//! use test_utils::{fixtures, FixtureServer};
//!
//! let server = FixtureServer::start().await;
//! fixtures::mount_defaults(&server);
//! let base_url = server.base_url();
//! ```

pub mod fixtures;
pub mod server;

pub use server::{FixtureResponse, FixtureServer};
