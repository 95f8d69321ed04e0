//! GVW Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging bootstrap for the GVW workspace.
//!
//! # Overview
//!
//! This crate provides the functionality used across all GVW workspace
//! members:
//!
//! - **Error Handling**: the `GvwError` taxonomy shared by the ingest
//!   library and the server
//! - **Logging**: `tracing` subscriber initialization driven by `LogConfig`
//!
//! # Example
//!
//! ```no_run
//! use gvw_common::logging::{init_logging, LogConfig};
//! use tracing::info;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     info!("service started");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{GvwError, Result};
