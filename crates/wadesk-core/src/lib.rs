//! # wadesk-core
//!
//! Core types, configuration, and utilities for wadesk.
//!
//! This crate provides shared functionality used across all wadesk crates:
//!
//! - **Types**: contacts, messages and their status/direction enums
//! - **Phone numbers**: normalization and placeholder contact names
//! - **Configuration**: loading, environment overlays and validation
//! - **Utilities**: path resolution, environment handling, secret strings

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod phone;
pub mod secret;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use secret::SecretString;
pub use types::*;
