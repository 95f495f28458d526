//! Configuration loading and management for the Salary Engine.
//!
//! This module provides [`AppConfig`], which selects the storage backend,
//! the license authority, the display locale and the server settings.
//!
//! # Example
//!
//! ```
//! use salary_engine::config::{AppConfig, StorageBackend};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.storage.backend, StorageBackend::Local);
//! ```

mod loader;
mod types;

pub use loader::ENV_PREFIX;
pub use types::{AppConfig, LicenseConfig, StorageBackend, StorageConfig};
