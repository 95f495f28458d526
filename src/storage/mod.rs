//! Local key-value persistence.
//!
//! A [`KeyValueStore`] holds string values under short keys. It backs the
//! local employee store and the license cache; [`FileKeyValueStore`] keeps
//! one file per key on disk and [`MemoryKeyValueStore`] keeps everything in
//! process.

mod file;
mod memory;

use async_trait::async_trait;

use crate::error::EngineResult;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;

/// String values stored under string keys.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value under `key`, or `None` if nothing is stored.
    async fn get(&self, key: &str) -> EngineResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> EngineResult<()>;

    /// Removes `key`. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> EngineResult<()>;
}
