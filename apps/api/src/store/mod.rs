//! Namespaced key-value persistence.
//!
//! Keys are structured as `<entityType>:<userId>:<entityId>` so that all
//! records of one kind belonging to one user sit under a common prefix.
//! Values are stored as JSON documents alongside a monotonically increasing
//! per-key version used for optimistic writes.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("version conflict on key '{key}' (expected {expected})")]
    VersionConflict { key: String, expected: i64 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A stored value together with the version the store assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned {
    pub value: Value,
    pub version: i64,
}

/// Minimal contract every component persists through.
///
/// `put` is last-write-wins; writes to the same key are linearized by the
/// backend. `put_if_version` is the optimistic-concurrency escape hatch for
/// read-modify-write callers.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Replaces the value at `key` unconditionally.
    async fn put(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Writes only when `key` does not exist yet. Returns `true` when the
    /// write happened, `false` when an existing entry was left untouched.
    async fn put_if_absent(&self, key: &str, value: Value) -> Result<bool, StoreError>;

    async fn get(&self, key: &str) -> Result<Option<Versioned>, StoreError>;

    /// Replaces the value at `key` only while its stored version still equals
    /// `expected`. Fails with [`StoreError::VersionConflict`] otherwise,
    /// including when the key is absent.
    async fn put_if_version(&self, key: &str, value: Value, expected: i64)
        -> Result<(), StoreError>;

    /// Every entry whose key starts with `prefix`, in unspecified order.
    async fn scan_by_prefix(&self, prefix: &str) -> Result<Vec<(String, Versioned)>, StoreError>;
}
