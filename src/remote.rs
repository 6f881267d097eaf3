//! Remote backend contracts.
//!
//! The hosted backend exposes two per-user surfaces: a blob area for raw
//! book bytes and a `user_books` table holding one catalog row per
//! `(user_id, book_hash)`. Both are reached through these traits so the
//! engine stays independent of the concrete backend client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Remote path convention for mirrored book bytes.
pub fn blob_path(user_id: &str, book_id: &str) -> String {
    format!("{}/{}.epub", user_id, book_id)
}

/// Per-user remote blob area for raw book bytes.
#[async_trait]
pub trait RemoteBlobStore: Send + Sync {
    /// Store bytes at the given path, overwriting on conflict.
    /// Calling twice with identical bytes is observably the same as once.
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<()>;

    /// Retrieve bytes for the given path. Fails with `NotFound` when the
    /// path is absent remotely.
    async fn download(&self, path: &str) -> Result<Vec<u8>>;
}

/// One row of the per-user `user_books` table.
///
/// The row is the sole remote source of truth for reading position. It
/// carries no blob, only a pointer-by-id into the remote blob area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCatalogEntry {
    /// Owning user.
    pub user_id: String,
    /// Book hash, equal to the local `BookRecord.id`.
    pub book_hash: String,
    /// Title as last seen by a progress update.
    pub title: String,
    /// Opaque renderer-defined locator string.
    pub last_read_cfi: String,
    /// Reading percentage, 0-100.
    pub percentage: u8,
    /// Server timestamp of the last upsert, RFC 3339.
    pub updated_at: String,
}

/// Per-user remote catalog with composite uniqueness on
/// `(user_id, book_hash)`.
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// Insert-or-update a row keyed by `(user_id, book_hash)`. Never
    /// errors on a pre-existing key.
    async fn upsert(&self, entry: &RemoteCatalogEntry) -> Result<()>;

    /// Point lookup by composite key. `Ok(None)` when the row is absent;
    /// errors are reserved for backend failures.
    async fn get(&self, user_id: &str, book_hash: &str) -> Result<Option<RemoteCatalogEntry>>;

    /// All rows for a user.
    async fn list(&self, user_id: &str) -> Result<Vec<RemoteCatalogEntry>>;
}
