mod schema;

pub use schema::LocalStore;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Locally-known book metadata, one per imported or fetched book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Content-derived identifier, join key everywhere.
    pub id: String,
    /// Book title (possibly a file-name fallback).
    pub title: String,
    /// Author, empty when unknown.
    pub author: String,
    /// Description, empty when unknown.
    pub description: String,
    /// Inline-encoded cover image, absent when the book has none.
    pub cover: Option<CoverImage>,
    /// Timestamp of first local import. Set once, never mutated.
    pub added_at: i64,
}

/// Cover image stored inline with the metadata record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverImage {
    /// Media type of the encoded image (e.g. "image/jpeg").
    pub media_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl CoverImage {
    /// Encode raw image bytes for inline storage.
    pub fn from_bytes(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            media_type: media_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Decode back to raw image bytes, if the stored data is valid.
    pub fn decode(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.data).ok()
    }
}

/// Timestamp helper.
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}
