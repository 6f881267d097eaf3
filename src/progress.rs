//! Reading position synchronization.
//!
//! Progress lives only in the remote catalog; local reading never depends
//! on it. Saving is last-write-wins by wall clock of the call, loading
//! collapses every failure into "no remote progress" so the reader simply
//! starts from the beginning.

use chrono::Utc;
use std::sync::Arc;

use crate::remote::{RemoteCatalog, RemoteCatalogEntry};
use crate::session::SessionContext;

/// Stored reading position for one book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingPosition {
    /// Opaque renderer-defined locator string.
    pub last_read_cfi: String,
    /// Reading percentage, 0-100.
    pub percentage: u8,
    /// Server timestamp of the last update, RFC 3339.
    pub updated_at: String,
}

/// Persists and retrieves reading positions against the remote catalog.
#[derive(Clone)]
pub struct ProgressSync {
    catalog: Arc<dyn RemoteCatalog>,
}

impl ProgressSync {
    /// Create a synchronizer over the given catalog client.
    pub fn new(catalog: Arc<dyn RemoteCatalog>) -> Self {
        Self { catalog }
    }

    /// Upsert the reading position for a book.
    ///
    /// No-ops silently when unauthenticated; progress sync is a
    /// convenience, not a requirement for local reading. Backend failures
    /// are logged, never surfaced, and not retried.
    pub async fn save_progress(
        &self,
        session: &SessionContext,
        book_id: &str,
        title: &str,
        locator: &str,
        percentage: u8,
    ) {
        let Some(user_id) = session.user_id() else {
            tracing::debug!(book = book_id, "Skipping progress sync, no session");
            return;
        };

        let entry = RemoteCatalogEntry {
            user_id: user_id.to_string(),
            book_hash: book_id.to_string(),
            title: title.to_string(),
            last_read_cfi: locator.to_string(),
            percentage: percentage.min(100),
            updated_at: Utc::now().to_rfc3339(),
        };

        if let Err(e) = self.catalog.upsert(&entry).await {
            tracing::warn!(book = book_id, error = %e, "Failed to sync progress");
        }
    }

    /// Fetch the stored reading position for a book.
    ///
    /// Unauthenticated, not-found and backend errors all collapse to
    /// `None`; the caller falls back to starting from the beginning.
    pub async fn load_progress(
        &self,
        session: &SessionContext,
        book_id: &str,
    ) -> Option<ReadingPosition> {
        let user_id = session.user_id()?;

        match self.catalog.get(user_id, book_id).await {
            Ok(Some(entry)) => Some(ReadingPosition {
                last_read_cfi: entry.last_read_cfi,
                percentage: entry.percentage,
                updated_at: entry.updated_at,
            }),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(book = book_id, error = %e, "No remote progress available");
                None
            }
        }
    }
}
