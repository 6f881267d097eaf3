//! Library engine: import, reconciliation and remote fetch.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::identity;
use crate::remote::{RemoteBlobStore, RemoteCatalog, RemoteCatalogEntry, blob_path};
use crate::session::SessionContext;
use crate::store::{BookRecord, CoverImage, LocalStore, now_timestamp};

/// Metadata supplied by the EPUB parser collaborator.
#[derive(Debug, Clone, Default)]
pub struct BookMetadata {
    /// Book title, if the package declares one.
    pub title: Option<String>,
    /// Creator (author), if declared.
    pub creator: Option<String>,
    /// Description, if declared.
    pub description: Option<String>,
    /// Raw cover image, if one was extracted.
    pub cover: Option<CoverData>,
}

/// Raw cover image bytes handed over by the parser.
#[derive(Debug, Clone)]
pub struct CoverData {
    /// Media type of the image (e.g. "image/jpeg").
    pub media_type: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

/// One file handed to the import flow.
///
/// `metadata` is `None` when the parser collaborator failed; the engine
/// then substitutes the file name as the title before hashing, per the
/// identity contract.
#[derive(Debug, Clone)]
pub struct ImportSource {
    /// Original file name, used as the fallback title.
    pub file_name: String,
    /// Raw EPUB bytes.
    pub bytes: Vec<u8>,
    /// Parsed metadata, absent when extraction failed.
    pub metadata: Option<BookMetadata>,
}

/// Per-file outcome of a batch import. One failure never aborts the
/// remaining batch.
#[derive(Debug)]
pub struct ImportOutcome {
    /// File name of the processed source.
    pub file_name: String,
    /// The stored record, or the error that sank this file.
    pub result: Result<BookRecord>,
}

/// One entry of the merged library view. Derived, never persisted;
/// recomputed on each library load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    /// Display record, local fields when the book is known locally.
    pub record: BookRecord,
    /// Blob not present locally; must be fetched before reading.
    pub remote_only: bool,
}

/// Offline-first library engine.
///
/// Local durability is the baseline guarantee: local store failures are
/// fatal to the calling operation, while every remote call is best-effort
/// and never blocks local read/write. The one exception is
/// [`LibraryEngine::fetch_remote`], an explicit user action with no local
/// fallback, which surfaces remote errors.
#[derive(Clone)]
pub struct LibraryEngine {
    store: LocalStore,
    mirror: Arc<dyn RemoteBlobStore>,
    catalog: Arc<dyn RemoteCatalog>,
    config: Arc<EngineConfig>,
}

impl LibraryEngine {
    /// Create an engine over a local store and remote backend clients.
    pub fn new(
        store: LocalStore,
        mirror: Arc<dyn RemoteBlobStore>,
        catalog: Arc<dyn RemoteCatalog>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            mirror,
            catalog,
            config: Arc::new(config),
        }
    }

    /// Direct access to the local store (blob reads, deletion).
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Import one book: resolve its identity, persist blob and record,
    /// then mirror the bytes remotely in a detached task.
    ///
    /// The import is reported successful once the local store holds the
    /// book; the upload runs fire-and-forget and its failure is
    /// observable only via logs. Re-importing a file that resolves to an
    /// existing ID overwrites blob and display fields, keeping the
    /// original `added_at`.
    pub async fn import(&self, session: &SessionContext, source: ImportSource) -> Result<BookRecord> {
        let (title, author, description, cover) = match source.metadata {
            Some(meta) => {
                let title = meta
                    .title
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| fallback_title(&source.file_name));
                (
                    title,
                    meta.creator.unwrap_or_default(),
                    meta.description.unwrap_or_default(),
                    meta.cover,
                )
            }
            None => {
                tracing::warn!(
                    file = %source.file_name,
                    "No metadata extracted, falling back to file name"
                );
                (
                    fallback_title(&source.file_name),
                    String::new(),
                    String::new(),
                    None,
                )
            }
        };

        let id = identity::resolve(&title, &author);

        let record = BookRecord {
            id: id.clone(),
            title,
            author,
            description,
            cover: cover.map(|c| CoverImage::from_bytes(c.media_type, &c.bytes)),
            added_at: now_timestamp(),
        };

        self.store.put(&id, &source.bytes, &record)?;

        // The stored record keeps the first import's added_at.
        let stored = self.store.get_record(&id)?.unwrap_or(record);

        tracing::info!(book = %id, title = %stored.title, "Imported book");

        self.spawn_upload(session, &id, source.bytes);

        Ok(stored)
    }

    /// Import several files strictly sequentially, reporting a per-file
    /// outcome. Sequential processing keeps progress reporting simple and
    /// predictable, not for correctness.
    pub async fn import_batch(
        &self,
        session: &SessionContext,
        sources: Vec<ImportSource>,
    ) -> Vec<ImportOutcome> {
        let mut outcomes = Vec::with_capacity(sources.len());

        for source in sources {
            let file_name = source.file_name.clone();
            let result = self.import(session, source).await;
            if let Err(e) = &result {
                tracing::warn!(file = %file_name, error = %e, "Failed to import book");
            }
            outcomes.push(ImportOutcome { file_name, result });
        }

        outcomes
    }

    /// Merge the local store with the user's remote catalog into one
    /// deduplicated library view, sorted by `added_at` descending.
    ///
    /// Every ID known to either side appears exactly once. When both
    /// sides know a book, local display fields win. Remote-only entries
    /// carry the remote title, no author, no cover, and an `added_at` of
    /// now, which floats them to the top of the listing in remote catalog
    /// order (the sort is stable).
    ///
    /// When unauthenticated or when the catalog is unreachable, degrades
    /// to the local list alone.
    pub async fn reconcile(&self, session: &SessionContext) -> Result<Vec<LibraryEntry>> {
        let local = self.store.list()?;

        let Some(user_id) = session.user_id() else {
            return Ok(local_entries(local));
        };

        let remote = match self.catalog.list(user_id).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Remote catalog unreachable, serving local library");
                return Ok(local_entries(local));
            }
        };

        let local_order: Vec<String> = local.iter().map(|r| r.id.clone()).collect();
        let mut by_id: HashMap<String, BookRecord> =
            local.into_iter().map(|r| (r.id.clone(), r)).collect();

        let mut entries = Vec::with_capacity(by_id.len() + remote.len());

        for remote_entry in remote {
            match by_id.remove(&remote_entry.book_hash) {
                Some(record) => {
                    // Metadata-without-blob is a tolerated inconsistency:
                    // the book reads as remote-only until fetched.
                    let remote_only = !self.store.has_blob(&record.id)?;
                    entries.push(LibraryEntry {
                        record,
                        remote_only,
                    });
                }
                None => entries.push(LibraryEntry {
                    record: synthesize_record(remote_entry),
                    remote_only: true,
                }),
            }
        }

        // Purely local books, never synced.
        for id in local_order {
            if let Some(record) = by_id.remove(&id) {
                entries.push(LibraryEntry {
                    record,
                    remote_only: false,
                });
            }
        }

        entries.sort_by(|a, b| b.record.added_at.cmp(&a.record.added_at));

        Ok(entries)
    }

    /// Download a remote-only book into the local store.
    ///
    /// Explicit user action with no local fallback: `Unauthenticated`,
    /// `NotFound` and `RemoteUnavailable` all surface. On success the
    /// blob and a record are persisted locally, so subsequent reconciles
    /// see the book as local.
    pub async fn fetch_remote(&self, session: &SessionContext, id: &str) -> Result<BookRecord> {
        let user_id = session.require_user()?;

        let bytes = self.mirror.download(&blob_path(user_id, id)).await?;

        let record = match self.store.get_record(id)? {
            Some(existing) => existing,
            None => {
                // Best-effort title from the catalog row; the blob is
                // already in hand, so a catalog miss does not fail the
                // download.
                let title = match self.catalog.get(user_id, id).await {
                    Ok(Some(entry)) => entry.title,
                    Ok(None) => id.to_string(),
                    Err(e) => {
                        tracing::debug!(book = id, error = %e, "Catalog lookup failed after download");
                        id.to_string()
                    }
                };
                BookRecord {
                    id: id.to_string(),
                    title,
                    author: String::new(),
                    description: String::new(),
                    cover: None,
                    added_at: now_timestamp(),
                }
            }
        };

        self.store.put(id, &bytes, &record)?;

        tracing::info!(book = %id, size = bytes.len(), "Fetched remote book");

        Ok(record)
    }

    /// Delete a book from both local namespaces. Returns whether anything
    /// was removed. The remote mirror and catalog are left untouched.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let removed = self.store.delete(id)?;
        if removed {
            tracing::info!(book = %id, "Deleted book");
        }
        Ok(removed)
    }

    /// Spawn the detached mirror upload for a freshly imported book.
    /// Failure is observable only via logs, never via the import result.
    fn spawn_upload(&self, session: &SessionContext, id: &str, bytes: Vec<u8>) {
        if !self.config.sync.upload_enabled {
            return;
        }

        let Some(user_id) = session.user_id() else {
            tracing::debug!(book = %id, "Skipping mirror upload, no session");
            return;
        };

        let mirror = Arc::clone(&self.mirror);
        let path = blob_path(user_id, id);

        tokio::spawn(async move {
            match mirror.upload(&path, &bytes).await {
                Ok(()) => tracing::debug!(path = %path, "Mirrored book to remote"),
                Err(e) => tracing::warn!(path = %path, error = %e, "Background upload failed"),
            }
        });
    }
}

/// Local-only view: everything readable, sorted by `added_at` descending.
fn local_entries(local: Vec<BookRecord>) -> Vec<LibraryEntry> {
    let mut entries: Vec<LibraryEntry> = local
        .into_iter()
        .map(|record| LibraryEntry {
            record,
            remote_only: false,
        })
        .collect();
    entries.sort_by(|a, b| b.record.added_at.cmp(&a.record.added_at));
    entries
}

/// Shape a catalog row into a displayable record. Author is unknown
/// remotely and the catalog carries no cover.
fn synthesize_record(entry: RemoteCatalogEntry) -> BookRecord {
    BookRecord {
        id: entry.book_hash,
        title: entry.title,
        author: String::new(),
        description: String::new(),
        cover: None,
        added_at: now_timestamp(),
    }
}

/// File-name fallback title used when metadata extraction fails.
fn fallback_title(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(file_name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_title_strips_extension() {
        assert_eq!(fallback_title("Moby Dick.epub"), "Moby Dick");
        assert_eq!(fallback_title("no-extension"), "no-extension");
        assert_eq!(fallback_title(".hidden"), ".hidden");
    }
}
