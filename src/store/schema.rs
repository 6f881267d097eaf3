use crate::error::{EngineError, Result};
use crate::store::{BookRecord, CoverImage};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Durable on-device store, thread-safe.
///
/// Two independent namespaces share book IDs as keys: `book_blobs` holds
/// raw EPUB bytes, `book_records` holds derived metadata. The namespaces
/// are individually consistent but not jointly atomic; a record without a
/// blob is a tolerated inconsistency that the reconciler surfaces as
/// remote-only or unreadable.
#[derive(Clone)]
pub struct LocalStore {
    conn: Arc<Mutex<Connection>>,
}

impl LocalStore {
    /// Open or create the store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| EngineError::Internal(format!("Failed to open store: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| EngineError::Internal(format!("Failed to open store: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize store schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            -- Binary namespace: id -> raw book bytes
            CREATE TABLE IF NOT EXISTS book_blobs (
                id TEXT PRIMARY KEY,
                data BLOB NOT NULL
            );

            -- Metadata namespace: id -> book record
            CREATE TABLE IF NOT EXISTS book_records (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                cover_media_type TEXT,
                cover_data TEXT,
                added_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_records_added ON book_records(added_at);
            "#,
        )
        .map_err(|e| EngineError::Internal(format!("Failed to initialize schema: {}", e)))?;

        Ok(())
    }

    /// Write both namespaces for a book. Blob first, then record, so a
    /// crash between the two leaves a readable blob rather than a record
    /// pointing at nothing. Re-importing an existing ID overwrites the
    /// blob and display fields but keeps the original `added_at`.
    pub fn put(&self, id: &str, bytes: &[u8], record: &BookRecord) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO book_blobs (id, data) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data",
            params![id, bytes],
        )
        .map_err(|e| EngineError::Internal(format!("Failed to store blob: {}", e)))?;

        let (cover_media_type, cover_data) = match &record.cover {
            Some(cover) => (Some(cover.media_type.as_str()), Some(cover.data.as_str())),
            None => (None, None),
        };

        conn.execute(
            "INSERT INTO book_records (id, title, author, description, cover_media_type, cover_data, added_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                 title = excluded.title,
                 author = excluded.author,
                 description = excluded.description,
                 cover_media_type = excluded.cover_media_type,
                 cover_data = excluded.cover_data",
            params![
                id,
                record.title,
                record.author,
                record.description,
                cover_media_type,
                cover_data,
                record.added_at,
            ],
        )
        .map_err(|e| EngineError::Internal(format!("Failed to store record: {}", e)))?;

        Ok(())
    }

    /// Get raw book bytes by ID.
    pub fn get_blob(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT data FROM book_blobs WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| EngineError::Internal(format!("Failed to get blob: {}", e)))
    }

    /// Whether raw bytes are present locally for this ID.
    pub fn has_blob(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT 1 FROM book_blobs WHERE id = ?1",
            params![id],
            |_| Ok(()),
        )
        .optional()
        .map(|found| found.is_some())
        .map_err(|e| EngineError::Internal(format!("Failed to check blob: {}", e)))
    }

    /// Get the metadata record by ID.
    pub fn get_record(&self, id: &str) -> Result<Option<BookRecord>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, title, author, description, cover_media_type, cover_data, added_at
             FROM book_records WHERE id = ?1",
            params![id],
            row_to_record,
        )
        .optional()
        .map_err(|e| EngineError::Internal(format!("Failed to get record: {}", e)))
    }

    /// List all metadata records. Ordering is unspecified; consumers sort
    /// by `added_at` descending.
    pub fn list(&self) -> Result<Vec<BookRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, title, author, description, cover_media_type, cover_data, added_at
                 FROM book_records",
            )
            .map_err(|e| EngineError::Internal(format!("Failed to list records: {}", e)))?;

        let records = stmt
            .query_map([], row_to_record)
            .map_err(|e| EngineError::Internal(format!("Failed to list records: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| EngineError::Internal(format!("Failed to list records: {}", e)))?;

        Ok(records)
    }

    /// All IDs known to the metadata namespace.
    pub fn ids(&self) -> Result<HashSet<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT id FROM book_records")
            .map_err(|e| EngineError::Internal(format!("Failed to list ids: {}", e)))?;

        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| EngineError::Internal(format!("Failed to list ids: {}", e)))?
            .collect::<std::result::Result<HashSet<_>, _>>()
            .map_err(|e| EngineError::Internal(format!("Failed to list ids: {}", e)))?;

        Ok(ids)
    }

    /// Delete a book from both namespaces. Returns whether anything was
    /// removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();

        let blobs = conn
            .execute("DELETE FROM book_blobs WHERE id = ?1", params![id])
            .map_err(|e| EngineError::Internal(format!("Failed to delete blob: {}", e)))?;
        let records = conn
            .execute("DELETE FROM book_records WHERE id = ?1", params![id])
            .map_err(|e| EngineError::Internal(format!("Failed to delete record: {}", e)))?;

        Ok(blobs > 0 || records > 0)
    }

    /// Drop only the blob namespace entry, leaving the record behind.
    /// Exists to exercise the tolerated metadata-without-blob state.
    #[cfg(test)]
    pub(crate) fn delete_blob_only(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM book_blobs WHERE id = ?1", params![id])
            .map(|n| n > 0)
            .map_err(|e| EngineError::Internal(format!("Failed to delete blob: {}", e)))
    }

    /// Number of metadata records.
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM book_records", [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|n| n as usize)
        .map_err(|e| EngineError::Internal(format!("Failed to count records: {}", e)))
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<BookRecord> {
    let cover_media_type: Option<String> = row.get(4)?;
    let cover_data: Option<String> = row.get(5)?;
    let cover = match (cover_media_type, cover_data) {
        (Some(media_type), Some(data)) => Some(CoverImage { media_type, data }),
        _ => None,
    };

    Ok(BookRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        description: row.get(3)?,
        cover,
        added_at: row.get(6)?,
    })
}
