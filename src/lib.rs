//! shelfsync: an offline-first EPUB library core with reading sync.
//!
//! This crate is the storage and synchronization engine behind an EPUB
//! reader: deterministic content-addressable book identity, a two-tier
//! local store (raw blob plus derived metadata), a remote mirror for book
//! bytes, a per-user remote catalog carrying reading positions, a
//! reconciler that merges both catalogs into one library view, and a
//! progress synchronizer that resumes reading across devices.
//!
//! # Features
//!
//! - Content-addressable book identity (SHA-256 of title and author)
//! - Durable local blob and metadata storage over SQLite
//! - Fire-and-forget mirroring of imported books to a remote blob area
//! - Library reconciliation that degrades cleanly to local-only
//! - Last-write-wins reading position sync
//! - Best-effort chapter title resolution from a renderer TOC
//!
//! Rendering, pagination, authentication flows and all UI state live in
//! external collaborators; the engine only consumes their results.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Engine configuration.
pub mod config;
/// Import, reconciliation and remote fetch.
pub mod engine;
/// Error types.
pub mod error;
/// Content-addressable book identity.
pub mod identity;
/// Reading position synchronization.
pub mod progress;
/// Remote backend contracts.
pub mod remote;
/// Authenticated session context.
pub mod session;
/// Local blob and metadata storage.
pub mod store;
/// Table-of-contents lookups.
pub mod toc;


pub use config::EngineConfig;
pub use engine::{BookMetadata, ImportOutcome, ImportSource, LibraryEngine, LibraryEntry};
pub use error::{EngineError, Result};
pub use progress::{ProgressSync, ReadingPosition};
pub use remote::{RemoteBlobStore, RemoteCatalog, RemoteCatalogEntry};
pub use session::SessionContext;
pub use store::{BookRecord, LocalStore};
