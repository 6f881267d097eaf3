//! Content-addressable book identity.
//!
//! A book's identifier is derived purely from its metadata, never from
//! import order or device, so the same book resolves to the same ID on
//! every device. The digest input is the `"<title>-<author>"`
//! concatenation; two distinct books sharing both fields collide, and the
//! engine does not disambiguate that case.

use sha2::{Digest, Sha256};

/// Derive the stable book ID for a `(title, author)` pair.
///
/// Pure function: same input always yields the same lowercase hex SHA-256
/// digest. Callers with failed metadata extraction must substitute a
/// fallback (typically the file name) before calling; there is no
/// fallback policy here.
pub fn resolve(title: &str, author: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(b"-");
    hasher.update(author.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|byte| format!("{:02x}", byte)).collect()
}
