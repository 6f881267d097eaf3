//! Table-of-contents lookups.
//!
//! The rendering collaborator supplies a TOC tree and a current location;
//! the only logic owned here is the best-effort mapping from a location's
//! href to a chapter title.

use serde::{Deserialize, Serialize};

/// One entry of the renderer-supplied table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocItem {
    /// Display label for the chapter.
    pub label: String,
    /// Href of the chapter's content document, possibly with a fragment.
    pub href: String,
    /// Nested sub-entries.
    #[serde(default)]
    pub subitems: Vec<TocItem>,
}

/// Renderer-defined current location within a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Opaque locator string (CFI).
    pub cfi: String,
    /// Href of the content document the location falls in.
    pub href: String,
}

/// Flatten the TOC tree depth-first, with sub-entries emitted before
/// their parent. The ordering matters to `chapter_title`: scanning the
/// flattened list from the end visits a parent before its children, so a
/// parent whose href also matches shadows its own sub-entries.
pub fn flatten_toc(items: &[TocItem]) -> Vec<&TocItem> {
    let mut flat = Vec::new();
    for item in items {
        flat.extend(flatten_toc(&item.subitems));
        flat.push(item);
    }
    flat
}

/// Resolve the chapter title for the current href.
///
/// Best-effort heuristic: strip any `#fragment`, then scan the flattened
/// TOC from the end and return the last entry whose href path is
/// contained in the current href path. Inherently ambiguous for EPUBs
/// whose spine hrefs do not nest cleanly under TOC hrefs; when several
/// entries match, the last one wins.
pub fn chapter_title<'a>(toc: &'a [TocItem], current_href: &str) -> Option<&'a str> {
    let href_path = strip_fragment(current_href);

    let flat = flatten_toc(toc);
    for item in flat.iter().rev() {
        let item_path = strip_fragment(&item.href);
        if item_path == href_path || href_path.contains(item_path) {
            return Some(item.label.as_str());
        }
    }

    None
}

fn strip_fragment(href: &str) -> &str {
    href.split('#').next().unwrap_or(href)
}
