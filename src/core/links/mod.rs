//! # Followable Links
//!
//! Which links in a document can be followed, and where they lead.
//!
//! ```text
//! markdown ──► extract (pulldown-cmark) ──► RawLink*
//!                                              │
//!                     resolve (root, current) ◄┘
//!                              │
//!                              ▼
//!                       LinkRegistry  ──► focus cycling, highlighting
//! ```
//!
//! - [`extract`]: raw `(href, label)` pairs in document order
//! - [`resolve`]: classification, decoding and sandboxed resolution
//!
//! A registry is built once per rendered document and never mutated.

pub mod extract;
pub mod resolve;

use std::path::{Path, PathBuf};

use log::debug;

pub use extract::{RawLink, extract_raw_links, markdown_options};
pub use resolve::{FileSystem, LinkError, RealFs, resolve_followable_link};

/// A link that resolves to a markdown file inside the root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowableLink {
    /// Destination as written (trimmed, angle brackets stripped), pre-decode.
    pub href: String,
    /// Path portion of the destination, fragment removed, percent-decoded.
    pub path: String,
    /// Text after the first `#`, or empty.
    pub fragment: String,
    /// Visible link text. Never empty.
    pub label: String,
    /// Absolute, symlink-evaluated path of an existing regular file.
    pub resolved_path: PathBuf,
    /// `resolved_path` relative to the root, for the status bar.
    pub resolved_note: String,
}

/// Ordered followable links of one rendered document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRegistry {
    links: Vec<FollowableLink>,
}

impl LinkRegistry {
    pub fn new(links: Vec<FollowableLink>) -> Self {
        Self { links }
    }

    pub fn get(&self, index: usize) -> Option<&FollowableLink> {
        self.links.get(index)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FollowableLink> {
        self.links.iter()
    }
}

impl<'a> IntoIterator for &'a LinkRegistry {
    type Item = &'a FollowableLink;
    type IntoIter = std::slice::Iter<'a, FollowableLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

/// Build the link registry for the document at `current_path`.
///
/// Links with an empty label or that fail resolution are dropped. A hard
/// [`LinkError`] aborts the whole document.
pub fn followable_links_for_document(
    fs: &impl FileSystem,
    root: &Path,
    current_path: &Path,
    markdown: &str,
) -> Result<LinkRegistry, LinkError> {
    let raw = extract_raw_links(markdown);
    let mut out = Vec::with_capacity(raw.len());

    for RawLink { href, label } in raw {
        let Some(mut link) = resolve_followable_link(fs, root, current_path, &href)? else {
            continue;
        };
        if label.trim().is_empty() {
            debug!("Dropping link with empty label: {href:?}");
            continue;
        }
        link.label = label;
        out.push(link);
    }

    debug!(
        "{} followable link(s) in {}",
        out.len(),
        current_path.display()
    );
    Ok(LinkRegistry::new(out))
}
