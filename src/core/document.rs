//! # Documents
//!
//! A markdown file as the pager holds it: where it lives, how to show its
//! name, and its source text.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use super::links::resolve::strip_root;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Absolute path of the file on disk.
    pub local_path: PathBuf,
    /// Short display name (root-relative when possible).
    pub note: String,
    /// Markdown source.
    pub body: String,
}

#[derive(Debug)]
pub enum DocumentError {
    Read { path: PathBuf, source: io::Error },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Read { path, source } => {
                write!(f, "could not read {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Read { source, .. } => Some(source),
        }
    }
}

/// What to load next, as requested by the pager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub path: PathBuf,
    pub note: String,
}

impl LoadRequest {
    /// Request for `path`, noted relative to `root`.
    pub fn new(path: PathBuf, root: &Path) -> Self {
        let note = strip_root(&path, root);
        Self { path, note }
    }
}

/// Read the requested document from disk.
pub fn load(request: &LoadRequest) -> Result<Document, DocumentError> {
    let body = fs::read_to_string(&request.path).map_err(|source| DocumentError::Read {
        path: request.path.clone(),
        source,
    })?;
    info!(
        "Loaded {} ({} bytes)",
        request.path.display(),
        body.len()
    );
    Ok(Document {
        local_path: request.path.clone(),
        note: request.note.clone(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempTree;

    #[test]
    fn load_reads_body_and_keeps_note() {
        let tree = TempTree::new();
        let path = tree.write("root/docs/a.md", "# A\n");
        let request = LoadRequest::new(path.clone(), &tree.path("root"));
        assert_eq!(request.note, format!("docs{}a.md", std::path::MAIN_SEPARATOR));

        let doc = load(&request).unwrap();
        assert_eq!(doc.body, "# A\n");
        assert_eq!(doc.local_path, path);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let tree = TempTree::new();
        let request = LoadRequest::new(tree.path("nope.md"), &tree.path(""));
        let err = load(&request).unwrap_err();
        assert!(err.to_string().contains("could not read"));
    }

    #[test]
    fn note_outside_root_keeps_full_path() {
        let request = LoadRequest::new(PathBuf::from("/elsewhere/a.md"), Path::new("/root"));
        assert_eq!(request.note, "/elsewhere/a.md");
    }
}
