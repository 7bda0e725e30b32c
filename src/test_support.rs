//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::action::{Action, Effect, update};
use crate::core::document::{Document, LoadRequest};
use crate::core::links::{FollowableLink, LinkRegistry};
use crate::core::state::Pager;

/// A scratch directory tree removed on drop.
pub struct TempTree {
    dir: TempDir,
}

impl TempTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Absolute path of `rel` inside the tree.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(&path).expect("mkdir");
        path
    }

    /// Write `contents` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir parent");
        }
        fs::write(&path, contents).expect("write file");
        path
    }
}

/// Absolute, symlink-evaluated form of `path` (falls back to the input).
pub fn abs_eval(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// A link whose label and note are derived from `name`.
pub fn link(name: &str) -> FollowableLink {
    FollowableLink {
        href: format!("{name}.md"),
        path: format!("{name}.md"),
        fragment: String::new(),
        label: name.to_string(),
        resolved_path: PathBuf::from(format!("/root/{name}.md")),
        resolved_note: format!("{name}.md"),
    }
}

/// A registry of links labeled by `labels`, in order.
pub fn registry(labels: &[&str]) -> LinkRegistry {
    LinkRegistry::new(labels.iter().map(|l| link(l)).collect())
}

/// A document at `/root/<name>.md` with the given body.
pub fn document(name: &str, body: &str) -> Document {
    Document {
        local_path: PathBuf::from(format!("/root/{name}.md")),
        note: format!("{name}.md"),
        body: body.to_string(),
    }
}

/// A pager rooted at `/root` with a 10-line viewport.
pub fn test_pager() -> Pager {
    let mut pager = Pager::new(PathBuf::from("/root"));
    pager.viewport_height = 10;
    pager.viewport_width = 80;
    pager
}

/// Request `doc` and deliver it, the way the adapter does after reading it.
pub fn load_document(pager: &mut Pager, doc: Document) -> Effect {
    let request = LoadRequest::new(doc.local_path.clone(), &pager.root);
    update(pager, Action::Open(request));
    update(pager, Action::DocumentLoaded(doc))
}
