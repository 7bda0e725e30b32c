//! # Href classification and sandboxed resolution
//!
//! Turns a raw link destination into a [`FollowableLink`] or rejects it.
//!
//! ```text
//! href ──► normalize ──► classify ──► decode ──► join + clean
//!                           │                         │
//!                        Ok(None)                     ▼
//!                                        absolute ──► canonicalize (root + candidate)
//!                                                      │
//!                                              inside root? ──► regular file? ──► FollowableLink
//! ```
//!
//! Rejections are silent (`Ok(None)`): external URLs, `mailto:`, absolute
//! paths, non-markdown extensions, anything outside the root, missing files
//! and directories. Only a failure to compute an absolute path is an error.
//!
//! Symlinks are evaluated on both the root and the candidate *before* the
//! containment test, so a link through a symlink that points outside the
//! root is rejected even though it looks root-relative.

use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

use log::debug;
use percent_encoding::percent_decode_str;

use super::FollowableLink;

// ============================================================================
// Filesystem capability
// ============================================================================

/// The filesystem queries the resolver needs. Kept narrow so resolution can
/// be tested without touching disk.
pub trait FileSystem {
    /// Absolute, lexically cleaned form of `path`.
    fn absolute(&self, path: &Path) -> io::Result<PathBuf>;

    /// `path` with every symlink evaluated. Fails when the path does not exist.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Whether `path` (following symlinks) is an existing regular file.
    fn is_regular_file(&self, path: &Path) -> io::Result<bool>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn absolute(&self, path: &Path) -> io::Result<PathBuf> {
        std::path::absolute(path).map(|p| clean(&p))
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }

    fn is_regular_file(&self, path: &Path) -> io::Result<bool> {
        std::fs::metadata(path).map(|m| m.is_file())
    }
}

// ============================================================================
// Error Type
// ============================================================================

/// Environment-level failures that abort building a document's link set.
#[derive(Debug)]
pub enum LinkError {
    /// The sandbox root could not be made absolute.
    AbsoluteRoot { path: PathBuf, source: io::Error },
    /// A resolved link target could not be made absolute.
    AbsoluteCandidate { path: PathBuf, source: io::Error },
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::AbsoluteRoot { path, source } => {
                write!(f, "abs root dir {}: {source}", path.display())
            }
            LinkError::AbsoluteCandidate { path, source } => {
                write!(f, "abs resolved path {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for LinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LinkError::AbsoluteRoot { source, .. } | LinkError::AbsoluteCandidate { source, .. } => {
                Some(source)
            }
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Trim whitespace and strip one layer of `<…>` destination delimiters.
pub fn normalize_href(href: &str) -> &str {
    let href = href.trim();
    href.strip_prefix('<')
        .and_then(|h| h.strip_suffix('>'))
        .unwrap_or(href)
}

/// Split on the first `#`: `(path, fragment)`. No `#` means an empty fragment.
pub fn split_fragment(href: &str) -> (&str, &str) {
    href.split_once('#').unwrap_or((href, ""))
}

/// Absolute in any of the senses a markdown author might write: POSIX root,
/// UNC share, drive letter, or whatever the host platform considers absolute.
pub fn is_absolute_or_unc(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with(r"\\") {
        return true;
    }
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return true;
    }
    Path::new(path).is_absolute()
}

/// Whether `href` names a local markdown document, before touching disk.
pub fn is_followable_href(href: &str) -> bool {
    is_followable_normalized(normalize_href(href))
}

/// [`is_followable_href`] for an href that has already been through
/// [`normalize_href`]. Normalizing twice would strip a second `<…>` layer.
fn is_followable_normalized(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    if href.contains("://") || lower.starts_with("mailto:") {
        return false;
    }

    let (path, _) = split_fragment(href);
    if is_absolute_or_unc(path) {
        return false;
    }

    let path_lower = path.to_ascii_lowercase();
    path_lower.ends_with(".md") || path_lower.ends_with(".markdown")
}

// ============================================================================
// Path helpers
// ============================================================================

/// Percent-decode a link path. `None` when an escape is malformed or the
/// decoded bytes are not UTF-8.
pub fn percent_decode_path(path: &str) -> Option<String> {
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let well_formed = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !well_formed {
                return None;
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    percent_decode_str(path)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// Lexically clean a path: drop `.`, let `..` consume the previous normal
/// component. `..` directly under the root stays at the root.
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Join `relative` under `base` and clean the result. Root and prefix
/// components of `relative` are ignored, so the join never jumps elsewhere.
pub fn join_clean(base: &Path, relative: &Path) -> PathBuf {
    let mut joined = base.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(_) | Component::CurDir | Component::ParentDir => {
                joined.push(component.as_os_str())
            }
            Component::RootDir | Component::Prefix(_) => {}
        }
    }
    clean(&joined)
}

/// `path` relative to `root`, compared component-wise so `/root-extra` is
/// never considered inside `/root`.
pub fn relative_to_root<'a>(root: &Path, path: &'a Path) -> Option<&'a Path> {
    let rel = path.strip_prefix(root).ok()?;
    if rel.components().any(|c| matches!(c, Component::ParentDir)) {
        return None;
    }
    Some(rel)
}

/// Human-readable form of `path` with the `root` prefix stripped.
pub fn strip_root(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => rel.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve `href` as written in the document at `current_path`.
///
/// Returns `Ok(None)` for anything that is not a followable local markdown
/// file inside `root`. The returned link has an empty label; callers fill it.
pub fn resolve_followable_link(
    fs: &impl FileSystem,
    root: &Path,
    current_path: &Path,
    href: &str,
) -> Result<Option<FollowableLink>, LinkError> {
    let href = normalize_href(href);
    if !is_followable_normalized(href) {
        debug!("Link not followable: {href:?}");
        return Ok(None);
    }

    let (path, fragment) = split_fragment(href);
    let path = path.trim();
    if path.is_empty() {
        return Ok(None);
    }

    let decoded = if path.contains('%') {
        percent_decode_path(path).unwrap_or_else(|| {
            debug!("Percent-decoding failed, using raw path: {path:?}");
            path.to_string()
        })
    } else {
        path.to_string()
    };

    let base = current_path.parent().unwrap_or_else(|| Path::new("."));
    let candidate = join_clean(base, Path::new(&decoded));

    let root_abs = fs.absolute(root).map_err(|source| LinkError::AbsoluteRoot {
        path: root.to_path_buf(),
        source,
    })?;
    let candidate_abs = fs
        .absolute(&candidate)
        .map_err(|source| LinkError::AbsoluteCandidate {
            path: candidate.clone(),
            source,
        })?;

    // Best effort: a missing target has nothing to evaluate and is
    // rejected by the existence check below.
    let root_eval = fs.canonicalize(&root_abs).unwrap_or(root_abs);
    let candidate_eval = fs.canonicalize(&candidate_abs).unwrap_or(candidate_abs);

    let Some(rel) = relative_to_root(&root_eval, &candidate_eval) else {
        debug!(
            "Link escapes root: {href:?} -> {} (root {})",
            candidate_eval.display(),
            root_eval.display()
        );
        return Ok(None);
    };
    let resolved_note = rel.display().to_string();

    match fs.is_regular_file(&candidate_eval) {
        Ok(true) => {}
        Ok(false) => {
            debug!("Link target is not a regular file: {}", candidate_eval.display());
            return Ok(None);
        }
        Err(e) => {
            debug!("Link target unavailable: {} ({e})", candidate_eval.display());
            return Ok(None);
        }
    }

    Ok(Some(FollowableLink {
        href: href.to_string(),
        path: decoded,
        fragment: fragment.to_string(),
        label: String::new(),
        resolved_path: candidate_eval,
        resolved_note,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    /// In-memory filesystem: a set of regular files, a set of directories and
    /// a symlink table (link path -> target path), all absolute.
    #[derive(Default)]
    struct FakeFs {
        files: HashSet<PathBuf>,
        dirs: HashSet<PathBuf>,
        symlinks: HashMap<PathBuf, PathBuf>,
        fail_absolute: bool,
    }

    impl FakeFs {
        fn with_files(files: &[&str]) -> Self {
            Self {
                files: files.iter().map(PathBuf::from).collect(),
                ..Default::default()
            }
        }

        /// Rewrite the longest symlinked prefix of `path`, repeatedly.
        fn eval(&self, path: &Path) -> PathBuf {
            let mut current = path.to_path_buf();
            for _ in 0..8 {
                let hit = current
                    .ancestors()
                    .find_map(|a| self.symlinks.get(a).map(|t| (a.to_path_buf(), t.clone())));
                match hit {
                    Some((link, target)) => {
                        let rest = current.strip_prefix(&link).unwrap().to_path_buf();
                        current = target.join(rest);
                    }
                    None => break,
                }
            }
            current
        }
    }

    impl FileSystem for FakeFs {
        fn absolute(&self, path: &Path) -> io::Result<PathBuf> {
            if self.fail_absolute {
                return Err(io::Error::other("no cwd"));
            }
            Ok(clean(&Path::new("/cwd").join(path)))
        }

        fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
            let evaluated = self.eval(path);
            if self.files.contains(&evaluated) || self.dirs.contains(&evaluated) {
                Ok(evaluated)
            } else {
                Err(io::Error::from(io::ErrorKind::NotFound))
            }
        }

        fn is_regular_file(&self, path: &Path) -> io::Result<bool> {
            let evaluated = self.eval(path);
            if self.files.contains(&evaluated) {
                Ok(true)
            } else if self.dirs.contains(&evaluated) {
                Ok(false)
            } else {
                Err(io::Error::from(io::ErrorKind::NotFound))
            }
        }
    }

    fn resolve(fs: &FakeFs, href: &str) -> Option<FollowableLink> {
        resolve_followable_link(fs, Path::new("/root"), Path::new("/root/current.md"), href)
            .expect("no hard error")
    }

    #[test]
    fn classifies_external_and_mailto() {
        assert!(!is_followable_href("https://example.com/a.md"));
        assert!(!is_followable_href("ftp://host/a.md"));
        assert!(!is_followable_href("MAILTO:someone@example.com"));
        assert!(is_followable_href("docs/a.md"));
    }

    #[test]
    fn classifies_absolute_forms() {
        assert!(is_absolute_or_unc("/etc/passwd.md"));
        assert!(is_absolute_or_unc(r"\\server\share\a.md"));
        assert!(is_absolute_or_unc(r"C:\Windows\a.md"));
        assert!(is_absolute_or_unc("c:relative.md"));
        assert!(!is_absolute_or_unc("docs/a.md"));
        assert!(!is_followable_href(r"C:\Windows\system32\a.md"));
    }

    #[test]
    fn classifies_extension_case_insensitively() {
        assert!(is_followable_href("A.MD"));
        assert!(is_followable_href("notes.Markdown#top"));
        assert!(!is_followable_href("docs/a.txt"));
        assert!(!is_followable_href("docs/a.md.txt"));
        assert!(!is_followable_href("#section"));
    }

    #[test]
    fn normalize_strips_one_angle_layer() {
        assert_eq!(normalize_href("  <docs/a.md> "), "docs/a.md");
        assert_eq!(normalize_href("<<a.md>>"), "<a.md>");
        assert_eq!(normalize_href("<a.md"), "<a.md");
    }

    #[test]
    fn fragment_split_on_first_hash() {
        assert_eq!(split_fragment("a.md#x#y"), ("a.md", "x#y"));
        assert_eq!(split_fragment("a.md"), ("a.md", ""));
    }

    #[test]
    fn percent_decoding() {
        assert_eq!(percent_decode_path("SPACE%20NAME.md").as_deref(), Some("SPACE NAME.md"));
        assert_eq!(percent_decode_path("bad%zz.md"), None);
        assert_eq!(percent_decode_path("trailing%2"), None);
        assert_eq!(percent_decode_path("%FF.md"), None);
    }

    #[test]
    fn clean_collapses_dots() {
        assert_eq!(clean(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(clean(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(clean(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(clean(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn join_ignores_root_of_relative_part() {
        assert_eq!(
            join_clean(Path::new("/root/docs"), Path::new("/etc/x.md")),
            PathBuf::from("/root/docs/etc/x.md")
        );
        assert_eq!(
            join_clean(Path::new("/root/docs"), Path::new("../a.md")),
            PathBuf::from("/root/a.md")
        );
    }

    #[test]
    fn relative_to_root_is_component_wise() {
        assert!(relative_to_root(Path::new("/root"), Path::new("/root-extra/a.md")).is_none());
        assert_eq!(
            relative_to_root(Path::new("/root"), Path::new("/root/docs/a.md")),
            Some(Path::new("docs/a.md"))
        );
    }

    #[test]
    fn resolves_relative_link_with_fragment() {
        let fs = FakeFs::with_files(&["/root/docs/target.md"]);
        let link = resolve(&fs, "docs/target.md#section").unwrap();
        assert_eq!(link.resolved_path, PathBuf::from("/root/docs/target.md"));
        assert_eq!(link.resolved_note, "docs/target.md");
        assert_eq!(link.fragment, "section");
        assert_eq!(link.path, "docs/target.md");
        assert_eq!(link.href, "docs/target.md#section");
    }

    #[test]
    fn decodes_before_resolving() {
        let fs = FakeFs::with_files(&["/root/docs/SPACE NAME.md"]);
        let link = resolve(&fs, "docs/SPACE%20NAME.md").unwrap();
        assert_eq!(link.resolved_note, "docs/SPACE NAME.md");
    }

    #[test]
    fn malformed_escape_falls_back_to_raw_path() {
        let fs = FakeFs::with_files(&["/root/100%.md"]);
        let link = resolve(&fs, "100%.md").unwrap();
        assert_eq!(link.path, "100%.md");
    }

    #[test]
    fn nested_angle_brackets_keep_inner_layer_in_path() {
        let fs = FakeFs::with_files(&["/root/<a.md>", "/root/a.md"]);
        assert!(resolve(&fs, "<<a.md>>").is_none());
        assert!(resolve(&fs, "<a.md>").is_some());
    }

    #[test]
    fn rejects_traversal_outside_root() {
        let fs = FakeFs::with_files(&["/outside/outside.md"]);
        assert!(resolve(&fs, "../outside/outside.md").is_none());
    }

    #[test]
    fn rejects_sibling_directory_with_shared_prefix() {
        let fs = FakeFs::with_files(&["/root-extra/a.md"]);
        assert!(resolve(&fs, "../root-extra/a.md").is_none());
    }

    #[test]
    fn rejects_symlink_escape() {
        let mut fs = FakeFs::with_files(&["/outside/outside.md"]);
        fs.symlinks
            .insert(PathBuf::from("/root/escape"), PathBuf::from("/outside"));
        assert!(resolve(&fs, "escape/outside.md").is_none());
    }

    #[test]
    fn follows_symlink_that_stays_inside_root() {
        let mut fs = FakeFs::with_files(&["/root/real/a.md"]);
        fs.symlinks
            .insert(PathBuf::from("/root/alias"), PathBuf::from("/root/real"));
        let link = resolve(&fs, "alias/a.md").unwrap();
        assert_eq!(link.resolved_path, PathBuf::from("/root/real/a.md"));
        assert_eq!(link.resolved_note, "real/a.md");
    }

    #[test]
    fn rejects_missing_and_directories() {
        let mut fs = FakeFs::default();
        fs.dirs.insert(PathBuf::from("/root/docs/dir.md"));
        assert!(resolve(&fs, "docs/missing.md").is_none());
        assert!(resolve(&fs, "docs/dir.md").is_none());
    }

    #[test]
    fn absolute_failure_is_a_hard_error() {
        let fs = FakeFs {
            fail_absolute: true,
            ..FakeFs::with_files(&["/root/a.md"])
        };
        let err = resolve_followable_link(&fs, Path::new("root"), Path::new("root/x.md"), "a.md")
            .unwrap_err();
        assert!(matches!(err, LinkError::AbsoluteRoot { .. }));
        assert!(err.to_string().starts_with("abs root dir"));
    }

    #[test]
    fn rejected_hrefs_never_reach_the_filesystem() {
        let fs = FakeFs {
            fail_absolute: true,
            ..Default::default()
        };
        let result =
            resolve_followable_link(&fs, Path::new("/root"), Path::new("/root/c.md"), "https://x/a.md");
        assert!(matches!(result, Ok(None)));
    }
}
