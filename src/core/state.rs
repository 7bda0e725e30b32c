//! # Pager State
//!
//! Everything the pager knows, owned by one event loop and changed only
//! through `update(state, action)` in action.rs.
//!
//! ```text
//! Pager
//! ├── root: PathBuf                 // sandbox for followable links
//! ├── document: Option<Document>    // what is on screen
//! ├── rendered: String              // renderer output (ANSI)
//! ├── content: String               // rendered + focused-link highlight
//! ├── links: LinkRegistry           // followable links of `rendered`
//! ├── focused: Option<usize>        // index into `links`
//! ├── history: History              // follow/back stack
//! ├── pending_restore: Option<u16>  // scroll to apply after the next render
//! ├── scroll_offset / viewport_*    // viewport geometry
//! ├── status: Option<StatusMessage> // transient status bar text
//! └── show_help: bool
//! ```

use std::path::{Path, PathBuf};

use super::config::ResolvedConfig;
use super::document::Document;
use super::highlight::highlight_focused_link;
use super::history::History;
use super::links::{FollowableLink, LinkRegistry};

/// Transient status bar text. `id` lets a timeout clear exactly the message
/// it was started for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub id: u64,
    pub text: String,
    pub is_error: bool,
}

pub struct Pager {
    pub root: PathBuf,
    pub document: Option<Document>,
    pub rendered: String,
    pub content: String,
    pub links: LinkRegistry,
    pub focused: Option<usize>,
    pub history: History,
    pub pending_restore: Option<u16>,
    /// Path of the most recent load request still in flight. Results for
    /// any other path are stale.
    pub pending_load: Option<PathBuf>,
    pub scroll_offset: u16,
    pub viewport_width: u16,
    pub viewport_height: u16,
    pub status: Option<StatusMessage>,
    pub show_help: bool,
    /// Render with a line-number gutter.
    pub line_numbers: bool,
    /// Word-wrap cap; 0 wraps at the viewport width.
    pub max_width: u16,
    /// Watch the document's directory and reload on change.
    pub watch: bool,
    next_status_id: u64,
}

impl Pager {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            document: None,
            rendered: String::new(),
            content: String::new(),
            links: LinkRegistry::default(),
            focused: None,
            history: History::new(),
            pending_restore: None,
            pending_load: None,
            scroll_offset: 0,
            viewport_width: 0,
            viewport_height: 0,
            status: None,
            show_help: false,
            line_numbers: false,
            max_width: 0,
            watch: true,
            next_status_id: 0,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            line_numbers: config.show_line_numbers,
            max_width: config.max_width,
            watch: config.watch,
            ..Self::new(config.root_dir.clone())
        }
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.document.as_ref().map(|d| d.local_path.as_path())
    }

    pub fn focused_link(&self) -> Option<&FollowableLink> {
        self.focused.and_then(|i| self.links.get(i))
    }

    /// Recompute the displayed content from the rendered text and focus.
    pub fn apply_rendered_content(&mut self) {
        self.content = match self.focused {
            Some(_) => highlight_focused_link(&self.rendered, &self.links, self.focused),
            None => self.rendered.clone(),
        };
    }

    /// Show `text` in the status bar, replacing any current message.
    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) -> u64 {
        self.next_status_id += 1;
        self.status = Some(StatusMessage {
            id: self.next_status_id,
            text: text.into(),
            is_error,
        });
        self.next_status_id
    }

    // ── Scrolling ───────────────────────────────────────────────────────

    pub fn content_height(&self) -> u16 {
        u16::try_from(self.content.lines().count()).unwrap_or(u16::MAX)
    }

    pub fn max_scroll(&self) -> u16 {
        self.content_height().saturating_sub(self.viewport_height)
    }

    pub fn scroll_to(&mut self, offset: u16) {
        self.scroll_offset = offset.min(self.max_scroll());
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let target = (i32::from(self.scroll_offset) + delta).clamp(0, i32::from(u16::MAX));
        self.scroll_to(target as u16);
    }

    /// 0.0 at the top, 1.0 at the bottom (or when everything fits).
    pub fn scroll_percent(&self) -> f64 {
        let max = self.max_scroll();
        if max == 0 {
            return 1.0;
        }
        f64::from(self.scroll_offset) / f64::from(max)
    }

    /// Width the renderer should wrap at.
    pub fn wrap_width(&self) -> u16 {
        if self.max_width == 0 {
            self.viewport_width
        } else {
            self.max_width.min(self.viewport_width)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{registry, test_pager};

    #[test]
    fn new_pager_has_no_focus_or_history() {
        let pager = Pager::new(PathBuf::from("/root"));
        assert!(pager.focused.is_none());
        assert!(pager.history.is_empty());
        assert!(pager.document.is_none());
        assert!(pager.links.is_empty());
    }

    #[test]
    fn status_ids_increase() {
        let mut pager = test_pager();
        let first = pager.set_status("one", false);
        let second = pager.set_status("two", true);
        assert!(second > first);
        assert_eq!(pager.status.as_ref().unwrap().text, "two");
        assert!(pager.status.as_ref().unwrap().is_error);
    }

    #[test]
    fn scrolling_is_clamped() {
        let mut pager = test_pager();
        pager.content = (0..25).map(|i| format!("line {i}\n")).collect();
        assert_eq!(pager.max_scroll(), 15);

        pager.scroll_by(100);
        assert_eq!(pager.scroll_offset, 15);
        assert_eq!(pager.scroll_percent(), 1.0);
        pager.scroll_by(-100);
        assert_eq!(pager.scroll_offset, 0);
    }

    #[test]
    fn apply_rendered_content_highlights_focus() {
        let mut pager = test_pager();
        pager.rendered = "a b".to_string();
        pager.links = registry(&["b"]);
        pager.focused = Some(0);
        pager.apply_rendered_content();
        assert_eq!(pager.content, "a \x1b[7mb\x1b[27m");

        pager.focused = None;
        pager.apply_rendered_content();
        assert_eq!(pager.content, "a b");
    }

    #[test]
    fn wrap_width_respects_cap() {
        let mut pager = test_pager();
        pager.max_width = 60;
        assert_eq!(pager.wrap_width(), 60);
        pager.max_width = 0;
        assert_eq!(pager.wrap_width(), 80);
    }
}
