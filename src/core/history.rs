//! Navigation history: where the user came from, and how far down they were.

use std::path::PathBuf;

/// A document the user left by following a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub path: PathBuf,
    pub scroll_offset: u16,
}

/// LIFO stack of [`NavEntry`]. Unbounded; cleared when the pager unloads.
#[derive(Debug, Default, Clone)]
pub struct History {
    entries: Vec<NavEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: PathBuf, scroll_offset: u16) {
        self.entries.push(NavEntry {
            path,
            scroll_offset,
        });
    }

    pub fn pop(&mut self) -> Option<NavEntry> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<&NavEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_reverse_order() {
        let mut history = History::new();
        history.push(PathBuf::from("/a.md"), 3);
        history.push(PathBuf::from("/b.md"), 7);

        assert_eq!(history.len(), 2);
        assert_eq!(history.peek().unwrap().path, PathBuf::from("/b.md"));
        assert_eq!(
            history.pop(),
            Some(NavEntry {
                path: PathBuf::from("/b.md"),
                scroll_offset: 7
            })
        );
        assert_eq!(history.pop().unwrap().scroll_offset, 3);
        assert!(history.pop().is_none());
    }

    #[test]
    fn clear_empties() {
        let mut history = History::new();
        history.push(PathBuf::from("/a.md"), 0);
        history.clear();
        assert!(history.is_empty());
    }
}
