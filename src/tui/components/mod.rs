//! # TUI Components
//!
//! Stateless, props-based pieces of the pager screen:
//!
//! ```text
//! ┌──────────────────────────────────┐
//! │ DocumentView                     │  rendered markdown, scrolled
//! │                                  │
//! ├──────────────────────────────────┤
//! │ HelpView (while `?` is on)       │
//! ├──────────────────────────────────┤
//! │ StatusBar                        │  logo · note/status · % · hint
//! └──────────────────────────────────┘
//! ```
//!
//! Each file holds the component, its helpers and its `TestBackend` tests.

mod document_view;
mod help;
mod status_bar;

pub use document_view::{DocumentView, DocumentViewState};
pub use help::{HelpView, help_height};
pub use status_bar::StatusBar;
