//! # Core Pager Logic
//!
//! Everything mdwalk knows about documents and links.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌──────────────────────────────┐
//!                    │            CORE              │
//!                    │                              │
//!                    │  • links (extract, resolve)  │
//!                    │  • highlight (ANSI-aware)    │
//!                    │  • history (follow / back)   │
//!                    │  • state + action (reducer)  │
//!                    │                              │
//!                    │  No terminal. No UI.         │
//!                    └──────────────┬───────────────┘
//!                                   │ Effect
//!                                   ▼
//!                            ┌────────────┐
//!                            │    TUI     │  load, render, watch
//!                            │  Adapter   │  ──► Action back in
//!                            │ (ratatui)  │
//!                            └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `Pager` struct, all pager state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`links`]: Followable-link discovery and sandboxed resolution
//! - [`highlight`]: Reverse-video marking of the focused link
//! - [`history`]: Navigation stack
//! - [`document`]: Loading markdown files
//! - [`config`]: Layered settings

pub mod action;
pub mod config;
pub mod document;
pub mod highlight;
pub mod history;
pub mod links;
pub mod state;
