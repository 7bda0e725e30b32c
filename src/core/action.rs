//! # Actions
//!
//! Everything that can happen in the pager becomes an `Action`.
//! User presses Tab? That's `Action::FocusNext`.
//! A background render finishes? That's `Action::ContentRendered(doc)`.
//!
//! `update()` applies an action to the [`Pager`] and returns the one
//! [`Effect`] the adapter must carry out. No I/O happens here.
//!
//! ```text
//! Pager + Action  →  update()  →  Pager' + Effect
//!                                            │
//!              Load / Render / Watch ◄───────┘  (done by the TUI, reported
//!                                                back as further Actions)
//! ```

use std::path::PathBuf;

use log::{debug, info};

use super::document::{Document, LoadRequest};
use super::links::LinkRegistry;
use super::state::Pager;

/// Status text when Enter is pressed with nothing focused.
pub const STATUS_SELECT_LINK: &str = "Tab to select a link";
pub const STATUS_NO_LINKS: &str = "No followable links";
pub const STATUS_NO_HISTORY: &str = "No previous document";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Start showing a document (initial open).
    Open(LoadRequest),
    FocusNext,
    FocusPrev,
    /// Open the focused link.
    Follow,
    /// Return to the previous document.
    Back,

    ScrollUp(u16),
    ScrollDown(u16),
    HalfPageUp,
    HalfPageDown,
    PageUp,
    PageDown,
    ScrollTop,
    ScrollBottom,
    /// Viewport size changed (content area, not the whole terminal).
    Resize { width: u16, height: u16 },

    DocumentLoaded(Document),
    ContentRendered(RenderedDocument),
    /// Reading or rendering the document at `path` failed.
    LoadFailed { path: PathBuf, message: String },
    /// Something on disk at this path was created or written.
    FileChanged(PathBuf),
    Reload,
    Unload,

    ToggleHelp,
    /// Esc / q: clears a visible status message, otherwise quits.
    Dismiss,
    ClearStatus(u64),
    Quit,
}

/// What the adapter should do after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Load(LoadRequest),
    Render(RenderRequest),
    /// Watch `dir` for changes to `file`, replacing any earlier watch.
    Watch { dir: PathBuf, file: PathBuf },
    StopWatching,
    Quit,
}

/// Input to the renderer plus the link scan that runs alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub path: PathBuf,
    pub body: String,
    pub root: PathBuf,
    pub width: u16,
    pub line_numbers: bool,
}

/// Renderer output for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    /// Document the render was requested for.
    pub path: PathBuf,
    pub text: String,
    pub links: LinkRegistry,
}

pub fn update(pager: &mut Pager, action: Action) -> Effect {
    let effect = apply(pager, action);
    if let Effect::Load(request) = &effect {
        pager.pending_load = Some(request.path.clone());
    }
    effect
}

fn apply(pager: &mut Pager, action: Action) -> Effect {
    match action {
        Action::Open(request) => Effect::Load(request),

        Action::FocusNext => {
            if pager.links.is_empty() {
                pager.set_status(STATUS_NO_LINKS, false);
                return Effect::None;
            }
            pager.focused = Some(match pager.focused {
                Some(i) if i + 1 < pager.links.len() => i + 1,
                _ => 0,
            });
            on_focus_changed(pager);
            Effect::None
        }

        Action::FocusPrev => {
            if pager.links.is_empty() {
                pager.set_status(STATUS_NO_LINKS, false);
                return Effect::None;
            }
            let last = pager.links.len() - 1;
            pager.focused = Some(match pager.focused {
                Some(i) if i > 0 && i <= last => i - 1,
                _ => last,
            });
            on_focus_changed(pager);
            Effect::None
        }

        Action::Follow => {
            let Some(index) = pager.focused else {
                if !pager.links.is_empty() {
                    pager.set_status(STATUS_SELECT_LINK, false);
                }
                return Effect::None;
            };
            let Some(link) = pager.links.get(index).cloned() else {
                return Effect::None;
            };
            if link.resolved_path.as_os_str().is_empty() {
                return Effect::None;
            }

            if let Some(doc) = &pager.document {
                pager.history.push(doc.local_path.clone(), pager.scroll_offset);
            }
            info!("Following link to {}", link.resolved_path.display());
            pager.focused = None;
            pager.pending_restore = None;
            pager.scroll_offset = 0;
            pager.apply_rendered_content();
            Effect::Load(LoadRequest {
                path: link.resolved_path,
                note: link.resolved_note,
            })
        }

        Action::Back => {
            let Some(entry) = pager.history.pop() else {
                pager.set_status(STATUS_NO_HISTORY, false);
                return Effect::None;
            };
            info!("Back to {}", entry.path.display());
            pager.focused = None;
            pager.pending_restore = Some(entry.scroll_offset);
            pager.scroll_offset = 0;
            pager.apply_rendered_content();
            Effect::Load(LoadRequest::new(entry.path, &pager.root))
        }

        Action::ScrollUp(n) => {
            pager.scroll_by(-i32::from(n));
            Effect::None
        }
        Action::ScrollDown(n) => {
            pager.scroll_by(i32::from(n));
            Effect::None
        }
        Action::HalfPageUp => {
            pager.scroll_by(-i32::from(half_page(pager)));
            Effect::None
        }
        Action::HalfPageDown => {
            pager.scroll_by(i32::from(half_page(pager)));
            Effect::None
        }
        Action::PageUp => {
            pager.scroll_by(-i32::from(pager.viewport_height.max(1)));
            Effect::None
        }
        Action::PageDown => {
            pager.scroll_by(i32::from(pager.viewport_height.max(1)));
            Effect::None
        }
        Action::ScrollTop => {
            pager.scroll_to(0);
            Effect::None
        }
        Action::ScrollBottom => {
            pager.scroll_to(u16::MAX);
            Effect::None
        }

        Action::Resize { width, height } => {
            let width_changed = width != pager.viewport_width;
            pager.viewport_width = width;
            pager.viewport_height = height;
            pager.scroll_to(pager.scroll_offset);
            if width_changed && pager.document.is_some() {
                if let Some(request) = render_request(pager) {
                    return Effect::Render(request);
                }
            }
            Effect::None
        }

        Action::DocumentLoaded(doc) => {
            if pager.pending_load.as_deref() != Some(doc.local_path.as_path()) {
                debug!("Dropping stale load of {}", doc.local_path.display());
                return Effect::None;
            }
            pager.pending_load = None;
            debug!("Document loaded: {}", doc.local_path.display());
            pager.document = Some(doc);
            render_request(pager).map_or(Effect::None, Effect::Render)
        }

        Action::ContentRendered(rendered) => {
            if pager.current_path() != Some(rendered.path.as_path()) {
                debug!(
                    "Dropping stale render for {}",
                    rendered.path.display()
                );
                return Effect::None;
            }
            pager.rendered = rendered.text;
            pager.links = rendered.links;
            if pager.focused.is_some_and(|i| i >= pager.links.len()) {
                pager.focused = None;
            }
            pager.apply_rendered_content();
            match pager.pending_restore.take() {
                Some(offset) => pager.scroll_to(offset),
                None => pager.scroll_to(pager.scroll_offset),
            }

            if pager.watch {
                let file = rendered.path;
                if let Some(dir) = file.parent().map(|p| p.to_path_buf()) {
                    return Effect::Watch { dir, file };
                }
            }
            Effect::None
        }

        Action::LoadFailed { path, message } => {
            // A render failure arrives after its load completed.
            let current = match &pager.pending_load {
                Some(pending) => *pending == path,
                None => pager.current_path() == Some(path.as_path()),
            };
            if !current {
                debug!("Dropping stale failure for {}", path.display());
                return Effect::None;
            }
            pager.pending_load = None;
            pager.pending_restore = None;
            pager.set_status(message, true);
            Effect::None
        }

        Action::FileChanged(path) => match &pager.document {
            Some(doc) if doc.local_path == path && pager.pending_load.is_none() => {
                debug!("Reloading changed file {}", path.display());
                Effect::Load(LoadRequest {
                    path,
                    note: doc.note.clone(),
                })
            }
            _ => Effect::None,
        },

        Action::Reload => match &pager.document {
            Some(doc) => Effect::Load(LoadRequest {
                path: doc.local_path.clone(),
                note: doc.note.clone(),
            }),
            None => Effect::None,
        },

        Action::Unload => {
            pager.document = None;
            pager.rendered.clear();
            pager.content.clear();
            pager.links = LinkRegistry::default();
            pager.focused = None;
            pager.history.clear();
            pager.pending_restore = None;
            pager.pending_load = None;
            pager.scroll_offset = 0;
            pager.status = None;
            pager.show_help = false;
            Effect::StopWatching
        }

        Action::ToggleHelp => {
            pager.show_help = !pager.show_help;
            Effect::None
        }

        Action::Dismiss => {
            if pager.status.take().is_some() {
                Effect::None
            } else {
                Effect::Quit
            }
        }

        Action::ClearStatus(id) => {
            if pager.status.as_ref().is_some_and(|s| s.id == id) {
                pager.status = None;
            }
            Effect::None
        }

        Action::Quit => Effect::Quit,
    }
}

fn half_page(pager: &Pager) -> u16 {
    (pager.viewport_height / 2).max(1)
}

/// Re-highlight and announce the newly focused link.
fn on_focus_changed(pager: &mut Pager) {
    pager.apply_rendered_content();
    if let Some(note) = pager.focused_link().map(|l| l.resolved_note.clone()) {
        pager.set_status(format!("Open: {note}"), false);
    }
}

fn render_request(pager: &Pager) -> Option<RenderRequest> {
    let doc = pager.document.as_ref()?;
    Some(RenderRequest {
        path: doc.local_path.clone(),
        body: doc.body.clone(),
        root: pager.root.clone(),
        width: pager.wrap_width(),
        line_numbers: pager.line_numbers,
    })
}
