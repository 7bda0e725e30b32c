//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into core::Action values, and carries out the
//! `Effect`s the core asks for.
//!
//! ```text
//!  keys ──► TuiEvent ──► Action ──► update() ──► Effect
//!                          ▲                       │
//!                          │  mpsc::Sender<Action> ▼
//!                     ┌────┴───────────────────────────────┐
//!                     │ spawn_blocking: load / render+links │
//!                     │ tokio::spawn:   watch forwarding    │
//!                     └────────────────────────────────────┘
//! ```
//!
//! ## Redraw Strategy
//!
//! Nothing animates, so the loop sleeps up to 500ms (or until the pending
//! status message expires) and only redraws after input, background results
//! or a terminal resize.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;
pub mod watch;

use std::io::stdout;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use log::{debug, info, warn};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;

use crate::core::action::{Action, Effect, RenderRequest, RenderedDocument, update};
use crate::core::config::ResolvedConfig;
use crate::core::document::{self, LoadRequest};
use crate::core::links::{RealFs, followable_links_for_document};
use crate::core::state::Pager;
use crate::tui::components::DocumentViewState;
use crate::tui::event::{poll_event_immediate, poll_event_timeout};
use crate::tui::watch::DirWatcher;

const IDLE_POLL: Duration = Duration::from_millis(500);

/// TUI-specific presentation state (not part of core pager logic)
pub struct TuiState {
    pub document: DocumentViewState,
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            document: DocumentViewState::new(),
        }
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), EnableMouseCapture, Hide)?;
        info!("Terminal modes enabled (mouse wheel, hidden cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, Show);
    }
}

/// Carries out effects on behalf of the event loop.
struct Executor {
    tx: mpsc::Sender<Action>,
    watcher: DirWatcher,
}

impl Executor {
    /// Returns true when the pager should exit.
    fn run(&mut self, effect: Effect) -> bool {
        match effect {
            Effect::None => {}
            Effect::Quit => return true,
            Effect::Load(request) => spawn_load(request, self.tx.clone()),
            Effect::Render(request) => spawn_render(request, self.tx.clone()),
            Effect::Watch { dir, file } => {
                if let Err(e) = self.watcher.start(&dir, &file, self.tx.clone()) {
                    warn!("Could not watch {}: {}", dir.display(), e);
                }
            }
            Effect::StopWatching => self.watcher.stop(),
        }
        false
    }
}

/// Deadline for clearing the current (non-error) status message.
struct StatusTimer {
    timeout: Duration,
    armed: Option<(u64, Instant)>,
}

impl StatusTimer {
    /// Arm for a newly shown message, disarm when it is gone.
    fn track(&mut self, pager: &Pager) {
        match &pager.status {
            Some(status) if status.is_error => self.armed = None,
            Some(status) => {
                if self.armed.map(|(id, _)| id) != Some(status.id) {
                    self.armed = Some((status.id, Instant::now() + self.timeout));
                }
            }
            None => self.armed = None,
        }
    }

    fn expired(&mut self, now: Instant) -> Option<u64> {
        match self.armed {
            Some((id, deadline)) if now >= deadline => {
                self.armed = None;
                Some(id)
            }
            _ => None,
        }
    }

    fn poll_timeout(&self, now: Instant) -> Duration {
        match self.armed {
            Some((_, deadline)) => deadline.saturating_duration_since(now).min(IDLE_POLL),
            None => IDLE_POLL,
        }
    }
}

pub fn run(config: ResolvedConfig, file: PathBuf) -> std::io::Result<()> {
    let mut terminal = ratatui::init();
    let guard = TerminalModeGuard::new();
    if let Err(e) = &guard {
        warn!("Could not enable terminal modes: {}", e);
    }

    let result = event_loop(&mut terminal, &config, file);

    drop(guard);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    config: &ResolvedConfig,
    file: PathBuf,
) -> std::io::Result<()> {
    let mut pager = Pager::from_config(config);
    let mut tui = TuiState::new();
    let (tx, rx) = mpsc::channel();
    let mut executor = Executor {
        tx,
        watcher: DirWatcher::new(),
    };
    let mut timer = StatusTimer {
        timeout: config.status_timeout,
        armed: None,
    };

    // Size the viewport before the first render so wrapping uses it.
    sync_viewport(terminal, &mut pager, &mut executor)?;
    let open = Action::Open(LoadRequest::new(file, &pager.root));
    let mut should_quit = executor.run(update(&mut pager, open));
    let mut needs_redraw = true;

    while !should_quit {
        needs_redraw |= sync_viewport(terminal, &mut pager, &mut executor)?;

        if let Some(id) = timer.expired(Instant::now()) {
            update(&mut pager, Action::ClearStatus(id));
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &pager, &mut tui))?;
            needs_redraw = false;
        }

        // Process first event + drain pending events before the next draw
        let first_event = poll_event_timeout(timer.poll_timeout(Instant::now()));
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            needs_redraw = true;
            let Some(action) = event.to_action() else {
                continue;
            };
            if executor.run(update(&mut pager, action)) {
                should_quit = true;
                break;
            }
        }

        // Results from background tasks
        while !should_quit && let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {}", describe(&action));
            should_quit = executor.run(update(&mut pager, action));
        }

        timer.track(&pager);
    }

    unload(&mut pager, &mut executor);
    info!("mdwalk exiting");
    Ok(())
}

/// Drop the document and stop watching before the terminal is restored.
fn unload(pager: &mut Pager, executor: &mut Executor) {
    executor.run(update(pager, Action::Unload));
}

/// Keep the pager's viewport equal to the content area. Returns true when it
/// changed.
fn sync_viewport(
    terminal: &DefaultTerminal,
    pager: &mut Pager,
    executor: &mut Executor,
) -> std::io::Result<bool> {
    let size = terminal.size()?;
    let content = ui::layout(Rect::new(0, 0, size.width, size.height), pager.show_help).content;
    if (content.width, content.height) == (pager.viewport_width, pager.viewport_height) {
        return Ok(false);
    }
    let effect = update(
        pager,
        Action::Resize {
            width: content.width,
            height: content.height,
        },
    );
    executor.run(effect);
    Ok(true)
}

/// Short log form; documents and renders are too large to log whole.
fn describe(action: &Action) -> String {
    match action {
        Action::DocumentLoaded(doc) => format!("DocumentLoaded({})", doc.local_path.display()),
        Action::ContentRendered(r) => format!(
            "ContentRendered({}, {} links)",
            r.path.display(),
            r.links.len()
        ),
        other => format!("{other:?}"),
    }
}

fn spawn_load(request: LoadRequest, tx: mpsc::Sender<Action>) {
    info!("Loading {}", request.path.display());
    tokio::task::spawn_blocking(move || {
        let action = match document::load(&request) {
            Ok(doc) => Action::DocumentLoaded(doc),
            Err(e) => {
                warn!("{}", e);
                Action::LoadFailed {
                    path: request.path.clone(),
                    message: e.to_string(),
                }
            }
        };
        if tx.send(action).is_err() {
            warn!("Failed to deliver load result for {}: receiver dropped", request.path.display());
        }
    });
}

fn spawn_render(request: RenderRequest, tx: mpsc::Sender<Action>) {
    debug!("Rendering {} at width {}", request.path.display(), request.width);
    tokio::task::spawn_blocking(move || {
        let action = render_document(&request);
        if tx.send(action).is_err() {
            warn!("Failed to deliver render for {}: receiver dropped", request.path.display());
        }
    });
}

/// Render markdown and collect its followable links in one pass.
fn render_document(request: &RenderRequest) -> Action {
    let text = markdown::render(&request.body, request.width, request.line_numbers);
    match followable_links_for_document(&RealFs, &request.root, &request.path, &request.body) {
        Ok(links) => Action::ContentRendered(RenderedDocument {
            path: request.path.clone(),
            text,
            links,
        }),
        Err(e) => {
            warn!("Link resolution failed for {}: {}", request.path.display(), e);
            Action::LoadFailed {
                path: request.path.clone(),
                message: e.to_string(),
            }
        }
    }
}
