use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};

use crate::core::action::Action;

/// Lines moved per arrow key / wheel notch.
const LINE_STEP: u16 = 1;
const WHEEL_STEP: u16 = 3;

/// TUI-specific input events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiEvent {
    ForceQuit,
    Dismiss,

    LineUp(u16),
    LineDown(u16),
    HalfPageUp,
    HalfPageDown,
    PageUp,
    PageDown,
    Top,
    Bottom,

    FocusNext,
    FocusPrev,
    Follow,
    Back,
    Reload,
    ToggleHelp,

    /// Terminal size changed; only needs a redraw.
    Resize,
}

impl TuiEvent {
    /// The core action this input stands for, if any.
    pub fn to_action(self) -> Option<Action> {
        Some(match self {
            TuiEvent::ForceQuit => Action::Quit,
            TuiEvent::Dismiss => Action::Dismiss,
            TuiEvent::LineUp(n) => Action::ScrollUp(n),
            TuiEvent::LineDown(n) => Action::ScrollDown(n),
            TuiEvent::HalfPageUp => Action::HalfPageUp,
            TuiEvent::HalfPageDown => Action::HalfPageDown,
            TuiEvent::PageUp => Action::PageUp,
            TuiEvent::PageDown => Action::PageDown,
            TuiEvent::Top => Action::ScrollTop,
            TuiEvent::Bottom => Action::ScrollBottom,
            TuiEvent::FocusNext => Action::FocusNext,
            TuiEvent::FocusPrev => Action::FocusPrev,
            TuiEvent::Follow => Action::Follow,
            TuiEvent::Back => Action::Back,
            TuiEvent::Reload => Action::Reload,
            TuiEvent::ToggleHelp => Action::ToggleHelp,
            TuiEvent::Resize => return None,
        })
    }
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(Duration::ZERO)
}

/// Wait up to `timeout` for an input event we care about.
pub fn poll_event_timeout(timeout: Duration) -> Option<TuiEvent> {
    if !event::poll(timeout).ok()? {
        return None;
    }
    match event::read().ok()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            log::debug!("Key event: {:?} with modifiers {:?}", key.code, key.modifiers);
            map_key(key)
        }
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => Some(TuiEvent::LineUp(WHEEL_STEP)),
            MouseEventKind::ScrollDown => Some(TuiEvent::LineDown(WHEEL_STEP)),
            _ => None,
        },
        Event::Resize(..) => Some(TuiEvent::Resize),
        _ => None,
    }
}

pub fn map_key(key: KeyEvent) -> Option<TuiEvent> {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(TuiEvent::ForceQuit),
        (_, KeyCode::Char('q')) | (_, KeyCode::Esc) => Some(TuiEvent::Dismiss),

        (_, KeyCode::Char('k')) | (_, KeyCode::Up) => Some(TuiEvent::LineUp(LINE_STEP)),
        (_, KeyCode::Char('j')) | (_, KeyCode::Down) => Some(TuiEvent::LineDown(LINE_STEP)),
        (_, KeyCode::Char('u')) => Some(TuiEvent::HalfPageUp),
        (_, KeyCode::Char('d')) => Some(TuiEvent::HalfPageDown),
        (_, KeyCode::Char('b')) | (_, KeyCode::PageUp) => Some(TuiEvent::PageUp),
        (_, KeyCode::Char('f')) | (_, KeyCode::Char(' ')) | (_, KeyCode::PageDown) => {
            Some(TuiEvent::PageDown)
        }
        (_, KeyCode::Char('g')) | (_, KeyCode::Home) => Some(TuiEvent::Top),
        (_, KeyCode::Char('G')) | (_, KeyCode::End) => Some(TuiEvent::Bottom),

        (_, KeyCode::BackTab) => Some(TuiEvent::FocusPrev),
        (_, KeyCode::Tab) => Some(TuiEvent::FocusNext),
        (_, KeyCode::Enter) => Some(TuiEvent::Follow),
        (_, KeyCode::Backspace) => Some(TuiEvent::Back),
        (_, KeyCode::Char('r')) => Some(TuiEvent::Reload),
        (_, KeyCode::Char('?')) => Some(TuiEvent::ToggleHelp),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn navigation_keys() {
        assert_eq!(map_key(key(KeyCode::Tab)), Some(TuiEvent::FocusNext));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Some(TuiEvent::FocusPrev)
        );
        assert_eq!(map_key(key(KeyCode::Enter)), Some(TuiEvent::Follow));
        assert_eq!(map_key(key(KeyCode::Backspace)), Some(TuiEvent::Back));
    }

    #[test]
    fn scrolling_keys() {
        assert_eq!(map_key(key(KeyCode::Char('j'))), Some(TuiEvent::LineDown(1)));
        assert_eq!(map_key(key(KeyCode::Up)), Some(TuiEvent::LineUp(1)));
        assert_eq!(map_key(key(KeyCode::Char('d'))), Some(TuiEvent::HalfPageDown));
        assert_eq!(map_key(key(KeyCode::PageUp)), Some(TuiEvent::PageUp));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT)),
            Some(TuiEvent::Bottom)
        );
        assert_eq!(map_key(key(KeyCode::Home)), Some(TuiEvent::Top));
    }

    #[test]
    fn quit_keys() {
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(TuiEvent::ForceQuit)
        );
        assert_eq!(map_key(key(KeyCode::Esc)), Some(TuiEvent::Dismiss));
        assert_eq!(map_key(key(KeyCode::Char('q'))), Some(TuiEvent::Dismiss));
        assert_eq!(map_key(key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn events_map_to_core_actions() {
        assert_eq!(TuiEvent::Follow.to_action(), Some(Action::Follow));
        assert_eq!(TuiEvent::LineDown(3).to_action(), Some(Action::ScrollDown(3)));
        assert_eq!(TuiEvent::Dismiss.to_action(), Some(Action::Dismiss));
        assert_eq!(TuiEvent::Resize.to_action(), None);
    }
}
