//! # StatusBar Component
//!
//! Bottom line of the pager.
//!
//! ```text
//!  mdwalk  docs/guide.md ·····························  42%  ? Help
//!  ^logo   ^note or status message (truncated with …)   ^scroll ^hint
//! ```
//!
//! A transient status message replaces the note. Errors get their own colors
//! so they stand out from hints like "Tab to select a link".

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::component::Component;

const LOGO: &str = " mdwalk ";
const HELP_HINT: &str = " ? Help ";

pub struct StatusBar {
    /// Display name of the open document.
    pub note: String,
    /// Transient message and whether it is an error.
    pub status: Option<(String, bool)>,
    /// 0.0 to 1.0
    pub scroll_percent: f64,
}

impl StatusBar {
    pub fn new(note: String, status: Option<(String, bool)>, scroll_percent: f64) -> Self {
        Self {
            note,
            status,
            scroll_percent,
        }
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let bar = Style::default().fg(Color::Gray).bg(Color::Rgb(0x30, 0x30, 0x30));
        let logo = Style::default()
            .fg(Color::Black)
            .bg(Color::LightMagenta)
            .add_modifier(Modifier::BOLD);
        let percent = format!(" {:>3.0}% ", (self.scroll_percent * 100.0).clamp(0.0, 100.0));

        let (text, text_style) = match &self.status {
            Some((message, true)) => (
                message.as_str(),
                Style::default().fg(Color::White).bg(Color::Red),
            ),
            Some((message, false)) => (message.as_str(), bar.fg(Color::LightGreen)),
            None => (self.note.as_str(), bar),
        };

        let fixed = LOGO.width() + percent.width() + HELP_HINT.width();
        let room = usize::from(area.width).saturating_sub(fixed);
        let middle = truncate_with_ellipsis(&format!(" {text}"), room);
        let padding = " ".repeat(room.saturating_sub(middle.width()));

        let line = Line::from(vec![
            Span::styled(LOGO, logo),
            Span::styled(middle, text_style),
            Span::styled(padding, bar),
            Span::styled(percent, bar),
            Span::styled(HELP_HINT, bar.fg(Color::DarkGray)),
        ]);
        frame.render_widget(line, area);
    }
}

/// Cut `s` to at most `max_width` columns, ending in `…` when shortened.
pub fn truncate_with_ellipsis(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(bar: &mut StatusBar, width: u16) -> String {
        let backend = TestBackend::new(width, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| bar.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn shows_logo_note_percent_and_hint() {
        let mut bar = StatusBar::new("docs/a.md".to_string(), None, 0.42);
        let text = draw(&mut bar, 60);
        assert!(text.starts_with(" mdwalk "));
        assert!(text.contains("docs/a.md"));
        assert!(text.contains(" 42% "));
        assert!(text.ends_with(" ? Help "));
    }

    #[test]
    fn status_message_replaces_note() {
        let mut bar = StatusBar::new(
            "docs/a.md".to_string(),
            Some(("Tab to select a link".to_string(), false)),
            1.0,
        );
        let text = draw(&mut bar, 60);
        assert!(text.contains("Tab to select a link"));
        assert!(!text.contains("docs/a.md"));
        assert!(text.contains("100%"));
    }

    #[test]
    fn error_status_is_red() {
        let mut bar = StatusBar::new(String::new(), Some(("boom".to_string(), true)), 0.0);
        let backend = TestBackend::new(40, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| bar.render(f, f.area())).unwrap();
        let buffer = terminal.backend().buffer();
        let col = LOGO.width() as u16 + 1;
        assert_eq!(buffer[(col, 0)].symbol(), "b");
        assert_eq!(buffer[(col, 0)].bg, Color::Red);
    }

    #[test]
    fn long_note_is_truncated() {
        let note = "a/very/long/path/that/does/not/fit/anywhere/at/all.md".to_string();
        let mut bar = StatusBar::new(note, None, 0.0);
        let text = draw(&mut bar, 40);
        assert!(text.contains('…'));
        assert!(text.ends_with(" ? Help "));
    }

    #[test]
    fn truncate_respects_width() {
        assert_eq!(truncate_with_ellipsis("hello", 10), "hello");
        assert_eq!(truncate_with_ellipsis("hello world", 6), "hello…");
        assert_eq!(truncate_with_ellipsis("日本語テキスト", 5), "日本…");
        assert_eq!(truncate_with_ellipsis("abc", 0), "");
    }
}
