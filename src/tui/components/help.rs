//! # HelpView Component
//!
//! Key binding reference shown above the status bar while `?` is toggled on.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::component::Component;

/// (keys, description), laid out in two columns.
const BINDINGS: &[(&str, &str)] = &[
    ("k/↑  j/↓", "line up / down"),
    ("b/pgup  f/pgdn", "page up / down"),
    ("u  d", "half page up / down"),
    ("g/home  G/end", "top / bottom"),
    ("tab  shift+tab", "next / previous link"),
    ("enter", "open focused link"),
    ("backspace", "back"),
    ("r", "reload"),
    ("?", "toggle help"),
    ("q/esc", "dismiss message / quit"),
];

/// Rows the help view occupies, borders included.
pub fn help_height() -> u16 {
    BINDINGS.len().div_ceil(2) as u16 + 2
}

pub struct HelpView;

impl Component for HelpView {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::TOP | Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Help ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = BINDINGS.len().div_ceil(2);
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(inner);
        let (first, second) = BINDINGS.split_at(rows);
        frame.render_widget(column(first), left);
        frame.render_widget(column(second), right);
    }
}

fn column(bindings: &[(&'static str, &'static str)]) -> Paragraph<'static> {
    let key_width = bindings.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    let lines: Vec<Line<'static>> = bindings
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(
                    format!("  {keys:<key_width$}  "),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(*what, Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();
    Paragraph::new(lines)
}
