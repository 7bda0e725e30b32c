//! # DocumentView Component
//!
//! Shows the pager's ANSI content. Parsing ANSI into ratatui `Text` is the
//! expensive part, so the parsed form is cached in [`DocumentViewState`] and
//! rebuilt only when the content string changes (new render or new focus).

use ansi_to_tui::IntoText;
use log::warn;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Text;
use ratatui::widgets::Paragraph;

use crate::core::highlight::printable_map;
use crate::tui::component::Component;

#[derive(Default)]
pub struct DocumentViewState {
    source: String,
    text: Text<'static>,
}

impl DocumentViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-parse `content` if it differs from what is cached.
    pub fn sync(&mut self, content: &str) {
        if self.source == content {
            return;
        }
        self.text = match content.as_bytes().into_text() {
            Ok(text) => text,
            Err(e) => {
                warn!("Could not parse rendered ANSI, showing plain text: {}", e);
                let plain: String = printable_map(content.as_bytes()).chars.into_iter().collect();
                Text::raw(plain)
            }
        };
        self.source = content.to_string();
    }

    pub fn text(&self) -> &Text<'static> {
        &self.text
    }
}

pub struct DocumentView<'a> {
    pub state: &'a DocumentViewState,
    pub scroll_offset: u16,
}

impl Component for DocumentView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new(self.state.text().clone()).scroll((self.scroll_offset, 0));
        frame.render_widget(paragraph, area);
    }
}
