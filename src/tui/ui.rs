use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::state::Pager;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{DocumentView, HelpView, StatusBar, help_height};

/// Screen regions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiLayout {
    pub content: Rect,
    pub help: Option<Rect>,
    pub status: Rect,
}

pub fn layout(area: Rect, show_help: bool) -> UiLayout {
    use Constraint::{Length, Min};
    if show_help {
        let [content, help, status] =
            Layout::vertical([Min(0), Length(help_height()), Length(1)]).areas(area);
        UiLayout {
            content,
            help: Some(help),
            status,
        }
    } else {
        let [content, status] = Layout::vertical([Min(0), Length(1)]).areas(area);
        UiLayout {
            content,
            help: None,
            status,
        }
    }
}

pub fn draw_ui(frame: &mut Frame, pager: &Pager, tui: &mut TuiState) {
    let areas = layout(frame.area(), pager.show_help);

    tui.document.sync(&pager.content);
    DocumentView {
        state: &tui.document,
        scroll_offset: pager.scroll_offset,
    }
    .render(frame, areas.content);

    if let Some(help_area) = areas.help {
        HelpView.render(frame, help_area);
    }

    let note = pager
        .document
        .as_ref()
        .map(|d| d.note.clone())
        .unwrap_or_default();
    let status = pager.status.as_ref().map(|s| (s.text.clone(), s.is_error));
    StatusBar::new(note, status, pager.scroll_percent()).render(frame, areas.status);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Action, RenderedDocument, update};
    use crate::test_support::{document, load_document, registry, test_pager};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen(pager: &Pager, width: u16, height: u16) -> Vec<String> {
        let mut tui = TuiState::new();
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw_ui(f, pager, &mut tui)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn layout_reserves_status_and_help_rows() {
        let area = Rect::new(0, 0, 80, 24);
        let plain = layout(area, false);
        assert_eq!(plain.content.height, 23);
        assert_eq!(plain.status.y, 23);
        assert!(plain.help.is_none());

        let with_help = layout(area, true);
        assert_eq!(with_help.content.height, 24 - 1 - help_height());
        assert_eq!(with_help.help.unwrap().height, help_height());
    }

    #[test]
    fn draws_document_and_status_bar() {
        let mut pager = test_pager();
        let doc = document("guide", "");
        load_document(&mut pager, doc.clone());
        update(
            &mut pager,
            Action::ContentRendered(RenderedDocument {
                path: doc.local_path,
                text: "Read the intro".to_string(),
                links: registry(&["intro"]),
            }),
        );
        update(&mut pager, Action::FocusNext);

        let rows = screen(&pager, 60, 5);
        assert!(rows[0].starts_with("Read the intro"));
        assert!(rows[4].contains("Open: intro.md"));
    }

    #[test]
    fn help_toggle_shows_bindings() {
        let mut pager = test_pager();
        update(&mut pager, Action::ToggleHelp);
        let rows = screen(&pager, 80, 12);
        assert!(rows.iter().any(|r| r.contains("open focused link")));
    }
}
