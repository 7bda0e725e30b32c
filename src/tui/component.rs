use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable UI component.
///
/// Components receive their data as props (struct fields) and draw into a
/// `Frame` within a given `Rect`. Anything that must survive between frames
/// (such as a parse cache) lives in a separate state struct the component
/// borrows.
pub trait Component {
    /// Render the component into the given area.
    fn render(&mut self, frame: &mut Frame, area: Rect);
}
