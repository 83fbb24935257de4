use ratatui::Frame;
use ratatui::layout::Rect;

use super::event::TuiEvent;

/// A piece of the screen that draws itself into a `Rect`.
///
/// Data comes in as struct fields ("props"). `render` takes `&mut self` so
/// a component can remember where it drew its clickable parts, which the
/// matching `EventHandler` uses for mouse hit-testing on the next event.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that turns low-level `TuiEvent`s into its own events.
pub trait EventHandler {
    /// The high-level event this component emits.
    type Event;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}

/// Whether a screen cell lies inside `area`.
pub fn contains(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x
        && col < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}
