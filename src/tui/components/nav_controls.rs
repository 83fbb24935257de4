//! Browser toolbar: close, back, forward, reload/stop, open externally.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use crate::tui::component::{Component, EventHandler, contains};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavButton {
    Close,
    Back,
    Forward,
    /// Reload when idle, stop while loading.
    ReloadOrStop,
    OpenExternal,
}

/// Click targets from the last render. Disabled buttons are not recorded.
#[derive(Debug, Default)]
pub struct NavControlsState {
    buttons: Vec<(NavButton, Rect)>,
}

impl EventHandler for NavControlsState {
    type Event = NavButton;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let TuiEvent::MouseClick(col, row) = event else {
            return None;
        };
        self.buttons
            .iter()
            .find(|(_, rect)| contains(*rect, *col, *row))
            .map(|(button, _)| *button)
    }
}

pub struct NavControls<'a> {
    pub state: &'a mut NavControlsState,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub is_loading: bool,
    /// Show back/forward/reload/open; the close button is always there.
    pub show_navigation: bool,
}

impl NavControls<'_> {
    fn items(&self) -> Vec<(NavButton, String, bool)> {
        let mut items = vec![(NavButton::Close, "✕ Back (q)".to_string(), true)];
        if self.show_navigation {
            let reload = if self.is_loading { "■ Stop (r)" } else { "⟳ Reload (r)" };
            items.extend([
                (NavButton::Back, "◀ (b)".to_string(), self.can_go_back),
                (NavButton::Forward, "▶ (f)".to_string(), self.can_go_forward),
                (NavButton::ReloadOrStop, reload.to_string(), true),
                (NavButton::OpenExternal, "↗ Open in browser (o)".to_string(), true),
            ]);
        }
        items
    }
}

impl Component for NavControls<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.buttons.clear();
        let mut x = area.x;
        let right = area.x + area.width;

        for (button, label, enabled) in self.items() {
            let width = unicode_width::UnicodeWidthStr::width(label.as_str()) as u16;
            if x + width > right {
                break;
            }
            let rect = Rect::new(x, area.y, width, 1);
            let style = if enabled {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
            };
            frame.render_widget(Span::styled(label, style), rect);
            if enabled {
                self.state.buttons.push((button, rect));
            }
            x += width + 3;
        }
    }
}
