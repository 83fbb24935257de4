//! # Home Screen
//!
//! Address field, inline validation error, an Open button and the
//! quick-link shortcuts.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `HomeState` lives in `TuiState` (field contents, focus, click targets)
//! - `HomeScreen` is created each frame with borrowed state and `App` props
//!
//! ## Focus
//!
//! The address field has focus by default. Down moves focus into the quick
//! links, Up from the first link moves it back. Typing always returns focus
//! to the field.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::quick_links::QuickLinkList;
use super::url_field::{UrlField, UrlFieldEvent};
use crate::core::state::App;
use crate::tui::component::{Component, EventHandler, contains};
use crate::tui::event::TuiEvent;

const OPEN_LABEL: &str = " Open ";

#[derive(Debug, Clone, PartialEq)]
pub enum HomeEvent {
    InputChanged(String),
    Submit,
    OpenQuickLink(usize),
    Clear,
    Quit,
}

pub struct HomeState {
    pub url_field: UrlField,
    /// Highlighted quick link; `None` while the address field has focus.
    pub selected_link: Option<usize>,
    link_count: usize,
    open_button: Option<Rect>,
    link_rows: Vec<Rect>,
}

impl HomeState {
    pub fn new(initial_input: &str, link_count: usize) -> Self {
        Self {
            url_field: UrlField::new(initial_input),
            selected_link: None,
            link_count,
            open_button: None,
            link_rows: Vec::new(),
        }
    }

    fn focus_field(&mut self) {
        self.selected_link = None;
        self.url_field.focused = true;
    }
}

impl EventHandler for HomeState {
    type Event = HomeEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::QuickLink(i) if *i < self.link_count => Some(HomeEvent::OpenQuickLink(*i)),
            TuiEvent::Escape => Some(HomeEvent::Quit),
            TuiEvent::MouseClick(col, row) => {
                if self.open_button.is_some_and(|b| contains(b, *col, *row)) {
                    return Some(HomeEvent::Submit);
                }
                if let Some(i) = self.link_rows.iter().position(|r| contains(*r, *col, *row)) {
                    return Some(HomeEvent::OpenQuickLink(i));
                }
                self.url_field.handle_event(event).map(|_| HomeEvent::Clear)
            }
            TuiEvent::CursorDown if self.link_count > 0 => {
                let next = self
                    .selected_link
                    .map_or(0, |i| (i + 1).min(self.link_count - 1));
                self.selected_link = Some(next);
                self.url_field.focused = false;
                None
            }
            TuiEvent::CursorUp => {
                match self.selected_link {
                    Some(0) | None => self.focus_field(),
                    Some(i) => self.selected_link = Some(i - 1),
                }
                None
            }
            TuiEvent::Submit if self.selected_link.is_some() => {
                self.selected_link.map(HomeEvent::OpenQuickLink)
            }
            _ => {
                if matches!(event, TuiEvent::InputChar(_) | TuiEvent::Paste(_)) {
                    self.focus_field();
                }
                match self.url_field.handle_event(event)? {
                    UrlFieldEvent::Changed(text) => Some(HomeEvent::InputChanged(text)),
                    UrlFieldEvent::Submit => Some(HomeEvent::Submit),
                    UrlFieldEvent::Cleared => Some(HomeEvent::Clear),
                }
            }
        }
    }
}

pub struct HomeScreen<'a> {
    state: &'a mut HomeState,
    app: &'a App,
}

impl<'a> HomeScreen<'a> {
    pub fn new(state: &'a mut HomeState, app: &'a App) -> Self {
        Self { state, app }
    }
}

impl Component for HomeScreen<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        use Constraint::{Length, Min};

        self.state.link_count = self.app.quick_links.len();
        let links_height = self.app.quick_links.len() as u16;

        let [column] = Layout::horizontal([Constraint::Max(72)])
            .flex(Flex::Center)
            .areas(area);
        let [header, _, field, error, open, _, links_title, links, _, help] = Layout::vertical([
            Length(2),
            Length(1),
            Length(3),
            Length(1),
            Length(1),
            Length(1),
            Length(1),
            Length(links_height),
            Min(0),
            Length(1),
        ])
        .areas(column);

        let header_text = vec![
            Line::from(Span::styled(
                "webwrap",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Type an address or pick a quick link",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        frame.render_widget(Paragraph::new(header_text).alignment(Alignment::Center), header);

        self.state.url_field.render(frame, field);

        if let Some(message) = &self.app.validation_error {
            frame.render_widget(
                Span::styled(format!("  {message}"), Style::default().fg(Color::Red)),
                error,
            );
        }

        // Open button, right-aligned under the field; dimmed when there is nothing to open.
        let width = OPEN_LABEL.len() as u16;
        let button = Rect::new(
            open.x + open.width.saturating_sub(width),
            open.y,
            width.min(open.width),
            open.height.min(1),
        );
        let button_style = if self.app.can_submit() {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        };
        frame.render_widget(Span::styled(OPEN_LABEL, button_style), button);
        self.state.open_button = self.app.can_submit().then_some(button);

        frame.render_widget(
            Span::styled("Quick Links", Style::default().add_modifier(Modifier::BOLD)),
            links_title,
        );
        let mut list = QuickLinkList::new(&self.app.quick_links, self.state.selected_link);
        list.render(frame, links);
        self.state.link_rows = list.rows;

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Enter open · F1-F9 quick link · ↓ select link · Ctrl+L clear · Esc quit",
                Style::default().fg(Color::DarkGray),
            )))
            .alignment(Alignment::Center),
            help,
        );
    }
}
