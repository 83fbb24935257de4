//! # Error Overlay
//!
//! Modal panel over the page when navigation fails: "Navigation Error",
//! the classified message, and Retry / Dismiss buttons. A click anywhere
//! outside the panel dismisses it.
//!
//! Same split as the other overlays: `ErrorOverlayState` keeps the click
//! targets between frames, `ErrorOverlay` draws with borrowed props.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap};

use crate::tui::component::{Component, EventHandler, contains};
use crate::tui::event::TuiEvent;

pub const TITLE: &str = "Navigation Error";
const RETRY_LABEL: &str = "[ Retry ]";
const DISMISS_LABEL: &str = "[ Dismiss ]";
const MAX_WIDTH: u16 = 56;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
    Retry,
    Dismiss,
}

#[derive(Debug, Default)]
pub struct ErrorOverlayState {
    panel: Option<Rect>,
    retry: Option<Rect>,
    dismiss: Option<Rect>,
}

impl EventHandler for ErrorOverlayState {
    type Event = OverlayEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar('r') | TuiEvent::Submit => Some(OverlayEvent::Retry),
            TuiEvent::InputChar('d') | TuiEvent::Escape => Some(OverlayEvent::Dismiss),
            TuiEvent::MouseClick(col, row) => {
                let hit = |r: Option<Rect>| r.is_some_and(|r| contains(r, *col, *row));
                if hit(self.retry) {
                    Some(OverlayEvent::Retry)
                } else if hit(self.dismiss) {
                    Some(OverlayEvent::Dismiss)
                } else if self.panel.is_some() && !hit(self.panel) {
                    Some(OverlayEvent::Dismiss)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

pub struct ErrorOverlay<'a> {
    pub message: &'a str,
    pub state: &'a mut ErrorOverlayState,
}

impl Component for ErrorOverlay<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = MAX_WIDTH.min(area.width.saturating_sub(4)).max(20).min(area.width);
        // Borders (2) + padding (2) on each axis.
        let text_width = width.saturating_sub(4).max(1) as usize;
        let message_lines = textwrap::wrap(self.message, text_width).len().max(1) as u16;
        // icon + title + blank + message + blank + buttons, plus borders
        let height = (message_lines + 5 + 2).min(area.height);

        let panel = centered_rect(width, height, area);
        frame.render_widget(Clear, panel);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Red))
            .padding(Padding::horizontal(1));
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let [heading, body, buttons] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let heading_text = vec![
            Line::from(Span::styled("⚠", Style::default().fg(Color::Red))),
            Line::from(Span::styled(TITLE, Style::default().add_modifier(Modifier::BOLD))),
        ];
        frame.render_widget(
            Paragraph::new(heading_text).alignment(Alignment::Center),
            heading,
        );
        frame.render_widget(
            Paragraph::new(self.message)
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            body,
        );

        let retry_width = RETRY_LABEL.len() as u16;
        let dismiss_width = DISMISS_LABEL.len() as u16;
        let [retry, dismiss] = Layout::horizontal([
            Constraint::Length(retry_width),
            Constraint::Length(dismiss_width),
        ])
        .flex(Flex::Center)
        .spacing(2)
        .areas(buttons);
        frame.render_widget(
            Span::styled(RETRY_LABEL, Style::default().fg(Color::Black).bg(Color::Cyan)),
            retry,
        );
        frame.render_widget(
            Span::styled(DISMISS_LABEL, Style::default().fg(Color::Gray)),
            dismiss,
        );

        self.state.panel = Some(panel);
        self.state.retry = Some(retry);
        self.state.dismiss = Some(dismiss);
    }
}

/// A `width` × `height` rect centered in `outer` (clamped to fit).
pub fn centered_rect(width: u16, height: u16, outer: Rect) -> Rect {
    let [center_v] = Layout::vertical([Constraint::Length(height.min(outer.height))])
        .flex(Flex::Center)
        .areas(outer);
    let [center] = Layout::horizontal([Constraint::Length(width.min(outer.width))])
        .flex(Flex::Center)
        .areas(center_v);
    center
}
