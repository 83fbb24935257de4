//! # PageView Component
//!
//! Scrollable rendering of the loaded `Page`. Lines are wrapped to the
//! viewport with `textwrap` and laid into a `tui-scrollview` canvas; link
//! markers (`[3]`) are highlighted so they can be followed by number.

use log::warn;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::engine::page::{LineKind, Page};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

#[derive(Default)]
pub struct PageViewState {
    pub scroll_state: ScrollViewState,
}

impl PageViewState {
    /// Jump back to the top, e.g. when a new page arrives.
    pub fn reset(&mut self) {
        self.scroll_state.scroll_to_top();
    }
}

impl EventHandler for PageViewState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp | TuiEvent::CursorUp => self.scroll_state.scroll_up(),
            TuiEvent::ScrollDown | TuiEvent::CursorDown => self.scroll_state.scroll_down(),
            TuiEvent::ScrollPageUp => self.scroll_state.scroll_page_up(),
            TuiEvent::ScrollPageDown => self.scroll_state.scroll_page_down(),
            TuiEvent::CursorHome => self.scroll_state.scroll_to_top(),
            TuiEvent::CursorEnd => self.scroll_state.scroll_to_bottom(),
            _ => {}
        }
        None
    }
}

pub struct PageView<'a> {
    pub page: Option<&'a Page>,
    pub state: &'a mut PageViewState,
    pub is_loading: bool,
}

impl Component for PageView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let Some(page) = self.page else {
            let placeholder = if self.is_loading { "Loading…" } else { "Nothing to show" };
            frame.render_widget(
                Paragraph::new(placeholder)
                    .style(Style::default().fg(Color::DarkGray))
                    .alignment(Alignment::Center),
                Rect::new(area.x, area.y + area.height / 2, area.width, 1.min(area.height)),
            );
            return;
        };

        // One column for the scrollbar.
        let content_width = area.width.saturating_sub(1);
        let mut lines = layout_lines(page, content_width);
        let height = cap_to_scroll_height(&mut lines);

        let mut scroll_view = ScrollView::new(Size::new(content_width, height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);
        scroll_view.render_widget(Paragraph::new(lines), Rect::new(0, 0, content_width, height));
        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// Drop lines beyond what a scroll view can address; returns the height.
fn cap_to_scroll_height(lines: &mut Vec<Line<'static>>) -> u16 {
    if lines.len() > usize::from(u16::MAX) {
        warn!(
            "Page wraps to {} lines; showing the first {}",
            lines.len(),
            u16::MAX
        );
        lines.truncate(usize::from(u16::MAX));
    }
    u16::try_from(lines.len()).unwrap_or(u16::MAX)
}

/// Wrap every page line to `width` and style it by kind.
pub fn layout_lines(page: &Page, width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width.max(1));
    let mut out = Vec::new();
    let mut previous: Option<LineKind> = None;

    for line in &page.lines {
        // Blank line before headings, except at the very top.
        if line.kind == LineKind::Heading && previous.is_some() {
            out.push(Line::default());
        }
        let style = match line.kind {
            LineKind::Heading => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            LineKind::Preformatted => Style::default().fg(Color::Gray),
            LineKind::Text | LineKind::ListItem => Style::default(),
        };
        let options = textwrap::Options::new(width).break_words(true);
        let options = if line.kind == LineKind::ListItem {
            options.subsequent_indent("  ")
        } else {
            options
        };
        if line.text.is_empty() {
            out.push(Line::default());
        } else {
            for segment in textwrap::wrap(&line.text, options) {
                out.push(styled_segment(&segment, style));
            }
        }
        previous = Some(line.kind);
    }
    out
}

/// Split `text` so `[n]` link markers get their own highlighted span.
fn styled_segment(text: &str, base: Style) -> Line<'static> {
    let marker = Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD);
    let mut spans = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let digits = after.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits > 0 && after[digits..].starts_with(']') {
            if open > 0 {
                spans.push(Span::styled(rest[..open].to_string(), base));
            }
            let end = open + 1 + digits + 1;
            spans.push(Span::styled(rest[open..end].to_string(), marker));
            rest = &rest[end..];
        } else {
            spans.push(Span::styled(rest[..=open].to_string(), base));
            rest = &rest[open + 1..];
        }
    }
    if !rest.is_empty() {
        spans.push(Span::styled(rest.to_string(), base));
    }
    Line::from(spans)
}
