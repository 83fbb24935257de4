//! # UrlField Component
//!
//! Single-line address input with a clear button.
//!
//! The buffer is internal state; the home screen mirrors it into
//! `App::url_input` through `Action::SetInput` whenever it changes, and
//! pushes normalized text back in with `set_text` after a submit.

mod cursor;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};

use crate::tui::component::{Component, EventHandler, contains};
use crate::tui::event::TuiEvent;

use cursor::{CursorState, next_char_boundary, prev_char_boundary};

/// Border (2) + padding (2) + clear button (2).
const HORIZONTAL_OVERHEAD: u16 = 6;
const CLEAR_GLYPH: &str = "✕";

#[derive(Debug, Clone, PartialEq)]
pub enum UrlFieldEvent {
    /// Text changed; carries the full new contents.
    Changed(String),
    Submit,
    Cleared,
}

pub struct UrlField {
    buffer: String,
    cursor: CursorState,
    /// Dim border and no cursor when another element has focus (prop).
    pub focused: bool,
    /// Cell of the clear button from the last render.
    clear_button: Option<Rect>,
}

impl UrlField {
    pub fn new(text: impl Into<String>) -> Self {
        let mut field = Self {
            buffer: String::new(),
            cursor: CursorState::new(),
            focused: true,
            clear_button: None,
        };
        field.set_text(text);
        field
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Replace the contents, cursor at the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.cursor.reset();
        self.cursor.move_to_end(&self.buffer);
    }

    fn changed(&self) -> Option<UrlFieldEvent> {
        Some(UrlFieldEvent::Changed(self.buffer.clone()))
    }

    fn clear(&mut self) -> Option<UrlFieldEvent> {
        self.buffer.clear();
        self.cursor.reset();
        self.clear_button = None;
        Some(UrlFieldEvent::Cleared)
    }
}

impl Component for UrlField {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let visible = area.width.saturating_sub(HORIZONTAL_OVERHEAD);
        self.cursor.update_scroll(&self.buffer, visible);

        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(" Address ");

        let line = if self.buffer.is_empty() {
            Line::from(Span::styled(
                "Enter URL",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))
        } else {
            Line::from(self.cursor.visible_text(&self.buffer, visible))
        };
        frame.render_widget(
            Paragraph::new(line).block(block.padding(Padding::horizontal(1))),
            area,
        );

        // Clear button sits inside the right border, only when there is text.
        self.clear_button = None;
        if !self.buffer.is_empty() && area.width > HORIZONTAL_OVERHEAD && area.height >= 3 {
            let button = Rect::new(area.x + area.width - 3, area.y + 1, 1, 1);
            frame.render_widget(
                Span::styled(CLEAR_GLYPH, Style::default().fg(Color::DarkGray)),
                button,
            );
            self.clear_button = Some(button);
        }

        if self.focused && area.height >= 3 {
            let col = self.cursor.column(&self.buffer).saturating_sub(self.cursor.scroll);
            frame.set_cursor_position((area.x + 2 + col, area.y + 1));
        }
    }
}

impl EventHandler for UrlField {
    type Event = UrlFieldEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor.pos, *c);
                self.cursor.pos += c.len_utf8();
                self.changed()
            }
            TuiEvent::Paste(text) => {
                // Single line: drop any newlines from the pasted text.
                let text: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
                self.buffer.insert_str(self.cursor.pos, &text);
                self.cursor.pos += text.len();
                self.changed()
            }
            TuiEvent::Backspace if self.cursor.pos > 0 => {
                let prev = prev_char_boundary(&self.buffer, self.cursor.pos);
                self.buffer.drain(prev..self.cursor.pos);
                self.cursor.pos = prev;
                self.changed()
            }
            TuiEvent::Delete if self.cursor.pos < self.buffer.len() => {
                let next = next_char_boundary(&self.buffer, self.cursor.pos);
                self.buffer.drain(self.cursor.pos..next);
                self.changed()
            }
            TuiEvent::CursorLeft => {
                self.cursor.pos = prev_char_boundary(&self.buffer, self.cursor.pos);
                None
            }
            TuiEvent::CursorRight => {
                if self.cursor.pos < self.buffer.len() {
                    self.cursor.pos = next_char_boundary(&self.buffer, self.cursor.pos);
                }
                None
            }
            TuiEvent::CursorHome => {
                self.cursor.pos = 0;
                None
            }
            TuiEvent::CursorEnd => {
                self.cursor.move_to_end(&self.buffer);
                None
            }
            TuiEvent::ClearInput => self.clear(),
            TuiEvent::MouseClick(col, row)
                if self.clear_button.is_some_and(|b| contains(b, *col, *row)) =>
            {
                self.clear()
            }
            TuiEvent::Submit => Some(UrlFieldEvent::Submit),
            _ => None,
        }
    }
}
