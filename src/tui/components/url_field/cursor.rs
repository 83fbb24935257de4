//! Cursor position and horizontal scroll for the single-line URL field.
//!
//! Positions are byte offsets into the buffer; scroll and screen positions
//! are terminal columns (via `unicode-width`), so wide characters take two
//! cells.

use unicode_width::UnicodeWidthStr;

pub(super) struct CursorState {
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    pub pos: usize,
    /// First visible column when the text is wider than the field
    pub scroll: u16,
}

impl CursorState {
    pub fn new() -> Self {
        Self { pos: 0, scroll: 0 }
    }

    /// Place the cursor after the last character.
    pub fn move_to_end(&mut self, buffer: &str) {
        self.pos = buffer.len();
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.scroll = 0;
    }

    /// Column of the cursor from the start of the text.
    pub fn column(&self, buffer: &str) -> u16 {
        UnicodeWidthStr::width(&buffer[..self.pos]) as u16
    }

    /// Keep the cursor inside a field `visible` columns wide.
    pub fn update_scroll(&mut self, buffer: &str, visible: u16) {
        if visible == 0 {
            self.scroll = 0;
            return;
        }
        let col = self.column(buffer);
        if col < self.scroll {
            self.scroll = col;
        } else if col >= self.scroll + visible {
            self.scroll = col + 1 - visible;
        }
    }

    /// The slice of `buffer` that fits in `visible` columns after scrolling.
    pub fn visible_text<'a>(&self, buffer: &'a str, visible: u16) -> &'a str {
        let mut col = 0u16;
        let mut start = buffer.len();
        let mut end = buffer.len();
        for (i, c) in buffer.char_indices() {
            let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0) as u16;
            if col >= self.scroll && start == buffer.len() {
                start = i;
            }
            if col + w > self.scroll + visible {
                end = i;
                break;
            }
            col += w;
        }
        if start > end {
            return "";
        }
        &buffer[start..end]
    }
}

/// Byte offset of the character boundary before `pos`.
pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Byte offset of the character boundary after `pos`.
pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}
