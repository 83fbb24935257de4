//! # TitleBar Component
//!
//! Top line of the browser screen: the page title (or the address while no
//! title is known) and a spinner while loading.
//!
//! Purely presentational. All fields are props:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar {
//!     title: state.page_title.clone(),
//!     address: "https://example.com".to_string(),
//!     is_loading: state.is_loading,
//!     spinner_frame,
//! };
//! title_bar.render(frame, area);
//! ```

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

pub struct TitleBar {
    /// Document title; `None` or empty falls back to `address`.
    pub title: Option<String>,
    pub address: String,
    pub is_loading: bool,
    pub spinner_frame: usize,
}

impl TitleBar {
    fn heading(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => &self.address,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled("webwrap", Style::default().fg(Color::Cyan)),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                self.heading().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ];
        if self.is_loading {
            let glyph = SPINNER[self.spinner_frame % SPINNER.len()];
            spans.push(Span::styled(
                format!("  {glyph} Loading"),
                Style::default().fg(Color::Yellow),
            ));
        }
        frame.render_widget(Line::from(spans), area);
    }
}
