//! # Browser Screen
//!
//! The modal screen presented over the home screen while a page is open.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ webwrap │ Example Domain  ⠙ Loading          │ title bar
//! │ ✕ Back (q)   ◀ (b)   ▶ (f)   ⟳ Reload (r)   │ nav controls
//! │ ━━━━━━━━━━━━━━━━──────────────────────────── │ progress (while loading)
//! │ page text with numbered links[1]             │
//! │ …                        ┌ error overlay ┐   │
//! │ Type a link number, Enter to follow          │ footer
//! └──────────────────────────────────────────────┘
//! ```
//!
//! `BrowserState` is persistent (scroll, click targets, typed link number);
//! `BrowserScreen` is built per frame from the `NavigationState` and page.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use super::error_overlay::{ErrorOverlay, ErrorOverlayState, OverlayEvent};
use super::nav_controls::{NavButton, NavControls, NavControlsState};
use super::page_view::{PageView, PageViewState};
use super::progress_bar::ProgressBar;
use super::title_bar::TitleBar;
use crate::core::config::ResolvedConfig;
use crate::core::state::NavigationState;
use crate::engine::page::Page;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserEvent {
    Close,
    Back,
    Forward,
    ReloadOrStop,
    OpenExternal,
    FollowLink(usize),
    Retry,
    DismissError,
}

/// Which parts of the browser chrome are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chrome {
    pub show_progress_bar: bool,
    pub show_navigation_controls: bool,
    pub show_page_title: bool,
}

impl Chrome {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            show_progress_bar: config.show_progress_bar,
            show_navigation_controls: config.show_navigation_controls,
            show_page_title: config.show_page_title,
        }
    }
}

impl Default for Chrome {
    fn default() -> Self {
        Self {
            show_progress_bar: true,
            show_navigation_controls: true,
            show_page_title: true,
        }
    }
}

#[derive(Default)]
pub struct BrowserState {
    pub page_view: PageViewState,
    /// Set by the host before dispatch: the overlay takes all input while visible.
    pub error_visible: bool,
    nav_controls: NavControlsState,
    overlay: ErrorOverlayState,
    /// Digits typed so far toward a link number.
    link_digits: String,
}

impl BrowserState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link_digits(&self) -> &str {
        &self.link_digits
    }
}

impl EventHandler for BrowserState {
    type Event = BrowserEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.error_visible {
            self.link_digits.clear();
            return self.overlay.handle_event(event).map(|e| match e {
                OverlayEvent::Retry => BrowserEvent::Retry,
                OverlayEvent::Dismiss => BrowserEvent::DismissError,
            });
        }

        match event {
            TuiEvent::InputChar(c) if c.is_ascii_digit() => {
                // Link numbers are 1-based; a leading zero means nothing.
                if !(self.link_digits.is_empty() && *c == '0') && self.link_digits.len() < 6 {
                    self.link_digits.push(*c);
                }
                None
            }
            TuiEvent::Backspace => {
                self.link_digits.pop();
                None
            }
            TuiEvent::Submit => {
                let number = self.link_digits.parse().ok();
                self.link_digits.clear();
                number.map(BrowserEvent::FollowLink)
            }
            TuiEvent::Escape if !self.link_digits.is_empty() => {
                self.link_digits.clear();
                None
            }
            TuiEvent::Escape | TuiEvent::InputChar('q') => Some(BrowserEvent::Close),
            TuiEvent::InputChar('b') => Some(BrowserEvent::Back),
            TuiEvent::InputChar('f') => Some(BrowserEvent::Forward),
            TuiEvent::InputChar('r') => Some(BrowserEvent::ReloadOrStop),
            TuiEvent::InputChar('o') => Some(BrowserEvent::OpenExternal),
            TuiEvent::MouseClick(..) => {
                self.nav_controls.handle_event(event).map(|button| match button {
                    NavButton::Close => BrowserEvent::Close,
                    NavButton::Back => BrowserEvent::Back,
                    NavButton::Forward => BrowserEvent::Forward,
                    NavButton::ReloadOrStop => BrowserEvent::ReloadOrStop,
                    NavButton::OpenExternal => BrowserEvent::OpenExternal,
                })
            }
            _ => {
                self.page_view.handle_event(event);
                None
            }
        }
    }
}

pub struct BrowserScreen<'a> {
    pub state: &'a mut BrowserState,
    pub nav: &'a NavigationState,
    pub page: Option<&'a Page>,
    pub address: &'a str,
    pub chrome: Chrome,
    /// Eased progress value to draw.
    pub progress: f64,
    pub spinner_frame: usize,
}

impl Component for BrowserScreen<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        use Constraint::{Length, Min};

        let title_height = u16::from(self.chrome.show_page_title);
        let [title, controls, progress, content, footer] = Layout::vertical([
            Length(title_height),
            Length(1),
            Length(1),
            Min(0),
            Length(1),
        ])
        .areas(area);

        if self.chrome.show_page_title {
            TitleBar {
                title: self.nav.page_title.clone(),
                address: self.address.to_string(),
                is_loading: self.nav.is_loading,
                spinner_frame: self.spinner_frame,
            }
            .render(frame, title);
        }

        NavControls {
            state: &mut self.state.nav_controls,
            can_go_back: self.nav.can_go_back,
            can_go_forward: self.nav.can_go_forward,
            is_loading: self.nav.is_loading,
            show_navigation: self.chrome.show_navigation_controls,
        }
        .render(frame, controls);

        if self.chrome.show_progress_bar && self.nav.is_loading {
            ProgressBar {
                value: self.progress,
            }
            .render(frame, progress);
        }

        PageView {
            page: self.page,
            state: &mut self.state.page_view,
            is_loading: self.nav.is_loading,
        }
        .render(frame, content);

        let footer_line = if self.state.link_digits.is_empty() {
            Line::from(Span::styled(
                "Link number + Enter to follow · ↑↓ PgUp PgDn scroll · q back to home",
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Line::from(vec![
                Span::raw("Follow link: "),
                Span::styled(
                    format!("[{}]", self.state.link_digits),
                    Style::default().fg(Color::Blue),
                ),
                Span::styled("  Enter to go · Esc to cancel", Style::default().fg(Color::DarkGray)),
            ])
        };
        frame.render_widget(footer_line, footer);

        if let Some(message) = self.nav.error_message() {
            ErrorOverlay {
                message,
                state: &mut self.state.overlay,
            }
            .render(frame, content);
        }
    }
}
