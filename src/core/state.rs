//! # Application State
//!
//! Core state for webwrap. Domain data only; presentation state (scroll
//! offsets, focus, animation) lives in the `tui` module.
//!
//! ```text
//! App                                  // home screen
//! ├── url_input: String                // text in the address field
//! ├── validation_error: Option<String> // inline message under the field
//! ├── quick_links: Vec<QuickLink>      // one-tap shortcuts
//! └── presented: Option<TargetUrl>     // Some = browser screen is open
//!
//! NavigationState                      // browser screen, owned by WebView
//! ├── is_loading / progress
//! ├── can_go_back / can_go_forward
//! ├── page_title
//! └── error_message                    // overlay visible iff non-empty
//! ```
//!
//! `App` changes only through `update(app, action)` in action.rs.
//! `NavigationState` changes only through the `WebView` adapter.

use crate::core::address::TargetUrl;
use crate::core::config::ResolvedConfig;
use crate::core::quick_links::{QuickLink, default_quick_links};

pub struct App {
    pub url_input: String,
    pub validation_error: Option<String>,
    pub quick_links: Vec<QuickLink>,
    /// The URL the browser screen was opened with. `None` while on the home screen.
    pub presented: Option<TargetUrl>,
}

impl App {
    pub fn new(initial_input: impl Into<String>) -> Self {
        Self {
            url_input: initial_input.into(),
            validation_error: None,
            quick_links: default_quick_links(),
            presented: None,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            quick_links: config.quick_links.clone(),
            ..Self::new(config.home_url.clone())
        }
    }

    /// Whether the "Open" action is available.
    pub fn can_submit(&self) -> bool {
        !self.url_input.trim().is_empty()
    }
}

/// Dimensions of the loaded document, as measured after a navigation finishes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentSize {
    pub width: f64,
    pub height: f64,
}

/// Mirror of the engine's navigation state, read by the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationState {
    pub is_loading: bool,
    /// Estimated load progress in `[0, 1]`.
    pub progress: f64,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub page_title: Option<String>,
    error_message: Option<String>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// The error overlay is shown exactly when there is a message to show.
    pub fn is_error_visible(&self) -> bool {
        self.error_message.as_deref().is_some_and(|m| !m.is_empty())
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.error_message = (!message.is_empty()).then_some(message);
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }
}
