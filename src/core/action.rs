//! # Actions
//!
//! Everything that can happen on the home screen becomes an `Action`.
//! User presses Enter? That's `Action::Submit`.
//! User picks a quick link? That's `Action::OpenQuickLink(index)`.
//!
//! `update()` takes the current state and an action, mutates the state,
//! and returns an `Effect` describing the I/O the caller should perform.
//! No side effects here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use log::{debug, info};

use crate::core::address::{TargetUrl, validate};
use crate::core::state::App;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The address field now contains this text.
    SetInput(String),
    /// Validate the address field and open it.
    Submit,
    /// Put the quick link's URL in the field and submit it.
    OpenQuickLink(usize),
    /// Clear the field and any validation error.
    ClearInput,
    /// The browser screen was dismissed.
    CloseBrowser,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Present the browser screen with this URL.
    PresentBrowser(TargetUrl),
    /// Tear down the browser screen.
    DismissBrowser,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    debug!("update: {:?}", action);
    match action {
        Action::SetInput(text) => {
            app.url_input = text;
            Effect::None
        }
        Action::Submit => submit(app),
        Action::OpenQuickLink(index) => match app.quick_links.get(index) {
            Some(link) => {
                app.url_input = link.url.clone();
                submit(app)
            }
            None => Effect::None,
        },
        Action::ClearInput => {
            app.url_input.clear();
            app.validation_error = None;
            Effect::None
        }
        Action::CloseBrowser => {
            if app.presented.take().is_some() {
                Effect::DismissBrowser
            } else {
                Effect::None
            }
        }
        Action::Quit => Effect::Quit,
    }
}

fn submit(app: &mut App) -> Effect {
    match validate(&app.url_input) {
        Ok(target) => {
            info!("Opening {}", target);
            app.url_input = target.as_str().to_string();
            app.validation_error = None;
            app.presented = Some(target.clone());
            Effect::PresentBrowser(target)
        }
        Err(e) => {
            debug!("Rejected input {:?}: {}", app.url_input, e);
            app.validation_error = Some(e.to_string());
            Effect::None
        }
    }
}
