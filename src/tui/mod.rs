//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the screens,
//! and translates keyboard and mouse events into `core::Action` values and
//! browser-screen commands.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Flow
//!
//! ```text
//!  crossterm ─▶ TuiEvent ─▶ HomeState / BrowserState ─▶ Action ─▶ update() ─▶ Effect
//!                                                                               │
//!  engine tasks ─▶ EngineEvent (std mpsc) ─▶ BrowserSession::pump ◀─────────────┘
//! ```
//!
//! ## Redraw Strategy
//!
//! The event loop redraws conditionally:
//!
//! - **Animating** (page loading, progress easing): draws every ~50ms.
//! - **Idle**: sleeps up to 500ms and only redraws on input or engine events.

mod browser_session;
mod component;
mod components;
mod event;
mod ui;

use log::{info, warn};
use std::io::stdout;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use tokio::runtime::Handle;

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::engine::HttpEngine;
use crate::tui::browser_session::BrowserSession;
use crate::tui::component::EventHandler;
use crate::tui::components::{Chrome, HomeEvent, HomeState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub home: HomeState,
    pub chrome: Chrome,
}

impl TuiState {
    pub fn new(app: &App, chrome: Chrome) -> Self {
        Self {
            home: HomeState::new(&app.url_input, app.quick_links.len()),
            chrome,
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol is harmlessly ignored by terminals without it
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Everything the loop owns besides the terminal.
struct Host {
    app: App,
    tui: TuiState,
    session: Option<BrowserSession<HttpEngine>>,
    config: ResolvedConfig,
    runtime: Handle,
}

impl Host {
    /// Run an action through the reducer and carry out its effect.
    /// Returns `true` when the app should quit.
    fn dispatch(&mut self, action: Action) -> bool {
        let effect = update(&mut self.app, action);
        // Keep the field in step with the reducer (normalized URL, quick links).
        if self.tui.home.url_field.text() != self.app.url_input {
            self.tui.home.url_field.set_text(self.app.url_input.clone());
        }

        match effect {
            Effect::None => false,
            Effect::Quit => true,
            Effect::PresentBrowser(target) => {
                if let Some(session) = &mut self.session {
                    session.navigate(&target);
                    return false;
                }
                match BrowserSession::open(target, &self.config, self.runtime.clone()) {
                    Ok(session) => self.session = Some(session),
                    Err(e) => {
                        warn!("Failed to start browser engine: {}", e);
                        self.app.presented = None;
                        self.app.validation_error = Some(format!("Could not start browser: {e}"));
                    }
                }
                false
            }
            Effect::DismissBrowser => {
                info!("Browser closed");
                self.session = None;
                false
            }
        }
    }

    /// Route one input event to whichever screen is showing.
    fn handle_event(&mut self, event: &TuiEvent) -> bool {
        if let Some(session) = &mut self.session {
            session.state.error_visible = session.view.state().is_error_visible();
            let action = session
                .state
                .handle_event(event)
                .and_then(|e| session.handle(e));
            return action.is_some_and(|a| self.dispatch(a));
        }

        let Some(home_event) = self.tui.home.handle_event(event) else {
            return false;
        };
        let action = match home_event {
            HomeEvent::InputChanged(text) => Action::SetInput(text),
            HomeEvent::Submit => Action::Submit,
            HomeEvent::OpenQuickLink(i) => Action::OpenQuickLink(i),
            HomeEvent::Clear => Action::ClearInput,
            HomeEvent::Quit => Action::Quit,
        };
        self.dispatch(action)
    }
}

/// Run the interface until the user quits. `initial_url`, if given, is
/// validated and opened straight away.
pub fn run(config: ResolvedConfig, initial_url: Option<String>) -> std::io::Result<()> {
    let mut app = App::from_config(&config);
    if let Some(url) = &initial_url {
        app.url_input = url.clone();
    }
    let tui = TuiState::new(&app, Chrome::from_config(&config));
    let mut host = Host {
        app,
        tui,
        session: None,
        config,
        runtime: Handle::current(),
    };

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = match TerminalModeGuard::new() {
        Ok(guard) => Some(guard),
        Err(e) => {
            warn!("Could not enable terminal modes: {}", e);
            None
        }
    };

    let mut should_quit = initial_url.is_some() && host.dispatch(Action::Submit);

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    while !should_quit {
        let now = Instant::now();
        let animating = host.session.as_ref().is_some_and(|s| s.is_animating(now));
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            let Host {
                app, tui, session, ..
            } = &mut host;
            terminal.draw(|f| ui::draw_ui(f, app, tui, session.as_mut(), now, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(50)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain all pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            match event {
                TuiEvent::Resize => {}
                TuiEvent::ForceQuit => should_quit = host.dispatch(Action::Quit),
                _ => should_quit = host.handle_event(&event),
            }
            if should_quit {
                break;
            }
        }

        // Engine notifications, applied on this thread only
        if let Some(session) = &mut host.session
            && session.pump(Instant::now())
        {
            needs_redraw = true;
        }
    }

    // Engine and adapter go before the terminal is restored.
    host.session = None;
    ratatui::restore();
    info!("Exiting");
    Ok(())
}
