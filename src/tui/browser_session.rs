//! # Browser Session
//!
//! Everything that exists only while the browser screen is presented: the
//! `WebView` adapter, the receiving end of its engine channel, the eased
//! progress bar and the screen's presentation state.
//!
//! Dropping the session disposes the adapter and releases the engine, so
//! closing the screen tears down engine and state together.

use std::sync::mpsc::{Receiver, channel};
use std::time::Instant;

use log::{debug, info, warn};
use tokio::runtime::Handle;

use crate::core::action::Action;
use crate::core::address::TargetUrl;
use crate::core::config::ResolvedConfig;
use crate::core::nav_error::NavError;
use crate::core::state::ContentSize;
use crate::engine::http::HttpEngineOptions;
use crate::engine::{
    BrowserEngine, EngineEvent, ExternalOpener, HttpEngine, Page, SystemBrowser, TextRendering,
};
use crate::tui::components::{BrowserEvent, BrowserState, ProgressAnimation};
use crate::webview::{WebView, WebViewEvent, WebViewOptions};

pub struct BrowserSession<E: BrowserEngine + TextRendering> {
    pub view: WebView<E>,
    events: Receiver<EngineEvent>,
    pub state: BrowserState,
    pub progress: ProgressAnimation,
    /// Last fully loaded page; kept on screen through later failures.
    pub page: Option<Page>,
    pub content_size: Option<ContentSize>,
    pub last_error: Option<NavError>,
    was_loading: bool,
}

impl BrowserSession<HttpEngine> {
    /// Start an `HttpEngine` session on `target` using the resolved config.
    pub fn open(
        target: TargetUrl,
        config: &ResolvedConfig,
        runtime: Handle,
    ) -> reqwest::Result<Self> {
        let options = HttpEngineOptions {
            user_agent: config.user_agent.clone(),
            timeout: config.timeout,
        };
        let engine = HttpEngine::new(&options, runtime)?;
        Ok(Self::with_engine(
            target,
            engine,
            Box::new(SystemBrowser),
            WebViewOptions {
                open_external_links: config.open_external_links,
            },
        ))
    }
}

impl<E: BrowserEngine + TextRendering> BrowserSession<E> {
    pub fn with_engine(
        target: TargetUrl,
        engine: E,
        opener: Box<dyn ExternalOpener>,
        options: WebViewOptions,
    ) -> Self {
        info!("Presenting browser for {}", target);
        let (tx, rx) = channel();
        Self {
            view: WebView::create(target, engine, opener, options, tx),
            events: rx,
            state: BrowserState::new(),
            progress: ProgressAnimation::new(),
            page: None,
            content_size: None,
            last_error: None,
            was_loading: false,
        }
    }

    /// Point the open surface at a new target (no-op for the same one).
    pub fn navigate(&mut self, target: &TargetUrl) {
        self.view.update(target);
    }

    /// Apply every pending engine event. Returns whether anything arrived.
    pub fn pump(&mut self, now: Instant) -> bool {
        let mut changed = false;
        while let Ok(event) = self.events.try_recv() {
            changed = true;
            self.apply(event, now);
        }
        changed
    }

    pub fn apply(&mut self, event: EngineEvent, now: Instant) {
        match self.view.handle_event(event) {
            Some(WebViewEvent::NavigationFinished) => {
                self.page = self.view.engine().page();
                self.state.page_view.reset();
                self.last_error = None;
            }
            Some(WebViewEvent::NavigationFailed(error)) => {
                self.last_error = Some(error);
            }
            Some(WebViewEvent::ContentSizeChanged(size)) => {
                debug!("Content size: {}x{}", size.width, size.height);
                self.content_size = Some(size);
            }
            None => {}
        }
        self.sync_progress(now);
    }

    /// A fresh load (not-loading → loading) starts the bar from zero.
    fn sync_progress(&mut self, now: Instant) {
        let is_loading = self.view.state().is_loading;
        if is_loading && !self.was_loading {
            self.view.reset_progress();
            self.progress = ProgressAnimation::new();
        }
        self.was_loading = is_loading;
        self.progress.set_target(self.view.state().progress, now);
    }

    /// Carry out a browser-screen event. Returns the home-screen action it
    /// implies, if any.
    pub fn handle(&mut self, event: BrowserEvent) -> Option<Action> {
        debug!("Browser event: {:?}", event);
        match event {
            BrowserEvent::Close => return Some(Action::CloseBrowser),
            BrowserEvent::Back => self.view.go_back(),
            BrowserEvent::Forward => self.view.go_forward(),
            BrowserEvent::ReloadOrStop | BrowserEvent::Retry => self.view.retry(),
            BrowserEvent::DismissError => self.view.dismiss_error(),
            BrowserEvent::OpenExternal => self.view.open_in_browser(),
            BrowserEvent::FollowLink(number) => {
                if !self.view.engine_mut().follow_link(number) {
                    warn!("No link [{}] on this page", number);
                }
            }
        }
        None
    }

    /// Whether the screen needs frames even without input.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.view.state().is_loading || self.progress.is_animating(now)
    }

    /// Address shown in the title bar when the page has no title.
    pub fn address(&self) -> String {
        self.view
            .engine()
            .current_url()
            .map(|u| u.to_string())
            .or_else(|| self.view.last_issued().map(|t| t.to_string()))
            .unwrap_or_default()
    }
}
