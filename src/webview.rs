//! # WebView Adapter
//!
//! Binds one [`BrowserEngine`] to one [`NavigationState`].
//!
//! The engine reports what happened as [`EngineEvent`]s; `handle_event` is
//! the single dispatcher that turns each one into a state transition. Hosts
//! drain the event channel on the UI thread and feed every event here, so
//! the state has exactly one writer.
//!
//! ```text
//!   engine thread(s)             UI thread
//!   ───────────────              ─────────────────────────────────────
//!   EngineEvent ──mpsc──▶  WebView::handle_event ──▶ NavigationState
//!                                    │
//!                                    └──▶ Option<WebViewEvent> (to host)
//! ```
//!
//! ## Load gating
//!
//! `update(target)` only reaches the engine when `target` differs from the
//! last URL this adapter issued, so re-rendering the host with the same
//! target never reloads the page.

use log::{debug, info, warn};
use tokio::runtime::Handle;
use url::Url;

use crate::core::address::TargetUrl;
use crate::core::nav_error::{NavError, classify};
use crate::core::state::{ContentSize, NavigationState};
use crate::engine::{
    BrowserEngine, EngineEvent, EventSink, ExternalOpener, NavigationAction, NavigationType,
    PolicyDecision, Property, PropertyChange, SCROLL_HEIGHT_SCRIPT, SCROLL_WIDTH_SCRIPT,
};

pub const PROCESS_TERMINATED_MESSAGE: &str = "Web content process terminated. Please reload.";

#[derive(Debug, Clone)]
pub struct WebViewOptions {
    /// Hand cross-host link activations to the system browser.
    pub open_external_links: bool,
}

impl Default for WebViewOptions {
    fn default() -> Self {
        Self {
            open_external_links: true,
        }
    }
}

/// Notifications for the host, returned from [`WebView::handle_event`].
#[derive(Debug, Clone, PartialEq)]
pub enum WebViewEvent {
    NavigationFailed(NavError),
    NavigationFinished,
    ContentSizeChanged(ContentSize),
}

pub struct WebView<E: BrowserEngine> {
    engine: E,
    opener: Box<dyn ExternalOpener>,
    options: WebViewOptions,
    state: NavigationState,
    sink: EventSink,
    initial_target: TargetUrl,
    last_issued: Option<TargetUrl>,
    observed: Vec<Property>,
    attached: bool,
}

impl<E: BrowserEngine> WebView<E> {
    /// Attach to `engine`, start observing it, and issue the initial load.
    ///
    /// `sink` is the sending half of the channel the host drains on its UI
    /// thread.
    pub fn create(
        target: TargetUrl,
        mut engine: E,
        opener: Box<dyn ExternalOpener>,
        options: WebViewOptions,
        sink: EventSink,
    ) -> Self {
        engine.set_event_sink(Some(sink.clone()));
        for property in Property::ALL {
            engine.observe(property);
        }
        info!("WebView created for {}", target);

        let mut view = Self {
            engine,
            opener,
            options,
            state: NavigationState::new(),
            sink,
            initial_target: target.clone(),
            last_issued: None,
            observed: Property::ALL.to_vec(),
            attached: true,
        };
        view.update(&target);
        view
    }

    /// Point the engine at `target`, unless that is already the last URL
    /// issued. Returns whether a load was issued.
    pub fn update(&mut self, target: &TargetUrl) -> bool {
        if self.last_issued.as_ref() == Some(target) {
            debug!("update: {} already issued, skipping load", target);
            return false;
        }
        self.last_issued = Some(target.clone());
        self.engine.load(target.url());
        true
    }

    /// Release every engine subscription. Safe to call more than once.
    pub fn dispose(&mut self) {
        for property in self.observed.drain(..) {
            self.engine.unobserve(property);
        }
        if self.attached {
            self.engine.set_event_sink(None);
            self.attached = false;
            debug!("WebView disposed");
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn last_issued(&self) -> Option<&TargetUrl> {
        self.last_issued.as_ref()
    }

    /// Apply one engine notification to the state.
    pub fn handle_event(&mut self, event: EngineEvent) -> Option<WebViewEvent> {
        debug!("WebView event: {:?}", event);
        match event {
            EngineEvent::NavigationStarted => {
                self.state.is_loading = true;
                self.state.clear_error();
                // Progress is left alone so sub-navigations don't flicker the bar.
                None
            }
            EngineEvent::NavigationCommitted => {
                self.state.clear_error();
                None
            }
            EngineEvent::NavigationFinished => {
                self.state.is_loading = false;
                self.state.clear_error();
                self.measure_content_size();
                Some(WebViewEvent::NavigationFinished)
            }
            EngineEvent::NavigationFailed(error)
            | EngineEvent::ProvisionalNavigationFailed(error) => self.handle_failure(error),
            EngineEvent::ContentProcessTerminated => {
                warn!("Web content process terminated");
                self.state.set_error(PROCESS_TERMINATED_MESSAGE);
                self.state.is_loading = false;
                None
            }
            EngineEvent::PropertyChanged(change) => {
                self.apply_property(change);
                None
            }
            EngineEvent::PolicyRequested(action) => {
                let decision = if action.navigation_type == NavigationType::LinkActivated
                    && self.open_externally(&action.url)
                {
                    PolicyDecision::Cancel
                } else {
                    PolicyDecision::Allow
                };
                self.engine.resolve_policy(&action, decision);
                None
            }
            EngineEvent::NewWindowRequested(action) => {
                // Single surface: anything not sent out loads right here.
                let decision = if self.open_externally(&action.url) {
                    PolicyDecision::Cancel
                } else {
                    PolicyDecision::Allow
                };
                self.engine.resolve_policy(&action, decision);
                None
            }
            EngineEvent::ContentSizeMeasured(size) => Some(WebViewEvent::ContentSizeChanged(size)),
        }
    }

    fn handle_failure(&mut self, error: NavError) -> Option<WebViewEvent> {
        let classification = classify(&error);
        self.state.is_loading = false;
        self.state.set_progress(0.0);

        if classification.is_transient_cancellation {
            debug!("Ignoring cancelled navigation");
            return None;
        }

        warn!(
            "WebView error: {} | code: {} | domain: {}",
            error.description.as_deref().unwrap_or("(no description)"),
            error.code(),
            error.domain
        );
        self.state.set_error(classification.message);
        Some(WebViewEvent::NavigationFailed(error))
    }

    fn apply_property(&mut self, change: PropertyChange) {
        match change {
            PropertyChange::Progress(p) => self.state.set_progress(p),
            PropertyChange::CanGoBack(b) => self.state.can_go_back = b,
            PropertyChange::CanGoForward(b) => self.state.can_go_forward = b,
            PropertyChange::Title(t) => self.state.page_title = t,
        }
    }

    /// Open `url` in the system browser if the external-link policy says so.
    /// Returns `true` when the URL was handed off.
    fn open_externally(&self, url: &Url) -> bool {
        if !self.options.open_external_links {
            return false;
        }
        let current = self.engine.current_url();
        let current_host = current.as_ref().and_then(|u| u.host_str());
        if url.host_str() == current_host || !self.opener.can_open(url) {
            return false;
        }
        match self.opener.open(url) {
            Ok(()) => true,
            Err(e) => {
                warn!("External open failed, loading in place: {}", e);
                false
            }
        }
    }

    /// Read back the document's size: width, then height, one after the
    /// other. Best effort: any failure just means no report.
    fn measure_content_size(&self) {
        let Ok(runtime) = Handle::try_current() else {
            debug!("No async runtime, skipping content size measurement");
            return;
        };
        let evaluator = self.engine.script_evaluator();
        let sink = self.sink.clone();
        runtime.spawn(async move {
            let width = evaluator.evaluate(SCROLL_WIDTH_SCRIPT).await;
            let height = evaluator.evaluate(SCROLL_HEIGHT_SCRIPT).await;
            match (width, height) {
                (Ok(w), Ok(h)) => {
                    if let (Some(width), Some(height)) = (w.as_f64(), h.as_f64()) {
                        let _ = sink.send(EngineEvent::ContentSizeMeasured(ContentSize {
                            width,
                            height,
                        }));
                    }
                }
                (w, h) => debug!("Content size unavailable: {:?} / {:?}", w.err(), h.err()),
            }
        });
    }

    // ========================================================================
    // User actions
    // ========================================================================

    /// Error-overlay Retry (and toolbar reload): stop if loading, else reload.
    pub fn retry(&mut self) {
        self.state.clear_error();
        if self.state.is_loading {
            self.engine.stop();
        } else {
            self.engine.reload();
        }
    }

    pub fn dismiss_error(&mut self) {
        self.state.clear_error();
    }

    pub fn go_back(&mut self) {
        self.engine.go_back();
        self.state.clear_error();
    }

    pub fn go_forward(&mut self) {
        self.engine.go_forward();
        self.state.clear_error();
    }

    /// Hand the current page (or the initial target) to the system browser.
    pub fn open_in_browser(&self) {
        let url = self
            .engine
            .current_url()
            .unwrap_or_else(|| self.initial_target.url().clone());
        if let Err(e) = self.opener.open(&url) {
            warn!("Failed to open {} externally: {}", url, e);
        }
    }

    /// Start the bar from zero when a fresh load begins.
    pub fn reset_progress(&mut self) {
        self.state.set_progress(0.0);
    }
}

impl<E: BrowserEngine> Drop for WebView<E> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::address::validate;
    use crate::core::nav_error::NavErrorKind;
    use crate::test_support::{MockEngine, MockOpener};
    use std::sync::mpsc::{Receiver, channel};
    use std::time::Duration;

    fn target(s: &str) -> TargetUrl {
        validate(s).unwrap()
    }

    fn make_view(s: &str) -> (WebView<MockEngine>, MockOpener, Receiver<EngineEvent>) {
        let opener = MockOpener::new();
        let (tx, rx) = channel();
        let view = WebView::create(
            target(s),
            MockEngine::new(),
            Box::new(opener.clone()),
            WebViewOptions::default(),
            tx,
        );
        (view, opener, rx)
    }

    fn assert_invariant(view: &WebView<MockEngine>) {
        let state = view.state();
        assert_eq!(
            state.is_error_visible(),
            state.error_message().is_some_and(|m| !m.is_empty())
        );
    }

    #[test]
    fn test_create_loads_and_observes() {
        let (view, _, _rx) = make_view("example.com");
        assert_eq!(view.engine().loads.len(), 1);
        assert_eq!(view.engine().loads[0].as_str(), "https://example.com/");
        assert!(view.engine().sink.is_some());
        assert_eq!(view.engine().observed.len(), 4);
        assert_eq!(*view.state(), NavigationState::new());
    }

    #[test]
    fn test_update_same_target_issues_one_load() {
        let (mut view, _, _rx) = make_view("example.com");
        assert!(!view.update(&target("example.com")));
        assert!(!view.update(&target("https://example.com")));
        assert_eq!(view.engine().loads.len(), 1);

        assert!(view.update(&target("example.org")));
        assert_eq!(view.engine().loads.len(), 2);
        assert_eq!(view.last_issued().unwrap().as_str(), "https://example.org");
    }

    #[test]
    fn test_trailing_slash_is_a_different_target() {
        let (mut view, _, _rx) = make_view("example.com");
        assert!(view.update(&target("example.com/")));
        assert_eq!(view.engine().loads.len(), 2);
        assert!(!view.update(&target("https://example.com/")));
        assert_eq!(view.engine().loads.len(), 2);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let (mut view, _, _rx) = make_view("example.com");
        view.dispose();
        assert!(view.engine().observed.is_empty());
        assert!(view.engine().sink.is_none());
        assert_eq!(view.engine().unobserve_calls, 4);

        view.dispose();
        assert_eq!(view.engine().unobserve_calls, 4);
    }

    #[test]
    fn test_load_scenario_started_then_finished() {
        let (mut view, _, _rx) = make_view("apple.com");
        assert_eq!(view.engine().loads[0].as_str(), "https://apple.com/");

        assert_eq!(view.handle_event(EngineEvent::NavigationStarted), None);
        assert!(view.state().is_loading);
        assert_invariant(&view);

        view.handle_event(EngineEvent::NavigationCommitted);
        let out = view.handle_event(EngineEvent::NavigationFinished);
        assert_eq!(out, Some(WebViewEvent::NavigationFinished));
        assert!(!view.state().is_loading);
        assert!(view.state().error_message().is_none());
        assert_invariant(&view);
    }

    #[test]
    fn test_started_keeps_progress_and_clears_error() {
        let (mut view, _, _rx) = make_view("example.com");
        view.handle_event(EngineEvent::PropertyChanged(PropertyChange::Progress(0.6)));
        view.handle_event(EngineEvent::ContentProcessTerminated);
        assert!(view.state().is_error_visible());

        view.handle_event(EngineEvent::NavigationStarted);
        assert_eq!(view.state().progress, 0.6);
        assert!(!view.state().is_error_visible());
        assert_invariant(&view);
    }

    #[test]
    fn test_host_not_found_shows_error() {
        let (mut view, _, _rx) = make_view("nowhere.invalid");
        view.handle_event(EngineEvent::NavigationStarted);
        let error = NavError::network(NavErrorKind::CannotFindHost);
        let out = view.handle_event(EngineEvent::ProvisionalNavigationFailed(error.clone()));

        assert_eq!(out, Some(WebViewEvent::NavigationFailed(error)));
        assert_eq!(
            view.state().error_message(),
            Some("Cannot find the server. Please check the URL.")
        );
        assert!(view.state().is_error_visible());
        assert!(!view.state().is_loading);
        assert_invariant(&view);
    }

    #[test]
    fn test_cancellation_never_shows_error() {
        let (mut view, _, _rx) = make_view("example.com");
        view.handle_event(EngineEvent::NavigationStarted);
        view.handle_event(EngineEvent::PropertyChanged(PropertyChange::Progress(0.4)));

        for event in [
            EngineEvent::NavigationFailed(NavError::cancelled()),
            EngineEvent::ProvisionalNavigationFailed(NavError::cancelled()),
        ] {
            assert_eq!(view.handle_event(event), None);
            assert!(!view.state().is_error_visible());
            assert!(!view.state().is_loading);
            assert_eq!(view.state().progress, 0.0);
            assert_invariant(&view);
        }
    }

    #[test]
    fn test_process_terminated() {
        let (mut view, _, _rx) = make_view("example.com");
        view.handle_event(EngineEvent::NavigationStarted);
        view.handle_event(EngineEvent::ContentProcessTerminated);
        assert_eq!(view.state().error_message(), Some(PROCESS_TERMINATED_MESSAGE));
        assert!(!view.state().is_loading);
        assert_invariant(&view);
    }

    #[test]
    fn test_property_changes_copy_into_state() {
        let (mut view, _, _rx) = make_view("example.com");
        view.handle_event(EngineEvent::PropertyChanged(PropertyChange::Progress(0.25)));
        view.handle_event(EngineEvent::PropertyChanged(PropertyChange::CanGoBack(true)));
        view.handle_event(EngineEvent::PropertyChanged(PropertyChange::CanGoForward(true)));
        view.handle_event(EngineEvent::PropertyChanged(PropertyChange::Title(Some("Docs".into()))));

        let state = view.state();
        assert_eq!(state.progress, 0.25);
        assert!(state.can_go_back && state.can_go_forward);
        assert_eq!(state.page_title.as_deref(), Some("Docs"));
    }

    #[test]
    fn test_retry_while_loading_stops() {
        let (mut view, _, _rx) = make_view("example.com");
        view.handle_event(EngineEvent::NavigationStarted);
        view.retry();
        assert_eq!(view.engine().stops, 1);
        assert_eq!(view.engine().reloads, 0);
    }

    #[test]
    fn test_retry_when_idle_reloads_and_clears_error() {
        let (mut view, _, _rx) = make_view("example.com");
        view.handle_event(EngineEvent::ProvisionalNavigationFailed(NavError::network(
            NavErrorKind::TimedOut,
        )));
        assert!(view.state().is_error_visible());

        view.retry();
        assert_eq!(view.engine().reloads, 1);
        assert_eq!(view.engine().stops, 0);
        assert!(!view.state().is_error_visible());
        assert_invariant(&view);
    }

    #[test]
    fn test_back_forward_clear_error() {
        let (mut view, _, _rx) = make_view("example.com");
        view.handle_event(EngineEvent::ContentProcessTerminated);
        view.go_back();
        assert!(!view.state().is_error_visible());
        view.handle_event(EngineEvent::ContentProcessTerminated);
        view.go_forward();
        assert!(!view.state().is_error_visible());
        assert_eq!((view.engine().backs, view.engine().forwards), (1, 1));
    }

    #[test]
    fn test_dismiss_error() {
        let (mut view, _, _rx) = make_view("example.com");
        view.handle_event(EngineEvent::ContentProcessTerminated);
        view.dismiss_error();
        assert!(!view.state().is_error_visible());
        assert_invariant(&view);
    }

    fn link(url: &str) -> NavigationAction {
        NavigationAction {
            url: Url::parse(url).unwrap(),
            navigation_type: NavigationType::LinkActivated,
            has_target_frame: true,
        }
    }

    #[test]
    fn test_cross_host_link_opens_externally() {
        let (mut view, opener, _rx) = make_view("example.com");
        view.handle_event(EngineEvent::PolicyRequested(link("https://other.org/page")));

        assert_eq!(opener.opened(), vec![Url::parse("https://other.org/page").unwrap()]);
        assert_eq!(view.engine().policy.last().unwrap().1, PolicyDecision::Cancel);
    }

    #[test]
    fn test_same_host_link_stays_in_surface() {
        let (mut view, opener, _rx) = make_view("example.com");
        view.handle_event(EngineEvent::PolicyRequested(link("https://example.com/other")));

        assert!(opener.opened().is_empty());
        assert_eq!(view.engine().policy.last().unwrap().1, PolicyDecision::Allow);
    }

    #[test]
    fn test_non_link_navigation_always_allowed() {
        let (mut view, opener, _rx) = make_view("example.com");
        let mut action = link("https://other.org/");
        action.navigation_type = NavigationType::Other;
        view.handle_event(EngineEvent::PolicyRequested(action));

        assert!(opener.opened().is_empty());
        assert_eq!(view.engine().policy.last().unwrap().1, PolicyDecision::Allow);
    }

    #[test]
    fn test_external_links_disabled() {
        let opener = MockOpener::new();
        let (tx, _rx) = channel();
        let mut view = WebView::create(
            target("example.com"),
            MockEngine::new(),
            Box::new(opener.clone()),
            WebViewOptions {
                open_external_links: false,
            },
            tx,
        );
        view.handle_event(EngineEvent::PolicyRequested(link("https://other.org/")));
        assert!(opener.opened().is_empty());
        assert_eq!(view.engine().policy.last().unwrap().1, PolicyDecision::Allow);
    }

    #[test]
    fn test_new_window_follows_host_rule() {
        let (mut view, opener, _rx) = make_view("example.com");
        let mut same = link("https://example.com/popup");
        same.has_target_frame = false;
        view.handle_event(EngineEvent::NewWindowRequested(same));
        assert_eq!(view.engine().policy.last().unwrap().1, PolicyDecision::Allow);

        let mut other = link("https://other.org/popup");
        other.has_target_frame = false;
        view.handle_event(EngineEvent::NewWindowRequested(other));
        assert_eq!(view.engine().policy.last().unwrap().1, PolicyDecision::Cancel);
        assert_eq!(opener.opened().len(), 1);
    }

    #[test]
    fn test_opener_refusal_loads_in_place() {
        let opener = MockOpener::refusing();
        let (tx, _rx) = channel();
        let mut view = WebView::create(
            target("example.com"),
            MockEngine::new(),
            Box::new(opener.clone()),
            WebViewOptions::default(),
            tx,
        );
        view.handle_event(EngineEvent::PolicyRequested(link("https://other.org/")));
        assert_eq!(view.engine().policy.last().unwrap().1, PolicyDecision::Allow);
    }

    #[test]
    fn test_open_in_browser_uses_current_or_initial() {
        let (mut view, opener, _rx) = make_view("example.com");
        view.engine_mut().current = None;
        view.open_in_browser();
        assert_eq!(opener.opened()[0].as_str(), "https://example.com/");

        view.engine_mut().current = Some(Url::parse("https://example.com/deeper").unwrap());
        view.open_in_browser();
        assert_eq!(opener.opened()[1].path(), "/deeper");
    }

    #[test]
    fn test_content_size_measured_event_passes_through() {
        let (mut view, _, _rx) = make_view("example.com");
        let size = ContentSize { width: 10.0, height: 20.0 };
        assert_eq!(
            view.handle_event(EngineEvent::ContentSizeMeasured(size)),
            Some(WebViewEvent::ContentSizeChanged(size))
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_finished_measures_width_then_height() {
        let (mut view, _, rx) = make_view("example.com");
        view.engine_mut().set_script_results(Some(640.0), Some(2000.0));
        view.handle_event(EngineEvent::NavigationFinished);

        let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(
            event,
            EngineEvent::ContentSizeMeasured(ContentSize { width: 640.0, height: 2000.0 })
        );
        assert_eq!(
            view.engine().evaluated_scripts(),
            vec![SCROLL_WIDTH_SCRIPT.to_string(), SCROLL_HEIGHT_SCRIPT.to_string()]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_measurement_is_silent() {
        let (mut view, _, rx) = make_view("example.com");
        view.engine_mut().set_script_results(Some(640.0), None);
        view.handle_event(EngineEvent::NavigationFinished);

        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
        // Height is still attempted after the width.
        assert_eq!(view.engine().evaluated_scripts().len(), 2);
    }
}
