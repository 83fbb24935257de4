//! # Browser Engine Boundary
//!
//! The browser engine is an external collaborator: it fetches, renders and
//! keeps history. The rest of webwrap talks to it only through the
//! [`BrowserEngine`] trait and listens to it only through [`EngineEvent`]s.
//!
//! ```text
//!  WebView adapter ──load/stop/reload/back/forward──▶ BrowserEngine
//!        ▲                                                 │
//!        └──────── EngineEvent (std mpsc, UI thread) ◀─────┘
//! ```
//!
//! Engines may produce events on any thread. They are only ever *applied*
//! on the UI thread, which drains the channel between frames.

pub mod http;
pub mod opener;
pub mod page;

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::Sender;

use async_trait::async_trait;
use url::Url;

use crate::core::nav_error::NavError;
use crate::core::state::ContentSize;

pub use http::HttpEngine;
pub use page::Page;
pub use opener::{ExternalOpener, OpenError, SystemBrowser};

/// Observable engine properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Progress,
    CanGoBack,
    CanGoForward,
    Title,
}

impl Property {
    pub const ALL: [Property; 4] = [
        Property::Progress,
        Property::CanGoBack,
        Property::CanGoForward,
        Property::Title,
    ];
}

/// A new value for an observed property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyChange {
    Progress(f64),
    CanGoBack(bool),
    CanGoForward(bool),
    Title(Option<String>),
}

impl PropertyChange {
    pub fn property(&self) -> Property {
        match self {
            PropertyChange::Progress(_) => Property::Progress,
            PropertyChange::CanGoBack(_) => Property::CanGoBack,
            PropertyChange::CanGoForward(_) => Property::CanGoForward,
            PropertyChange::Title(_) => Property::Title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationType {
    /// The user activated a link inside the page.
    LinkActivated,
    Other,
}

/// A navigation the engine wants permission for.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationAction {
    pub url: Url,
    pub navigation_type: NavigationType,
    /// `false` when the page asked for a new window (`target="_blank"`).
    pub has_target_frame: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Cancel,
}

/// Everything an engine can tell its adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    NavigationStarted,
    NavigationCommitted,
    NavigationFinished,
    NavigationFailed(NavError),
    ProvisionalNavigationFailed(NavError),
    ContentProcessTerminated,
    PropertyChanged(PropertyChange),
    /// Awaiting `BrowserEngine::resolve_policy`.
    PolicyRequested(NavigationAction),
    NewWindowRequested(NavigationAction),
    /// Posted by the adapter's own measurement task, not by engines.
    ContentSizeMeasured(ContentSize),
}

pub type EventSink = Sender<EngineEvent>;

pub const SCROLL_WIDTH_SCRIPT: &str = "document.body.scrollWidth";
pub const SCROLL_HEIGHT_SCRIPT: &str = "document.body.scrollHeight";
pub const TITLE_SCRIPT: &str = "document.title";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// The engine can't evaluate this expression.
    Unsupported(String),
    /// Nothing is loaded, or the page went away mid-evaluation.
    NoDocument,
    Engine(String),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Unsupported(script) => write!(f, "unsupported script: {script}"),
            ScriptError::NoDocument => write!(f, "no document loaded"),
            ScriptError::Engine(msg) => write!(f, "script engine error: {msg}"),
        }
    }
}

impl std::error::Error for ScriptError {}

/// Evaluates script expressions against the current document.
///
/// Split out of [`BrowserEngine`] so evaluation can run in a spawned task
/// while the engine itself stays on the UI thread.
#[async_trait]
pub trait ScriptEvaluator: Send + Sync {
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, ScriptError>;
}

pub trait BrowserEngine: Send {
    fn load(&mut self, url: &Url);
    fn stop(&mut self);
    /// Re-run the latest navigation if it never completed, else the current page.
    fn reload(&mut self);
    fn go_back(&mut self);
    fn go_forward(&mut self);
    fn current_url(&self) -> Option<Url>;
    fn is_loading(&self) -> bool;

    /// Install (or with `None`, remove) the navigation event sink.
    fn set_event_sink(&mut self, sink: Option<EventSink>);
    /// Start reporting changes of `property`. Observing twice is harmless.
    fn observe(&mut self, property: Property);
    /// Stop reporting changes of `property`. Unknown properties are ignored.
    fn unobserve(&mut self, property: Property);

    /// Answer a `PolicyRequested` / `NewWindowRequested` event.
    fn resolve_policy(&mut self, action: &NavigationAction, decision: PolicyDecision);

    fn script_evaluator(&self) -> Arc<dyn ScriptEvaluator>;
}

/// Engines whose output is a text [`Page`] the terminal can draw.
pub trait TextRendering {
    /// A snapshot of the page currently on screen.
    fn page(&self) -> Option<Page>;

    /// Activate link `number` on the current page, as a click would.
    ///
    /// Emits a policy request; the navigation happens only once the adapter
    /// answers through `resolve_policy`. Returns `false` for unknown links.
    fn follow_link(&mut self, number: usize) -> bool;
}
