//! Terminal browser engine: fetches with reqwest, renders to text lines.
//!
//! Each navigation runs in its own tokio task. A generation counter tags the
//! navigation that currently owns the surface, so a superseded or stopped
//! task can never publish results, even if it finishes before the abort
//! lands.
//!
//! ```text
//! load(url) ─▶ Started ─▶ GET ─▶ Committed ─▶ body chunks (Progress…) ─▶ Finished
//!                          │                        │
//!                          └─ ProvisionalFailed     └─ Failed
//! ```
//!
//! A panic inside the navigation task is reported as
//! `ContentProcessTerminated`, the closest thing this engine has to a
//! crashed content process.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::CONTENT_TYPE;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use url::Url;

use super::page::Page;
use super::{
    BrowserEngine, EngineEvent, EventSink, NavigationAction, NavigationType, PolicyDecision,
    Property, PropertyChange, SCROLL_HEIGHT_SCRIPT, SCROLL_WIDTH_SCRIPT, ScriptError,
    ScriptEvaluator, TITLE_SCRIPT, TextRendering,
};
use crate::core::nav_error::{NavError, NavErrorKind};

pub const DEFAULT_USER_AGENT: &str = concat!("webwrap/", env!("CARGO_PKG_VERSION"));

/// Progress reported as soon as a navigation starts.
const INITIAL_PROGRESS: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct HttpEngineOptions {
    pub user_agent: Option<String>,
    pub timeout: Duration,
}

impl Default for HttpEngineOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// How a finished navigation should touch the back/forward list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryMode {
    Push,
    Replace,
    Traverse(usize),
}

#[derive(Debug, Default)]
struct History {
    entries: Vec<Url>,
    index: Option<usize>,
}

impl History {
    fn current(&self) -> Option<&Url> {
        self.index.and_then(|i| self.entries.get(i))
    }

    fn commit(&mut self, url: Url, mode: HistoryMode) {
        match (mode, self.index) {
            (HistoryMode::Traverse(i), _) if i < self.entries.len() => {
                self.entries[i] = url;
                self.index = Some(i);
            }
            (HistoryMode::Replace, Some(i)) => self.entries[i] = url,
            _ => {
                let keep = self.index.map_or(0, |i| i + 1);
                self.entries.truncate(keep);
                self.entries.push(url);
                self.index = Some(self.entries.len() - 1);
            }
        }
    }

    fn back_target(&self) -> Option<(usize, Url)> {
        let i = self.index?.checked_sub(1)?;
        Some((i, self.entries[i].clone()))
    }

    fn forward_target(&self) -> Option<(usize, Url)> {
        let i = self.index? + 1;
        self.entries.get(i).map(|u| (i, u.clone()))
    }

    fn can_go_back(&self) -> bool {
        self.index.is_some_and(|i| i > 0)
    }

    fn can_go_forward(&self) -> bool {
        self.index.is_some_and(|i| i + 1 < self.entries.len())
    }
}

/// State shared between the engine and its navigation tasks.
#[derive(Default)]
struct Shared {
    sink: Option<EventSink>,
    observed: HashSet<Property>,
    history: History,
    page: Option<Page>,
    generation: u64,
    loading: bool,
    committed: bool,
    /// Latest navigation that hasn't reached history yet (failed, stopped or running).
    pending: Option<(Url, HistoryMode)>,
    progress: f64,
    title: Option<String>,
    can_go_back: bool,
    can_go_forward: bool,
}

impl Shared {
    fn emit(&self, event: EngineEvent) {
        if let Some(sink) = &self.sink
            && sink.send(event).is_err()
        {
            debug!("Engine event dropped: receiver gone");
        }
    }

    fn set_property(&mut self, change: PropertyChange) {
        let changed = match &change {
            PropertyChange::Progress(p) => replace_if_changed(&mut self.progress, *p),
            PropertyChange::CanGoBack(b) => replace_if_changed(&mut self.can_go_back, *b),
            PropertyChange::CanGoForward(b) => replace_if_changed(&mut self.can_go_forward, *b),
            PropertyChange::Title(t) => replace_if_changed(&mut self.title, t.clone()),
        };
        if changed && self.observed.contains(&change.property()) {
            self.emit(EngineEvent::PropertyChanged(change));
        }
    }

    fn sync_history_properties(&mut self) {
        let back = self.history.can_go_back();
        let forward = self.history.can_go_forward();
        self.set_property(PropertyChange::CanGoBack(back));
        self.set_property(PropertyChange::CanGoForward(forward));
    }

    /// End the current navigation with a failure.
    fn fail(&mut self, error: NavError) {
        self.loading = false;
        if self.committed {
            self.emit(EngineEvent::NavigationFailed(error));
        } else {
            self.emit(EngineEvent::ProvisionalNavigationFailed(error));
        }
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct HttpEngine {
    client: reqwest::Client,
    runtime: Handle,
    shared: Arc<Mutex<Shared>>,
    task: Option<AbortHandle>,
}

impl HttpEngine {
    pub fn new(options: &HttpEngineOptions, runtime: Handle) -> reqwest::Result<Self> {
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(options.timeout)
            .build()?;
        Ok(Self {
            client,
            runtime,
            shared: Arc::new(Mutex::new(Shared::default())),
            task: None,
        })
    }

    /// Run `f` against the currently displayed page.
    pub fn with_page<R>(&self, f: impl FnOnce(Option<&Page>) -> R) -> R {
        let shared = lock(&self.shared);
        f(shared.page.as_ref())
    }

    fn start_navigation(&mut self, url: Url, mode: HistoryMode) {
        self.cancel_in_flight();

        let generation = {
            let mut shared = lock(&self.shared);
            shared.generation += 1;
            shared.loading = true;
            shared.committed = false;
            shared.pending = Some((url.clone(), mode));
            shared.emit(EngineEvent::NavigationStarted);
            shared.set_property(PropertyChange::Progress(INITIAL_PROGRESS));
            shared.generation
        };

        info!("Navigating to {} ({:?})", url, mode);
        let navigation = self.runtime.spawn(run_navigation(
            self.client.clone(),
            self.shared.clone(),
            generation,
            url,
            mode,
        ));
        self.task = Some(navigation.abort_handle());

        let shared = self.shared.clone();
        self.runtime.spawn(async move {
            if let Err(e) = navigation.await
                && e.is_panic()
            {
                warn!("Navigation task crashed: {}", e);
                let mut shared = lock(&shared);
                if shared.generation == generation {
                    shared.loading = false;
                    shared.emit(EngineEvent::ContentProcessTerminated);
                }
            }
        });
    }

    /// Abort the running navigation, reporting it as cancelled.
    fn cancel_in_flight(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let mut shared = lock(&self.shared);
        if shared.loading {
            // Invalidate the aborted task's generation before it can publish.
            shared.generation += 1;
            shared.fail(NavError::cancelled().with_description("cancelled"));
        }
    }
}

impl Drop for HttpEngine {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl TextRendering for HttpEngine {
    fn page(&self) -> Option<Page> {
        self.with_page(|page| page.cloned())
    }

    fn follow_link(&mut self, number: usize) -> bool {
        let shared = lock(&self.shared);
        let Some(link) = shared.page.as_ref().and_then(|p| p.link(number)) else {
            return false;
        };
        let action = NavigationAction {
            url: link.url.clone(),
            navigation_type: NavigationType::LinkActivated,
            has_target_frame: !link.new_window,
        };
        debug!("Link {} activated: {}", number, action.url);
        if action.has_target_frame {
            shared.emit(EngineEvent::PolicyRequested(action));
        } else {
            shared.emit(EngineEvent::NewWindowRequested(action));
        }
        true
    }
}

impl BrowserEngine for HttpEngine {
    fn load(&mut self, url: &Url) {
        self.start_navigation(url.clone(), HistoryMode::Push);
    }

    fn stop(&mut self) {
        debug!("Stop requested");
        self.cancel_in_flight();
    }

    fn reload(&mut self) {
        let target = {
            let shared = lock(&self.shared);
            shared.pending.clone().or_else(|| {
                shared
                    .history
                    .current()
                    .map(|url| (url.clone(), HistoryMode::Replace))
            })
        };
        match target {
            Some((url, mode)) => self.start_navigation(url, mode),
            None => debug!("Reload ignored: nothing loaded"),
        }
    }

    fn go_back(&mut self) {
        let target = lock(&self.shared).history.back_target();
        if let Some((index, url)) = target {
            self.start_navigation(url, HistoryMode::Traverse(index));
        }
    }

    fn go_forward(&mut self) {
        let target = lock(&self.shared).history.forward_target();
        if let Some((index, url)) = target {
            self.start_navigation(url, HistoryMode::Traverse(index));
        }
    }

    fn current_url(&self) -> Option<Url> {
        lock(&self.shared).history.current().cloned()
    }

    fn is_loading(&self) -> bool {
        lock(&self.shared).loading
    }

    fn set_event_sink(&mut self, sink: Option<EventSink>) {
        lock(&self.shared).sink = sink;
    }

    fn observe(&mut self, property: Property) {
        lock(&self.shared).observed.insert(property);
    }

    fn unobserve(&mut self, property: Property) {
        lock(&self.shared).observed.remove(&property);
    }

    fn resolve_policy(&mut self, action: &NavigationAction, decision: PolicyDecision) {
        match decision {
            PolicyDecision::Allow => self.load(&action.url),
            PolicyDecision::Cancel => debug!("Navigation to {} cancelled by policy", action.url),
        }
    }

    fn script_evaluator(&self) -> Arc<dyn ScriptEvaluator> {
        Arc::new(PageScripts {
            shared: self.shared.clone(),
        })
    }
}

async fn run_navigation(
    client: reqwest::Client,
    shared: Arc<Mutex<Shared>>,
    generation: u64,
    url: Url,
    mode: HistoryMode,
) {
    let mut response = match client.get(url.clone()).send().await {
        Ok(r) => r,
        Err(e) => {
            let mut s = lock(&shared);
            if s.generation == generation {
                s.fail(nav_error_from(&e));
            }
            return;
        }
    };

    {
        let mut s = lock(&shared);
        if s.generation != generation {
            return;
        }
        s.committed = true;
        s.emit(EngineEvent::NavigationCommitted);
    }

    debug!("Response {} for {}", response.status(), url);
    let final_url = response.url().clone();
    let total = response.content_length().filter(|&n| n > 0);
    let is_html = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_none_or(|ct| ct.contains("html"));

    let mut body = Vec::new();
    let mut progress = INITIAL_PROGRESS;
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                body.extend_from_slice(&chunk);
                progress = match total {
                    Some(total) => INITIAL_PROGRESS + 0.8 * (body.len() as f64 / total as f64).min(1.0),
                    None => progress + (0.9 - progress) * 0.1,
                };
                let mut s = lock(&shared);
                if s.generation != generation {
                    return;
                }
                s.set_property(PropertyChange::Progress(progress));
            }
            Ok(None) => break,
            Err(e) => {
                let mut s = lock(&shared);
                if s.generation == generation {
                    s.fail(nav_error_from(&e));
                }
                return;
            }
        }
    }

    let text = String::from_utf8_lossy(&body);
    let page = if is_html {
        Page::from_html(final_url.clone(), &text)
    } else {
        Page::from_text(final_url.clone(), &text)
    };

    let mut s = lock(&shared);
    if s.generation != generation {
        return;
    }
    info!(
        "Loaded {} ({} bytes, {} lines, {} links)",
        final_url,
        body.len(),
        page.lines.len(),
        page.links.len()
    );
    let title = page.title.clone();
    s.history.commit(final_url, mode);
    s.pending = None;
    s.page = Some(page);
    s.loading = false;
    s.set_property(PropertyChange::Title(title));
    s.sync_history_properties();
    s.set_property(PropertyChange::Progress(1.0));
    s.emit(EngineEvent::NavigationFinished);
}

/// Map a reqwest failure onto the navigation error vocabulary.
///
/// reqwest exposes only a few predicates, so the finer kinds come from the
/// text of the source chain (hyper / rustls / OS messages).
pub fn nav_error_from(err: &reqwest::Error) -> NavError {
    let mut chain = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(e) = source {
        chain.push_str(": ");
        chain.push_str(&e.to_string());
        source = e.source();
    }
    let chain = chain.to_lowercase();

    let kind = if err.is_timeout() {
        NavErrorKind::TimedOut
    } else if ["dns error", "failed to lookup address", "name or service not known", "nodename nor servname"]
        .iter()
        .any(|s| chain.contains(s))
    {
        NavErrorKind::CannotFindHost
    } else if chain.contains("certificate") {
        if chain.contains("expired") {
            NavErrorKind::CertificateHasBadDate
        } else if chain.contains("notvalidyet") || chain.contains("not valid yet") {
            NavErrorKind::CertificateNotYetValid
        } else if chain.contains("unknownissuer") || chain.contains("unknown issuer") {
            NavErrorKind::CertificateHasUnknownRoot
        } else {
            NavErrorKind::CertificateUntrusted
        }
    } else if chain.contains("tls") || chain.contains("handshake") || chain.contains("ssl") {
        NavErrorKind::SecureConnectionFailed
    } else if chain.contains("network is unreachable") {
        NavErrorKind::NotConnectedToInternet
    } else if err.is_connect() {
        NavErrorKind::CannotConnectToHost
    } else if err.is_body()
        || err.is_decode()
        || chain.contains("connection reset")
        || chain.contains("connection closed")
    {
        NavErrorKind::NetworkConnectionLost
    } else {
        NavErrorKind::Other(-1)
    };

    debug!("Classified {:?} from: {}", kind, chain);
    NavError::network(kind).with_description(err.to_string())
}

/// The handful of expressions the text engine can answer.
struct PageScripts {
    shared: Arc<Mutex<Shared>>,
}

#[async_trait]
impl ScriptEvaluator for PageScripts {
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, ScriptError> {
        let shared = lock(&self.shared);
        let page = shared.page.as_ref().ok_or(ScriptError::NoDocument)?;
        match script.trim().trim_end_matches(';') {
            SCROLL_WIDTH_SCRIPT => Ok(serde_json::json!(page.content_size().width)),
            SCROLL_HEIGHT_SCRIPT => Ok(serde_json::json!(page.content_size().height)),
            TITLE_SCRIPT => Ok(serde_json::json!(page.title.clone().unwrap_or_default())),
            other => Err(ScriptError::Unsupported(other.to_string())),
        }
    }
}
