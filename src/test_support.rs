//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url::Url;

use crate::engine::{
    BrowserEngine, EventSink, ExternalOpener, NavigationAction, OpenError, PolicyDecision,
    Page, Property, SCROLL_HEIGHT_SCRIPT, SCROLL_WIDTH_SCRIPT, ScriptError, ScriptEvaluator,
    TextRendering,
};

#[derive(Default)]
struct ScriptLog {
    width: Option<f64>,
    height: Option<f64>,
    evaluated: Vec<String>,
}

/// Answers the scroll-size scripts with canned values and records every call.
struct MockEvaluator {
    log: Arc<Mutex<ScriptLog>>,
}

#[async_trait]
impl ScriptEvaluator for MockEvaluator {
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, ScriptError> {
        let mut log = self.log.lock().unwrap();
        log.evaluated.push(script.to_string());
        let value = match script {
            SCROLL_WIDTH_SCRIPT => log.width,
            SCROLL_HEIGHT_SCRIPT => log.height,
            _ => return Err(ScriptError::Unsupported(script.to_string())),
        };
        value
            .map(serde_json::Value::from)
            .ok_or(ScriptError::NoDocument)
    }
}

/// A browser engine that records every call and emits nothing on its own.
///
/// Tests drive navigation by feeding `EngineEvent`s to the adapter directly.
#[derive(Default)]
pub struct MockEngine {
    pub loads: Vec<Url>,
    pub stops: usize,
    pub reloads: usize,
    pub backs: usize,
    pub forwards: usize,
    pub unobserve_calls: usize,
    pub observed: HashSet<Property>,
    pub sink: Option<EventSink>,
    pub policy: Vec<(NavigationAction, PolicyDecision)>,
    pub current: Option<Url>,
    pub loading: bool,
    /// Page handed out by `TextRendering::page`.
    pub page: Option<Page>,
    pub followed: Vec<usize>,
    scripts: Arc<Mutex<ScriptLog>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_script_results(&mut self, width: Option<f64>, height: Option<f64>) {
        let mut log = self.scripts.lock().unwrap();
        log.width = width;
        log.height = height;
    }

    pub fn evaluated_scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().evaluated.clone()
    }
}

impl BrowserEngine for MockEngine {
    fn load(&mut self, url: &Url) {
        self.loads.push(url.clone());
        self.current = Some(url.clone());
        self.loading = true;
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.loading = false;
    }

    fn reload(&mut self) {
        self.reloads += 1;
    }

    fn go_back(&mut self) {
        self.backs += 1;
    }

    fn go_forward(&mut self) {
        self.forwards += 1;
    }

    fn current_url(&self) -> Option<Url> {
        self.current.clone()
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn set_event_sink(&mut self, sink: Option<EventSink>) {
        self.sink = sink;
    }

    fn observe(&mut self, property: Property) {
        self.observed.insert(property);
    }

    fn unobserve(&mut self, property: Property) {
        self.unobserve_calls += 1;
        self.observed.remove(&property);
    }

    fn resolve_policy(&mut self, action: &NavigationAction, decision: PolicyDecision) {
        self.policy.push((action.clone(), decision));
        if decision == PolicyDecision::Allow {
            self.load(&action.url);
        }
    }

    fn script_evaluator(&self) -> Arc<dyn ScriptEvaluator> {
        Arc::new(MockEvaluator {
            log: Arc::clone(&self.scripts),
        })
    }
}

impl TextRendering for MockEngine {
    fn page(&self) -> Option<Page> {
        self.page.clone()
    }

    fn follow_link(&mut self, number: usize) -> bool {
        self.followed.push(number);
        self.page.as_ref().is_some_and(|p| p.link(number).is_some())
    }
}

/// Records URLs instead of launching a browser.
#[derive(Clone)]
pub struct MockOpener {
    opened: Arc<Mutex<Vec<Url>>>,
    accepts: bool,
}

impl MockOpener {
    pub fn new() -> Self {
        Self {
            opened: Arc::new(Mutex::new(Vec::new())),
            accepts: true,
        }
    }

    /// An opener with no handler for anything.
    pub fn refusing() -> Self {
        Self {
            accepts: false,
            ..Self::new()
        }
    }

    pub fn opened(&self) -> Vec<Url> {
        self.opened.lock().unwrap().clone()
    }
}

impl ExternalOpener for MockOpener {
    fn can_open(&self, _url: &Url) -> bool {
        self.accepts
    }

    fn open(&self, url: &Url) -> Result<(), OpenError> {
        if !self.accepts {
            return Err(OpenError::Unsupported(url.to_string()));
        }
        self.opened.lock().unwrap().push(url.clone());
        Ok(())
    }
}
