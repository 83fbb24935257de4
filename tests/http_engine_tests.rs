use std::sync::mpsc::{Receiver, channel};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use url::Url;
use webwrap::core::nav_error::NavErrorKind;
use webwrap::engine::http::HttpEngineOptions;
use webwrap::engine::{
    BrowserEngine, EngineEvent, HttpEngine, NavigationType, Property, PropertyChange,
    TextRendering,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Engine observing every property, with its event channel.
fn create_engine(options: HttpEngineOptions) -> (HttpEngine, Receiver<EngineEvent>) {
    let (tx, rx) = channel();
    let mut engine = HttpEngine::new(&options, Handle::current()).unwrap();
    engine.set_event_sink(Some(tx));
    for property in Property::ALL {
        engine.observe(property);
    }
    (engine, rx)
}

fn is_terminal(event: &EngineEvent) -> bool {
    matches!(
        event,
        EngineEvent::NavigationFinished
            | EngineEvent::NavigationFailed(_)
            | EngineEvent::ProvisionalNavigationFailed(_)
            | EngineEvent::ContentProcessTerminated
    )
}

/// Collects events until the navigation finishes or fails.
async fn collect_navigation(rx: &Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut events = Vec::new();
    while Instant::now() < deadline {
        match rx.try_recv() {
            Ok(event) => {
                let done = is_terminal(&event);
                events.push(event);
                if done {
                    return events;
                }
            }
            Err(_) => tokio::time::sleep(Duration::from_millis(10)).await,
        }
    }
    panic!("navigation did not finish, got {:?}", events);
}

fn page_url(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), route)).unwrap()
}

async fn mount_html(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(html.to_string(), "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

// ============================================================================
// Successful Navigations
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_successful_load_event_sequence() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        "<html><head><title>Example Domain</title></head><body><p>Hello</p></body></html>",
    )
    .await;

    let (mut engine, rx) = create_engine(HttpEngineOptions::default());
    engine.load(&page_url(&server, "/"));
    assert!(engine.is_loading());

    let events = collect_navigation(&rx).await;
    assert_eq!(events[0], EngineEvent::NavigationStarted);
    assert_eq!(
        events[1],
        EngineEvent::PropertyChanged(PropertyChange::Progress(0.1))
    );
    assert!(events.contains(&EngineEvent::NavigationCommitted));
    assert!(events.contains(&EngineEvent::PropertyChanged(PropertyChange::Title(Some(
        "Example Domain".to_string()
    )))));
    assert!(events.contains(&EngineEvent::PropertyChanged(PropertyChange::Progress(1.0))));
    assert_eq!(events.last(), Some(&EngineEvent::NavigationFinished));

    let committed = events
        .iter()
        .position(|e| *e == EngineEvent::NavigationCommitted)
        .unwrap();
    assert!(committed > 0);

    assert!(!engine.is_loading());
    assert_eq!(engine.current_url(), Some(page_url(&server, "/")));
    let page = engine.page().unwrap();
    assert_eq!(page.title.as_deref(), Some("Example Domain"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unobserved_properties_are_not_reported() {
    let server = MockServer::start().await;
    mount_html(&server, "/", "<title>Quiet</title>").await;

    let (tx, rx) = channel();
    let mut engine = HttpEngine::new(&HttpEngineOptions::default(), Handle::current()).unwrap();
    engine.set_event_sink(Some(tx));
    engine.load(&page_url(&server, "/"));

    let events = collect_navigation(&rx).await;
    assert!(
        events
            .iter()
            .all(|e| !matches!(e, EngineEvent::PropertyChanged(_)))
    );
    assert_eq!(events.last(), Some(&EngineEvent::NavigationFinished));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_http_error_status_still_finishes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<h1>Not Found</h1>"))
        .mount(&server)
        .await;

    let (mut engine, rx) = create_engine(HttpEngineOptions::default());
    engine.load(&page_url(&server, "/missing"));

    let events = collect_navigation(&rx).await;
    assert!(events.contains(&EngineEvent::NavigationCommitted));
    assert_eq!(events.last(), Some(&EngineEvent::NavigationFinished));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_plain_text_body_is_rendered_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<b>not markup</b>", "text/plain"),
        )
        .mount(&server)
        .await;

    let (mut engine, rx) = create_engine(HttpEngineOptions::default());
    engine.load(&page_url(&server, "/notes.txt"));
    collect_navigation(&rx).await;

    let page = engine.page().unwrap();
    assert!(page.lines.iter().any(|l| l.text.contains("<b>not markup</b>")));
}

// ============================================================================
// Links and History
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_follow_link_requests_policy_decision() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<a href="/next">Next</a> <a href="https://other.example/" target="_blank">Away</a>"#,
    )
    .await;

    let (mut engine, rx) = create_engine(HttpEngineOptions::default());
    engine.load(&page_url(&server, "/"));
    collect_navigation(&rx).await;

    assert!(engine.follow_link(1));
    match rx.recv_timeout(Duration::from_secs(1)).unwrap() {
        EngineEvent::PolicyRequested(action) => {
            assert_eq!(action.url, page_url(&server, "/next"));
            assert_eq!(action.navigation_type, NavigationType::LinkActivated);
            assert!(action.has_target_frame);
        }
        other => panic!("unexpected event {:?}", other),
    }

    assert!(engine.follow_link(2));
    match rx.recv_timeout(Duration::from_secs(1)).unwrap() {
        EngineEvent::NewWindowRequested(action) => {
            assert_eq!(action.url.as_str(), "https://other.example/");
            assert!(!action.has_target_frame);
        }
        other => panic!("unexpected event {:?}", other),
    }

    assert!(!engine.follow_link(99));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_back_and_forward_update_history_flags() {
    let server = MockServer::start().await;
    mount_html(&server, "/a", "<title>A</title>").await;
    mount_html(&server, "/b", "<title>B</title>").await;

    let (mut engine, rx) = create_engine(HttpEngineOptions::default());
    engine.load(&page_url(&server, "/a"));
    collect_navigation(&rx).await;

    engine.load(&page_url(&server, "/b"));
    let events = collect_navigation(&rx).await;
    assert!(events.contains(&EngineEvent::PropertyChanged(PropertyChange::CanGoBack(true))));

    engine.go_back();
    let events = collect_navigation(&rx).await;
    assert!(events.contains(&EngineEvent::PropertyChanged(PropertyChange::CanGoBack(false))));
    assert!(events.contains(&EngineEvent::PropertyChanged(PropertyChange::CanGoForward(true))));
    assert_eq!(engine.current_url(), Some(page_url(&server, "/a")));

    engine.go_forward();
    let events = collect_navigation(&rx).await;
    assert!(events.contains(&EngineEvent::PropertyChanged(PropertyChange::CanGoForward(false))));
    assert_eq!(engine.current_url(), Some(page_url(&server, "/b")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reload_keeps_history_length() {
    let server = MockServer::start().await;
    mount_html(&server, "/a", "<title>A</title>").await;

    let (mut engine, rx) = create_engine(HttpEngineOptions::default());
    engine.load(&page_url(&server, "/a"));
    collect_navigation(&rx).await;

    engine.reload();
    let events = collect_navigation(&rx).await;
    assert_eq!(events.last(), Some(&EngineEvent::NavigationFinished));
    assert!(!events.contains(&EngineEvent::PropertyChanged(PropertyChange::CanGoBack(true))));
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_refused_connection_fails_provisionally() {
    let (mut engine, rx) = create_engine(HttpEngineOptions::default());
    engine.load(&Url::parse("http://127.0.0.1:1/").unwrap());

    let events = collect_navigation(&rx).await;
    match events.last() {
        Some(EngineEvent::ProvisionalNavigationFailed(error)) => {
            assert_eq!(error.kind, NavErrorKind::CannotConnectToHost);
        }
        other => panic!("unexpected terminal event {:?}", other),
    }
    assert!(!events.contains(&EngineEvent::NavigationCommitted));
    assert!(!engine.is_loading());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let options = HttpEngineOptions {
        timeout: Duration::from_millis(200),
        ..Default::default()
    };
    let (mut engine, rx) = create_engine(options);
    engine.load(&page_url(&server, "/slow"));

    let events = collect_navigation(&rx).await;
    match events.last() {
        Some(EngineEvent::ProvisionalNavigationFailed(error)) => {
            assert_eq!(error.kind, NavErrorKind::TimedOut);
        }
        other => panic!("unexpected terminal event {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stop_cancels_in_flight_navigation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let (mut engine, rx) = create_engine(HttpEngineOptions::default());
    engine.load(&page_url(&server, "/slow"));
    engine.stop();

    let events = collect_navigation(&rx).await;
    match events.last() {
        Some(EngineEvent::ProvisionalNavigationFailed(error)) => {
            assert_eq!(error.kind, NavErrorKind::Cancelled);
        }
        other => panic!("unexpected terminal event {:?}", other),
    }
    assert!(!engine.is_loading());

    // The aborted task never publishes afterwards.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_new_load_supersedes_running_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    mount_html(&server, "/fast", "<title>Fast</title>").await;

    let (mut engine, rx) = create_engine(HttpEngineOptions::default());
    engine.load(&page_url(&server, "/slow"));
    engine.load(&page_url(&server, "/fast"));

    let first = collect_navigation(&rx).await;
    assert!(matches!(
        first.last(),
        Some(EngineEvent::ProvisionalNavigationFailed(e)) if e.kind == NavErrorKind::Cancelled
    ));
    let second = collect_navigation(&rx).await;
    assert_eq!(second.last(), Some(&EngineEvent::NavigationFinished));
    assert_eq!(engine.current_url(), Some(page_url(&server, "/fast")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reload_after_failed_first_load_retries_it() {
    let (mut engine, rx) = create_engine(HttpEngineOptions::default());
    let target = Url::parse("http://127.0.0.1:1/").unwrap();
    engine.load(&target);
    let events = collect_navigation(&rx).await;
    assert!(matches!(
        events.last(),
        Some(EngineEvent::ProvisionalNavigationFailed(e)) if e.kind == NavErrorKind::CannotConnectToHost
    ));
    assert_eq!(engine.current_url(), None);

    engine.reload();
    let events = collect_navigation(&rx).await;
    assert_eq!(events[0], EngineEvent::NavigationStarted);
    assert!(matches!(
        events.last(),
        Some(EngineEvent::ProvisionalNavigationFailed(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reload_after_failed_link_retries_the_failed_page() {
    let server = MockServer::start().await;
    mount_html(&server, "/a", "<title>A</title>").await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_html(&server, "/flaky", "<title>Flaky</title>").await;

    let options = HttpEngineOptions {
        timeout: Duration::from_millis(500),
        ..Default::default()
    };
    let (mut engine, rx) = create_engine(options);
    engine.load(&page_url(&server, "/a"));
    collect_navigation(&rx).await;

    engine.load(&page_url(&server, "/flaky"));
    let events = collect_navigation(&rx).await;
    assert!(matches!(
        events.last(),
        Some(EngineEvent::ProvisionalNavigationFailed(e)) if e.kind == NavErrorKind::TimedOut
    ));

    engine.reload();
    let events = collect_navigation(&rx).await;
    assert_eq!(events.last(), Some(&EngineEvent::NavigationFinished));
    assert_eq!(engine.current_url(), Some(page_url(&server, "/flaky")));
    assert_eq!(engine.page().unwrap().title.as_deref(), Some("Flaky"));
    assert!(events.contains(&EngineEvent::PropertyChanged(PropertyChange::CanGoBack(true))));
}
