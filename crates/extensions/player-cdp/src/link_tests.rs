use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::fake_page::{FakePage, Reply};

fn empty_page(method: &str, params: &Value) -> Reply {
    match method {
        "Runtime.evaluate" if params["expression"] == "document" => Reply::Result(
            json!({"result": {"type": "object", "subtype": "node", "objectId": "doc"}}),
        ),
        "Runtime.evaluate" | "Runtime.callFunctionOn" => {
            Reply::Result(json!({"result": {"type": "object", "subtype": "null", "value": null}}))
        }
        _ => Reply::Result(json!({})),
    }
}

async fn endpoint_listing(ws_url: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "main", "type": "page", "title": "Яндекс Музыка",
             "url": "https://music.yandex.ru/", "webSocketDebuggerUrl": ws_url}
        ])))
        .mount(&server)
        .await;
    server
}

fn link_for(endpoint: String) -> PlayerLink {
    let (tx, _rx) = mpsc::unbounded_channel::<String>();
    let config = LinkConfig {
        endpoint,
        request_timeout: Duration::from_secs(2),
        reconnect_interval: Duration::from_millis(50),
        ..LinkConfig::default()
    };
    PlayerLink::new(config, Arc::new(tx))
}

#[test]
fn test_link_config_from_config() {
    let mut config = Config::default();
    config
        .selectors
        .insert("next".to_string(), vec!["#next".to_string()]);
    config.observer.interval_ms = 250;
    let link = LinkConfig::from_config(&config);
    assert_eq!(link.endpoint, "http://127.0.0.1:9222");
    assert_eq!(link.observer_interval, Duration::from_millis(250));
    assert_eq!(link.selectors.next.iter().collect::<Vec<_>>(), vec!["#next"]);
}

#[tokio::test]
async fn test_check_without_client() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let link = link_for(format!("http://127.0.0.1:{}", port));
    assert!(!link.check().await);
    assert!(!link.is_connected());
    assert!(link.controller().is_none());
}

#[tokio::test]
async fn test_attach_and_detach() {
    let page = FakePage::start(empty_page).await;
    let server = endpoint_listing(&page.url).await;
    let link = link_for(server.uri());
    let mut state = link.subscribe();

    assert!(link.check().await);
    assert!(link.is_connected());
    assert!(*state.borrow_and_update());
    let notifier = link.notifier().unwrap();
    assert_eq!(notifier.state(), ymdeck_player::ObserverState::Observing);
    assert!(page.requests("Runtime.enable").len() == 1);

    // A healthy session is kept.
    assert!(link.check().await);
    assert_eq!(page.requests("Runtime.enable").len(), 1);

    page.hang_up();
    tokio::time::sleep(Duration::from_millis(100)).await;
    // The fake page takes one connection only, so reattaching fails.
    assert!(!link.check().await);
    assert!(!link.is_connected());
    assert!(state.has_changed().unwrap());
    assert!(!*state.borrow_and_update());
    assert_eq!(notifier.state(), ymdeck_player::ObserverState::Idle);
}

#[tokio::test]
async fn test_set_port_drops_session() {
    let page = FakePage::start(empty_page).await;
    let server = endpoint_listing(&page.url).await;
    let link = link_for(server.uri());
    assert!(link.check().await);

    let current = url::Url::parse(&link.endpoint()).unwrap().port().unwrap();
    link.set_port(current);
    assert!(link.is_connected());

    let other = current.checked_add(1).unwrap_or(1);
    link.set_port(other);
    assert!(!link.is_connected());
    assert!(link.endpoint().ends_with(&format!(":{}", other)));
}

#[tokio::test]
async fn test_run_stops_on_cancel() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let link = Arc::new(link_for(format!("http://127.0.0.1:{}", port)));
    let cancel = CancellationToken::new();
    let task = tokio::spawn(link.clone().run(cancel.clone()));
    tokio::time::sleep(Duration::from_millis(120)).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .unwrap()
        .unwrap();
    assert!(!link.is_connected());
}
