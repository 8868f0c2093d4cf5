use std::time::Duration;

use serde_json::{Value, json};

use super::core::PageSession;
use crate::cdp::error::CdpError;
use crate::cdp::protocol::ReturnMode;
use crate::fake_page::{FakePage, Reply};

async fn session_for(page: &FakePage, timeout: Duration) -> PageSession {
    PageSession::connect(&page.url, timeout).await.unwrap()
}

#[tokio::test]
async fn test_call_round_trip() {
    let page = FakePage::start(|method, _| match method {
        "Runtime.evaluate" => Reply::Result(json!({"result": {"type": "string", "value": "https://music.yandex.ru/"}})),
        _ => Reply::Result(json!({})),
    })
    .await;
    let session = session_for(&page, Duration::from_secs(2)).await;

    let href = session.evaluate("location.href").await.unwrap();
    assert_eq!(href, "https://music.yandex.ru/");
    let sent = page.requests("Runtime.evaluate");
    assert_eq!(sent[0]["expression"], "location.href");
    assert_eq!(sent[0]["returnByValue"], true);
}

#[tokio::test]
async fn test_protocol_error() {
    let page = FakePage::start(|_, _| {
        Reply::Error(-32000, "Could not find object with given id")
    })
    .await;
    let session = session_for(&page, Duration::from_secs(2)).await;

    let err = session
        .call_function_value("1.1.1", "function(){return this.isConnected}", &[])
        .await
        .unwrap_err();
    assert!(err.is_stale_object());
}

#[tokio::test]
async fn test_exception_is_javascript_error() {
    let page = FakePage::start(|_, _| {
        Reply::Result(json!({
            "result": {"type": "object", "subtype": "error"},
            "exceptionDetails": {"exceptionId": 1, "text": "Uncaught",
                "exception": {"type": "object", "description": "TypeError: x is not a function"}}
        }))
    })
    .await;
    let session = session_for(&page, Duration::from_secs(2)).await;

    let err = session.evaluate("x()").await.unwrap_err();
    assert!(matches!(err, CdpError::JavaScript(ref m) if m.contains("TypeError")));
}

#[tokio::test]
async fn test_handle_mode_sets_group() {
    let page = FakePage::start(|_, _| {
        Reply::Result(json!({"result": {"type": "object", "subtype": "node", "objectId": "9.9.9"}}))
    })
    .await;
    let session = session_for(&page, Duration::from_secs(2)).await;

    let object = session
        .call_function_on(
            "1.1.1",
            "function(s){return this.querySelector(s)}",
            &[json!("button")],
            ReturnMode::Handle { group: "transient" },
        )
        .await
        .unwrap();
    assert_eq!(object.object_id.as_deref(), Some("9.9.9"));

    let sent = &page.requests("Runtime.callFunctionOn")[0];
    assert_eq!(sent["objectGroup"], "transient");
    assert_eq!(sent["returnByValue"], false);
    assert_eq!(sent["arguments"], json!([{"value": "button"}]));
}

#[tokio::test]
async fn test_release_group() {
    let page = FakePage::start(|_, _| Reply::Result(json!({}))).await;
    let session = session_for(&page, Duration::from_secs(2)).await;

    session.release_object_group("transient").await.unwrap();
    session.release_object("2.2.2").await.unwrap();
    assert_eq!(page.requests("Runtime.releaseObjectGroup")[0]["objectGroup"], "transient");
    assert_eq!(page.requests("Runtime.releaseObject")[0]["objectId"], "2.2.2");
}

#[tokio::test]
async fn test_call_timeout() {
    let page = FakePage::start(|_, _| Reply::Silent).await;
    let session = session_for(&page, Duration::from_millis(100)).await;

    let err = session.call("Runtime.enable", None).await.unwrap_err();
    assert!(matches!(err, CdpError::Timeout(_)));
}

#[tokio::test]
async fn test_events_forwarded() {
    let page = FakePage::start(|_, _| Reply::Result(json!({}))).await;
    let session = session_for(&page, Duration::from_secs(2)).await;
    let mut events = session.events().unwrap();
    assert!(session.events().is_none());

    page.push_event("Runtime.executionContextsCleared", json!({}));
    let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(event.is_context_reset());
}

#[tokio::test]
async fn test_hang_up_closes_session() {
    let page = FakePage::start(|_, _| Reply::Result(Value::Null)).await;
    let session = session_for(&page, Duration::from_secs(2)).await;
    let mut events = session.events().unwrap();

    page.hang_up();
    // The event channel ends when the receive loop exits.
    let end = tokio::time::timeout(Duration::from_secs(2), events.recv()).await.unwrap();
    assert!(end.is_none());
    for _ in 0..50 {
        if session.is_closed() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(session.is_closed());
    assert!(matches!(
        session.call("Runtime.enable", None).await,
        Err(CdpError::SessionClosed)
    ));
}

#[tokio::test]
async fn test_connect_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = PageSession::connect(
        &format!("ws://127.0.0.1:{}/devtools/page/x", port),
        Duration::from_secs(1),
    )
    .await;
    assert!(matches!(result, Err(CdpError::ConnectionFailed(_))));
}
