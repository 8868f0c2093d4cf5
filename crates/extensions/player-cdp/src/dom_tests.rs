use std::time::Duration;

use serde_json::{Value, json};

use super::*;
use crate::fake_page::{FakePage, Reply};

fn handler(method: &str, params: &Value) -> Reply {
    let function = params["functionDeclaration"].as_str().unwrap_or_default();
    let object = params["objectId"].as_str().unwrap_or_default();
    match method {
        "Runtime.evaluate" if params["expression"] == "document" => Reply::Result(
            json!({"result": {"type": "object", "subtype": "node", "objectId": "doc"}}),
        ),
        "Runtime.evaluate" => Reply::Result(
            json!({"result": {"type": "string", "value": "https://music.yandex.ru/album/1"}}),
        ),
        "Runtime.callFunctionOn" if object == "gone" => {
            Reply::Error(-32000, "Could not find object with given id")
        }
        "Runtime.callFunctionOn" if function == QUERY_SELECTOR => {
            if params["arguments"][0]["value"] == "#missing" {
                Reply::Result(json!({"result": {"type": "object", "subtype": "null", "value": null}}))
            } else {
                Reply::Result(json!({"result": {"type": "object", "subtype": "node", "objectId": "btn"}}))
            }
        }
        "Runtime.callFunctionOn" if function == SELF => Reply::Result(
            json!({"result": {"type": "object", "subtype": "node", "objectId": "btn-pinned"}}),
        ),
        "Runtime.callFunctionOn" if function == TAG_NAME => {
            Reply::Result(json!({"result": {"type": "string", "value": "BUTTON"}}))
        }
        "Runtime.callFunctionOn" if function == GET_ATTRIBUTE => {
            Reply::Result(json!({"result": {"type": "object", "subtype": "null", "value": null}}))
        }
        "Runtime.callFunctionOn" if function == PROPERTY => {
            Reply::Result(json!({"result": {"type": "string", "value": "0.4"}}))
        }
        "Runtime.callFunctionOn" if function == IS_CONNECTED || function == IS_DISABLED => {
            Reply::Result(json!({"result": {"type": "boolean", "value": true}}))
        }
        "Runtime.callFunctionOn" if function == SET_INPUT_VALUE => {
            Reply::Result(json!({
                "result": {"type": "object"},
                "exceptionDetails": {"exceptionId": 1, "text": "Uncaught",
                    "exception": {"type": "object", "description": "TypeError: setter is undefined"}}
            }))
        }
        _ => Reply::Result(json!({"result": {"type": "undefined"}})),
    }
}

async fn dom() -> (FakePage, CdpDom) {
    let page = FakePage::start(handler).await;
    let session = PageSession::connect(&page.url, Duration::from_secs(2)).await.unwrap();
    (page, CdpDom::new(Arc::new(session)))
}

#[tokio::test]
async fn test_document_and_query() {
    let (page, dom) = dom().await;
    let doc = dom.document().await.unwrap();
    assert_eq!(doc.id(), "doc");

    let found = dom.query_selector(&doc, "button").await.unwrap();
    assert_eq!(found, Some(NodeRef::new("btn")));
    assert!(dom.query_selector(&doc, "#missing").await.unwrap().is_none());

    let calls = page.requests("Runtime.callFunctionOn");
    assert_eq!(calls[0]["objectGroup"], TRANSIENT_GROUP);
    assert_eq!(calls[0]["objectId"], "doc");
}

#[tokio::test]
async fn test_value_reads() {
    let (_page, dom) = dom().await;
    let node = NodeRef::new("btn");
    assert_eq!(dom.location().await.unwrap(), "https://music.yandex.ru/album/1");
    assert_eq!(dom.tag_name(&node).await.unwrap(), "BUTTON");
    assert_eq!(dom.attribute(&node, "aria-pressed").await.unwrap(), None);
    assert_eq!(dom.property(&node, "value").await.unwrap().as_deref(), Some("0.4"));
    assert!(dom.is_connected(&node).await.unwrap());
    assert!(dom.is_disabled(&node).await.unwrap());
    // Undefined results read as empty.
    assert_eq!(dom.text_content(&node).await.unwrap(), None);
    assert_eq!(dom.class_name(&node).await.unwrap(), "");
}

#[tokio::test]
async fn test_stale_handle_mapping() {
    let (_page, dom) = dom().await;
    let err = dom.is_connected(&NodeRef::new("gone")).await.unwrap_err();
    assert!(matches!(err, DomError::StaleHandle(_)));
}

#[tokio::test]
async fn test_script_error_mapping() {
    let (_page, dom) = dom().await;
    let err = dom
        .set_input_value(&NodeRef::new("slider"), "0.5")
        .await
        .unwrap_err();
    assert!(matches!(err, DomError::Script(ref m) if m.contains("setter")));
}

#[tokio::test]
async fn test_retain_and_release() {
    let (page, dom) = dom().await;
    let pinned = dom.retain(&NodeRef::new("btn")).await.unwrap();
    assert_eq!(pinned.id(), "btn-pinned");
    assert_eq!(page.requests("Runtime.callFunctionOn")[0]["objectGroup"], PINNED_GROUP);

    dom.release(&pinned).await.unwrap();
    dom.release_transient().await.unwrap();
    assert_eq!(page.requests("Runtime.releaseObject")[0]["objectId"], "btn-pinned");
    assert_eq!(
        page.requests("Runtime.releaseObjectGroup")[0]["objectGroup"],
        TRANSIENT_GROUP
    );
}

#[tokio::test]
async fn test_click_sends_value_call() {
    let (page, dom) = dom().await;
    dom.click(&NodeRef::new("btn")).await.unwrap();
    let call = &page.requests("Runtime.callFunctionOn")[0];
    assert_eq!(call["functionDeclaration"], CLICK);
    assert_eq!(call["returnByValue"], true);
}

#[tokio::test]
async fn test_transport_error_after_hang_up() {
    let (page, dom) = dom().await;
    page.hang_up();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let err = dom.document().await.unwrap_err();
    assert!(matches!(err, DomError::Transport(_)));
}
