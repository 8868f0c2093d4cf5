use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

async fn validator(server: &MockServer) -> TokenValidator {
    TokenValidator::new(&format!("{}/check_token", server.uri()), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_valid_and_invalid_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/check_token"))
        .and(header("Authorization", "good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/check_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": false})))
        .mount(&server)
        .await;

    let validator = validator(&server).await;
    assert!(validator.check(" good ").await.unwrap());
    assert!(!validator.check("other").await.unwrap());
}

#[tokio::test]
async fn test_server_error_is_remote_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = validator(&server).await.check("t").await.unwrap_err();
    assert!(matches!(err, TokenError::RemoteValidation(ref m) if m == "HTTP 503"));
}

#[tokio::test]
async fn test_malformed_body_is_remote_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = validator(&server).await.check("t").await.unwrap_err();
    assert!(matches!(err, TokenError::RemoteValidation(_)));
}

#[tokio::test]
async fn test_missing_field_means_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert!(!validator(&server).await.check("t").await.unwrap());
}

#[tokio::test]
async fn test_unreachable_endpoint() {
    let validator = TokenValidator::new("http://127.0.0.1:1/check_token", Duration::from_millis(500)).unwrap();
    let result = validator.check("t").await;
    assert!(matches!(result, Err(TokenError::RemoteValidation(_))));
    assert_eq!(TokenCheck::from_result(&result), TokenCheck::Failed);
}

#[test]
fn test_bad_url_rejected() {
    assert!(matches!(
        TokenValidator::new("/check_token", Duration::from_secs(1)),
        Err(TokenError::InvalidUrl(_))
    ));
}

#[test]
fn test_check_display() {
    assert_eq!(TokenCheck::from_result(&Ok(true)), TokenCheck::Valid);
    assert_eq!(TokenCheck::from_result(&Ok(false)), TokenCheck::Invalid);
    assert_eq!(TokenCheck::Valid.color(), "#4caf50");
    assert_eq!(TokenCheck::Invalid.color(), "#f44336");
    assert_eq!(TokenCheck::Failed.color(), "orange");
    assert!(TokenCheck::Valid.should_save());
    assert!(!TokenCheck::Invalid.should_save());
    assert!(!TokenCheck::Failed.should_save());
}
