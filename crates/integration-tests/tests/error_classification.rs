//! Non-success responses are classified into `ApiError` variants.

#![allow(clippy::unwrap_used)]

use axum::http::Method;
use paydesk_client::{ApiError, Session};
use paydesk_integration_tests::{MockBackend, MockResponse};
use serde_json::json;

const BALANCE: &str = "payments/merchant/balance";

async fn balance_error(response: MockResponse) -> ApiError {
    let backend = MockBackend::builder()
        .route(Method::GET, BALANCE, response)
        .start()
        .await
        .unwrap();
    let client = backend.client().unwrap();
    client
        .fetch_balance(&Session::new("jwt"))
        .await
        .unwrap_err()
}

#[tokio::test]
async fn test_unauthorized() {
    let err = balance_error(MockResponse::json(401, &json!({"message": "Token expired"}))).await;
    assert!(matches!(&err, ApiError::Unauthorized(message) if message == "Token expired"));
    assert!(err.is_auth());
}

#[tokio::test]
async fn test_unauthorized_without_body_uses_default_message() {
    let err = balance_error(MockResponse::empty(401)).await;
    assert!(
        matches!(&err, ApiError::Unauthorized(message) if message == "Unauthorized. Please log in again.")
    );
}

#[tokio::test]
async fn test_forbidden() {
    let err = balance_error(MockResponse::json(403, &json!({"error": "Access denied"}))).await;
    assert!(matches!(&err, ApiError::Forbidden(message) if message == "Access denied"));
    assert!(!err.is_auth());
}

#[tokio::test]
async fn test_rate_limited_reads_retry_after() {
    let err = balance_error(MockResponse::empty(429).with_header("retry-after", "17")).await;
    assert!(matches!(err, ApiError::RateLimited(17)));

    let err = balance_error(MockResponse::empty(429)).await;
    assert!(matches!(err, ApiError::RateLimited(60)));
}

#[tokio::test]
async fn test_error_message_precedence() {
    let err = balance_error(MockResponse::json(
        400,
        &json!({"error": "Insufficient balance", "message": "Bad request"}),
    ))
    .await;
    assert!(matches!(
        &err,
        ApiError::Status { status: 400, message } if message == "Insufficient balance"
    ));

    let err = balance_error(MockResponse::json(400, &json!({"message": "Amount is required"}))).await;
    assert!(matches!(
        &err,
        ApiError::Status { status: 400, message } if message == "Amount is required"
    ));

    let err = balance_error(MockResponse::json(409, &json!("Payout already processed"))).await;
    assert!(matches!(
        &err,
        ApiError::Status { status: 409, message } if message == "Payout already processed"
    ));

    let err = balance_error(MockResponse::text(502, "upstream timeout")).await;
    assert!(matches!(
        &err,
        ApiError::Status { status: 502, message } if message == "upstream timeout"
    ));
}

#[tokio::test]
async fn test_status_without_message_uses_reason_phrase() {
    let err = balance_error(MockResponse::json(500, &json!({"success": false}))).await;
    assert!(matches!(
        &err,
        ApiError::Status { status: 500, message } if message == "Internal Server Error"
    ));
    assert_eq!(err.to_string(), "API error (500): Internal Server Error");
}

#[tokio::test]
async fn test_invalid_json_is_a_parse_error() {
    let err = balance_error(MockResponse::text(200, "<html>maintenance</html>")).await;
    assert!(matches!(err, ApiError::Parse(_)));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let backend = MockBackend::builder().start().await.unwrap();
    let client = backend.client().unwrap();
    let err = client.payouts(&Session::new("jwt")).await.unwrap_err();
    assert!(matches!(
        &err,
        ApiError::Status { status: 404, message } if message == "Route not found"
    ));
}

#[tokio::test]
async fn test_missing_token_fails_before_sending() {
    let backend = MockBackend::builder().start().await.unwrap();
    let client = backend.client().unwrap();
    let err = client.fetch_balance(&Session::default()).await.unwrap_err();
    assert!(matches!(err, ApiError::MissingCredential(_)));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    let backend = MockBackend::builder().start().await.unwrap();
    let config = backend
        .config(&[])
        .map(|mut config| {
            config.base_url = "http://127.0.0.1:9/api/".parse().unwrap();
            config
        })
        .unwrap();
    let client = paydesk_client::PaydeskClient::new(&config).unwrap();
    let err = client.fetch_balance(&Session::new("jwt")).await.unwrap_err();
    assert!(matches!(err, ApiError::Http(_)));
}
