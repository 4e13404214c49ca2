//! Merchant payout listing, request and cancel.

#![allow(clippy::unwrap_used)]

use axum::http::Method;
use paydesk_client::{ApiError, Session};
use paydesk_core::{PayoutId, PayoutRequest, PayoutRequestError, PayoutStatus, TransferMode};
use paydesk_integration_tests::{MockBackend, MockResponse};
use rust_decimal::Decimal;
use serde_json::json;

fn balance(available: u32) -> MockResponse {
    MockResponse::json(200, &json!({"balance": {"available_balance": available}}))
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_payouts() {
    let backend = MockBackend::builder()
        .route(
            Method::GET,
            "payments/merchant/payouts",
            MockResponse::json(
                200,
                &json!({
                    "payouts": [
                        {
                            "payoutId": "PO-1",
                            "amount": 1500,
                            "status": "requested",
                            "transferMode": "upi",
                            "beneficiaryDetails": {"upiId": "shop@upi"},
                            "createdAt": "2025-03-01T10:15:00Z"
                        },
                        {"_id": "66b1f0c2", "amount": "800.00", "status": "on_hold"}
                    ]
                }),
            ),
        )
        .start()
        .await
        .unwrap();
    let client = backend.client().unwrap();

    let list = client.payouts(&Session::new("jwt")).await.unwrap();

    assert_eq!(list.payouts.len(), 2);
    let first = &list.payouts[0];
    assert_eq!(first.payout_id, Some(PayoutId::new("PO-1")));
    assert_eq!(first.status, PayoutStatus::Requested);
    assert_eq!(first.transfer_mode, Some(TransferMode::Upi));
    assert_eq!(first.requested_at.as_deref(), Some("2025-03-01T10:15:00Z"));
    assert_eq!(
        first.beneficiary_details.as_ref().unwrap().upi_id.as_deref(),
        Some("shop@upi")
    );

    let second = &list.payouts[1];
    assert_eq!(second.payout_id, Some(PayoutId::new("66b1f0c2")));
    assert_eq!(second.status, PayoutStatus::Unknown);
    assert_eq!(second.amount, Some(Decimal::new(800, 0)));
}

// =============================================================================
// Request
// =============================================================================

#[tokio::test]
async fn test_request_payout_sends_expected_body() {
    let backend = MockBackend::builder()
        .route(Method::GET, "payments/merchant/balance", balance(5000))
        .route(
            Method::POST,
            "payments/merchant/payout/request",
            MockResponse::json(
                201,
                &json!({
                    "success": true,
                    "message": "Payout request submitted successfully",
                    "payout": {"payoutId": "PO-9", "amount": 1500, "status": "requested"}
                }),
            ),
        )
        .start()
        .await
        .unwrap();
    let client = backend.client().unwrap();
    let session = Session::new("jwt");

    let overview = client.balance_overview(&session).await.unwrap();
    let request = PayoutRequest::upi(Decimal::new(1500, 0), "shop@upi").with_notes("March");
    let response = client
        .request_payout(&session, &overview.eligibility, &request)
        .await
        .unwrap();

    assert_eq!(
        response.message_or("submitted"),
        "Payout request submitted successfully"
    );
    assert_eq!(
        response.payout.unwrap().payout_id,
        Some(PayoutId::new("PO-9"))
    );

    let sent = backend.last_request().unwrap();
    assert_eq!(sent.method, Method::POST);
    assert_eq!(sent.header("x-auth-token"), Some("jwt"));
    assert_eq!(
        sent.body,
        Some(json!({
            "amount": 1500.0,
            "transferMode": "upi",
            "beneficiaryDetails": {"upiId": "shop@upi"},
            "notes": "March"
        }))
    );
}

#[tokio::test]
async fn test_request_below_minimum_never_reaches_backend() {
    let backend = MockBackend::builder()
        .route(Method::GET, "payments/merchant/balance", balance(5000))
        .start()
        .await
        .unwrap();
    let client = backend.client().unwrap();
    let session = Session::new("jwt");

    let overview = client.balance_overview(&session).await.unwrap();
    let request = PayoutRequest::upi(Decimal::new(499, 0), "shop@upi");
    let err = client
        .request_payout(&session, &overview.eligibility, &request)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::PayoutRequest(PayoutRequestError::BelowMinimum { .. })
    ));
    assert_eq!(err.to_string(), "Minimum payout amount is ₹500.00");
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn test_request_when_ineligible_never_reaches_backend() {
    let backend = MockBackend::builder()
        .route(Method::GET, "payments/merchant/balance", balance(100))
        .start()
        .await
        .unwrap();
    let client = backend.client().unwrap();
    let session = Session::new("jwt");

    let overview = client.balance_overview(&session).await.unwrap();
    let request = PayoutRequest::upi(Decimal::new(100, 0), "shop@upi");
    let err = client
        .request_payout(&session, &overview.eligibility, &request)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::PayoutRequest(PayoutRequestError::NotEligible(_))
    ));
    assert_eq!(backend.requests().len(), 1);
}

// =============================================================================
// Cancel
// =============================================================================

#[tokio::test]
async fn test_cancel_payout() {
    let backend = MockBackend::builder()
        .route(
            Method::POST,
            "payments/merchant/payout/PO-1/cancel",
            MockResponse::json(200, &json!({"message": "Payout cancelled"})),
        )
        .start()
        .await
        .unwrap();
    let client = backend.client().unwrap();

    let response = client
        .cancel_payout(&Session::new("jwt"), &PayoutId::new("PO-1"))
        .await
        .unwrap();
    assert_eq!(response.message.as_deref(), Some("Payout cancelled"));

    let sent = backend.last_request().unwrap();
    assert_eq!(sent.body, None);
}

#[tokio::test]
async fn test_empty_action_body_is_success() {
    let backend = MockBackend::builder()
        .route(
            Method::POST,
            "payments/merchant/payout/PO-2/cancel",
            MockResponse::empty(204),
        )
        .start()
        .await
        .unwrap();
    let client = backend.client().unwrap();

    let response = client
        .cancel_payout(&Session::new("jwt"), &PayoutId::new("PO-2"))
        .await
        .unwrap();
    assert_eq!(response.message_or("Payout cancelled"), "Payout cancelled");
}

// =============================================================================
// Transactions
// =============================================================================

#[tokio::test]
async fn test_transactions_use_api_key() {
    let backend = MockBackend::builder()
        .route(
            Method::GET,
            "payments/transactions",
            MockResponse::json(
                200,
                &json!({"transactions": [{"orderId": "ORD-1", "amount": 499, "status": "paid"}]}),
            ),
        )
        .start()
        .await
        .unwrap();
    let config = backend.config(&[("PAYDESK_API_KEY", "key_live_4f2a")]).unwrap();
    let client = paydesk_client::PaydeskClient::new(&config).unwrap();
    let session = config.session().unwrap();

    let transactions = client.transactions(&session).await.unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].reference(), Some("ORD-1"));

    let sent = backend.last_request().unwrap();
    assert_eq!(sent.header("x-api-key"), Some("key_live_4f2a"));
    assert_eq!(sent.header("x-auth-token"), None);
}
