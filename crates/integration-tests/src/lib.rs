//! Integration tests for Paydesk.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p paydesk-integration-tests
//! ```
//!
//! Each test starts its own [`MockBackend`]: an `axum` server on
//! `127.0.0.1:0` that answers from canned responses and records every
//! request it receives. No external services are needed.
//!
//! # Test Categories
//!
//! - `balance_overview` - Balance fetch, normalization and eligibility
//! - `payout_flow` - Merchant payout listing, request and cancel
//! - `admin_actions` - Operator review and role checks
//! - `error_classification` - Status codes and error bodies
//! - `export` - CSV export of fetched listings
//! - `webhooks_and_keys` - API keys, webhook settings and payment status

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use paydesk_client::{ClientConfig, ConfigError, PaydeskClient};
use serde_json::Value;

/// Path prefix the mock serves under, like the real backend.
pub const API_PREFIX: &str = "/api";

/// A canned response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: StatusCode,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: String,
}

impl MockResponse {
    /// JSON body with the given status.
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self::text(status, &body.to_string())
            .with_header("content-type", "application/json")
    }

    /// Plain-text body with the given status.
    #[must_use]
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            headers: Vec::new(),
            body: body.to_owned(),
        }
    }

    /// No body at all.
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self::text(status, "")
    }

    /// Add a response header. Invalid names or values are skipped.
    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.push((HeaderName::from_static(name), value));
        }
        self
    }
}

impl IntoResponse for MockResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        for (name, value) in self.headers {
            response.headers_mut().insert(name, value);
        }
        response
    }
}

/// A request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path relative to [`API_PREFIX`], without a leading slash.
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    /// Parsed JSON body, `None` when the body was empty.
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// Header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Default)]
struct MockState {
    routes: HashMap<(Method, String), MockResponse>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Builder for a [`MockBackend`].
#[derive(Default)]
pub struct MockBackendBuilder {
    routes: HashMap<(Method, String), MockResponse>,
}

impl MockBackendBuilder {
    /// Answer `method path` (relative to [`API_PREFIX`]) with `response`.
    #[must_use]
    pub fn route(mut self, method: Method, path: &str, response: MockResponse) -> Self {
        self.routes
            .insert((method, path.trim_start_matches('/').to_owned()), response);
        self
    }

    /// Bind to an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(self) -> std::io::Result<MockBackend> {
        let state = Arc::new(MockState {
            routes: self.routes,
            ..MockState::default()
        });
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(MockBackend { addr, state })
    }
}

/// A running mock payments backend.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockBackend {
    #[must_use]
    pub fn builder() -> MockBackendBuilder {
        MockBackendBuilder::default()
    }

    /// Base URL including [`API_PREFIX`].
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}{API_PREFIX}", self.addr)
    }

    /// Client configuration pointing at this backend, plus `vars`.
    ///
    /// # Errors
    ///
    /// Returns an error if one of `vars` is invalid.
    pub fn config(&self, vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let base_url = self.base_url();
        ClientConfig::from_lookup(|key| {
            if key == "PAYDESK_API_BASE_URL" {
                return Some(base_url.clone());
            }
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_owned())
        })
    }

    /// A client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn client(&self) -> Result<PaydeskClient, Box<dyn std::error::Error>> {
        Ok(PaydeskClient::new(&self.config(&[])?)?)
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent request, if any.
    #[must_use]
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests().pop()
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or_else(|| uri.path())
        .trim_start_matches('/')
        .to_owned();

    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query: uri.query().map(ToOwned::to_owned),
            headers,
            body: serde_json::from_slice(&body).ok(),
        });

    state.routes.get(&(method, path)).map_or_else(
        || {
            MockResponse::json(404, &serde_json::json!({"message": "Route not found"}))
                .into_response()
        },
        |response| response.clone().into_response(),
    )
}
