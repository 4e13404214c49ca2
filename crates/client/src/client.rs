//! Paydesk API client.
//!
//! One method per backend operation. Every method takes the [`Session`]
//! explicitly; the client itself holds no credentials.

use std::sync::Arc;

use paydesk_core::transaction::transactions_from_value;
use paydesk_core::{
    BalanceOverview, EligibilityConfig, OrderId, PaymentStatus, PayoutEligibility, PayoutFilters,
    PayoutId, PayoutList, PayoutRequest, RawBalancePayload, Transaction, TransactionFilters,
    TransferMode, UserRole, WebhookConfig, WebhookSettings,
};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::SecretString;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::instrument;
use url::Url;

use crate::config::ClientConfig;
use crate::endpoints::{AuthScheme, Endpoint};
use crate::error::{ApiError, error_message};
use crate::responses::{ActionResponse, ApiKeyResponse, LoginResponse};
use crate::session::Session;

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Paydesk API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct PaydeskClient {
    inner: Arc<PaydeskClientInner>,
}

struct PaydeskClientInner {
    client: reqwest::Client,
    base_url: Url,
    eligibility: EligibilityConfig,
}

/// Body for operator actions. Unset fields are omitted.
#[derive(Debug, Default, Serialize)]
struct ActionBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    utr: Option<&'a str>,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

impl PaydeskClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(PaydeskClientInner {
                client,
                base_url: config.base_url.clone(),
                eligibility: config.eligibility,
            }),
        })
    }

    /// The backend base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Sign in and return a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response carries no token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let request = self
            .request(Method::POST, Endpoint::Login, &Session::default(), &[])?
            .json(&LoginBody { email, password });
        let body = self.send(request).await?;
        let login = LoginResponse::from_value(&body)?;

        tracing::info!(role = ?login.role, "Signed in");
        Ok(Session {
            auth_token: Some(login.token.into()),
            role: login.role,
            api_key: None,
        })
    }

    /// Fetch the raw balance payload. No normalization happens here.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, a non-success status, or a body
    /// that is not JSON.
    #[instrument(skip(self, session))]
    pub async fn fetch_balance(&self, session: &Session) -> Result<RawBalancePayload, ApiError> {
        let request = self.request(Method::GET, Endpoint::Balance, session, &[])?;
        let body = self.send(request).await?;
        Ok(RawBalancePayload::new(body))
    }

    /// Fetch the balance and derive everything the balance screen shows.
    ///
    /// # Errors
    ///
    /// Only fetch errors. Normalization and evaluation cannot fail.
    pub async fn balance_overview(&self, session: &Session) -> Result<BalanceOverview, ApiError> {
        let raw = self.fetch_balance(session).await?;
        Ok(BalanceOverview::from_payload(&raw, &self.inner.eligibility))
    }

    /// The merchant's own payouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the listing cannot be parsed.
    #[instrument(skip(self, session))]
    pub async fn payouts(&self, session: &Session) -> Result<PayoutList, ApiError> {
        let request = self.request(Method::GET, Endpoint::Payouts, session, &[])?;
        parse_payouts(self.send(request).await?)
    }

    /// Request a payout after checking it against `eligibility`.
    ///
    /// Nothing is sent if the local guard rejects the amount.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PayoutRequest`] if the guard rejects it,
    /// [`ApiError::InvalidInput`] for a UPI payout without a UPI id, or any
    /// request error.
    #[instrument(skip(self, session, eligibility, payout), fields(amount = %payout.amount))]
    pub async fn request_payout(
        &self,
        session: &Session,
        eligibility: &PayoutEligibility,
        payout: &PayoutRequest,
    ) -> Result<ActionResponse, ApiError> {
        eligibility.check_request(payout.amount)?;
        if payout.transfer_mode == TransferMode::Upi
            && payout
                .beneficiary_details
                .upi_id
                .as_deref()
                .is_none_or(|id| id.trim().is_empty())
        {
            return Err(ApiError::InvalidInput("a UPI ID is required".to_string()));
        }

        let request = self
            .request(Method::POST, Endpoint::PayoutRequest, session, &[])?
            .json(payout);
        let response = ActionResponse::from_value(self.send(request).await?)?;
        tracing::info!("Payout requested");
        Ok(response)
    }

    /// Cancel one of the merchant's own open payouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, session, payout_id), fields(payout_id = %payout_id))]
    pub async fn cancel_payout(
        &self,
        session: &Session,
        payout_id: &PayoutId,
    ) -> Result<ActionResponse, ApiError> {
        let request = self.request(Method::POST, Endpoint::PayoutCancel(payout_id), session, &[])?;
        ActionResponse::from_value(self.send(request).await?)
    }

    /// The merchant's transactions. Authenticated with the API key.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingCredential`] without an API key, or any
    /// request error.
    #[instrument(skip(self, session))]
    pub async fn transactions(&self, session: &Session) -> Result<Vec<Transaction>, ApiError> {
        let request = self.request(Method::GET, Endpoint::Transactions, session, &[])?;
        parse_transactions(self.send(request).await?)
    }

    /// Look up the current status of one order. Authenticated with the API
    /// key.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for a blank order id,
    /// [`ApiError::MissingCredential`] without an API key, or any request
    /// error.
    #[instrument(skip(self, session, order_id), fields(order_id = %order_id))]
    pub async fn payment_status(
        &self,
        session: &Session,
        order_id: &OrderId,
    ) -> Result<PaymentStatus, ApiError> {
        if order_id.as_str().trim().is_empty() {
            return Err(ApiError::InvalidInput("an order ID is required".to_string()));
        }
        let request = self.request(Method::GET, Endpoint::PaymentStatus(order_id), session, &[])?;
        PaymentStatus::from_value(self.send(request).await?)
            .map_err(|e| ApiError::Parse(format!("Failed to parse payment status: {e}")))
    }

    /// Issue the merchant's API key. The backend allows one key per merchant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, including when a key already
    /// exists.
    #[instrument(skip(self, session))]
    pub async fn create_api_key(&self, session: &Session) -> Result<ApiKeyResponse, ApiError> {
        let request = self.request(Method::POST, Endpoint::CreateApiKey, session, &[])?;
        let response = ApiKeyResponse::from_value(&self.send(request).await?);
        tracing::info!(returned = response.key.is_some(), "API key created");
        Ok(response)
    }

    /// Fetch the merchant's existing API key.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] if the response carries no key, or any
    /// request error.
    #[instrument(skip(self, session))]
    pub async fn api_key(&self, session: &Session) -> Result<SecretString, ApiError> {
        let request = self.request(Method::GET, Endpoint::ApiKey, session, &[])?;
        ApiKeyResponse::from_value(&self.send(request).await?)
            .key
            .ok_or_else(|| ApiError::Parse("response did not include an API key".to_string()))
    }

    /// The merchant's webhook, or `None` if none is configured.
    ///
    /// A 404 from the backend also means none is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the webhook cannot be parsed.
    #[instrument(skip(self, session))]
    pub async fn webhook_config(
        &self,
        session: &Session,
    ) -> Result<Option<WebhookConfig>, ApiError> {
        let request = self.request(Method::GET, Endpoint::WebhookConfig, session, &[])?;
        match self.send(request).await {
            Ok(body) => WebhookConfig::from_value(body)
                .map_err(|e| ApiError::Parse(format!("Failed to parse webhook: {e}"))),
            Err(ApiError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create or replace the merchant's webhook.
    ///
    /// Nothing is sent if the settings fail validation.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::WebhookSettings`] for a bad URL or an empty event
    /// list, or any request error.
    #[instrument(skip(self, session, settings), fields(url = %settings.url))]
    pub async fn configure_webhook(
        &self,
        session: &Session,
        settings: &WebhookSettings,
    ) -> Result<ActionResponse, ApiError> {
        let settings = settings.clone().validated()?;
        let request = self
            .request(Method::POST, Endpoint::WebhookConfigure, session, &[])?
            .json(&settings);
        let response = ActionResponse::from_value(self.send(request).await?)?;
        tracing::info!(events = settings.events.len(), "Webhook configured");
        Ok(response)
    }

    /// Ask the backend to deliver a test event to the configured webhook.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, session))]
    pub async fn test_webhook(&self, session: &Session) -> Result<ActionResponse, ApiError> {
        let request = self
            .request(Method::POST, Endpoint::WebhookTest, session, &[])?
            .json(&json!({}));
        ActionResponse::from_value(self.send(request).await?)
    }

    /// Remove the merchant's webhook.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, session))]
    pub async fn delete_webhook(&self, session: &Session) -> Result<ActionResponse, ApiError> {
        let request = self.request(Method::DELETE, Endpoint::WebhookDelete, session, &[])?;
        let response = ActionResponse::from_value(self.send(request).await?)?;
        tracing::info!("Webhook deleted");
        Ok(response)
    }

    /// Every merchant's payouts. Operators only.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RoleRequired`] for a known non-operator session,
    /// or any request error.
    #[instrument(skip(self, session))]
    pub async fn admin_payouts(
        &self,
        session: &Session,
        filters: &PayoutFilters,
    ) -> Result<PayoutList, ApiError> {
        let query = filters.query_pairs();
        let request = self.request(Method::GET, Endpoint::AdminPayouts, session, &query)?;
        parse_payouts(self.send(request).await?)
    }

    /// Approve a requested payout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RoleRequired`] for a known non-operator session,
    /// or any request error.
    #[instrument(skip(self, session, payout_id, notes), fields(payout_id = %payout_id))]
    pub async fn approve_payout(
        &self,
        session: &Session,
        payout_id: &PayoutId,
        notes: Option<&str>,
    ) -> Result<ActionResponse, ApiError> {
        let body = ActionBody {
            notes: non_blank(notes),
            ..ActionBody::default()
        };
        self.payout_action(session, Endpoint::AdminApprove(payout_id), &body)
            .await
    }

    /// Reject a requested payout. A reason is mandatory.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for a blank reason, or any request
    /// error.
    #[instrument(skip(self, session, payout_id, reason), fields(payout_id = %payout_id))]
    pub async fn reject_payout(
        &self,
        session: &Session,
        payout_id: &PayoutId,
        reason: &str,
    ) -> Result<ActionResponse, ApiError> {
        let reason = non_blank(Some(reason))
            .ok_or_else(|| ApiError::InvalidInput("a rejection reason is required".to_string()))?;
        let body = ActionBody {
            reason: Some(reason),
            ..ActionBody::default()
        };
        self.payout_action(session, Endpoint::AdminReject(payout_id), &body)
            .await
    }

    /// Mark an approved payout as paid out. The bank UTR is mandatory.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for a blank UTR, or any request error.
    #[instrument(skip(self, session, payout_id, notes), fields(payout_id = %payout_id))]
    pub async fn process_payout(
        &self,
        session: &Session,
        payout_id: &PayoutId,
        utr: &str,
        notes: Option<&str>,
    ) -> Result<ActionResponse, ApiError> {
        let utr = non_blank(Some(utr))
            .ok_or_else(|| ApiError::InvalidInput("a UTR number is required".to_string()))?;
        let body = ActionBody {
            utr: Some(utr),
            notes: non_blank(notes),
            ..ActionBody::default()
        };
        self.payout_action(session, Endpoint::AdminProcess(payout_id), &body)
            .await
    }

    /// Every merchant's transactions. Operators only.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RoleRequired`] for a known non-operator session,
    /// or any request error.
    #[instrument(skip(self, session))]
    pub async fn admin_transactions(
        &self,
        session: &Session,
        filters: &TransactionFilters,
    ) -> Result<Vec<Transaction>, ApiError> {
        let query = filters.query_pairs();
        let request = self.request(Method::GET, Endpoint::AdminTransactions, session, &query)?;
        parse_transactions(self.send(request).await?)
    }

    async fn payout_action(
        &self,
        session: &Session,
        endpoint: Endpoint<'_>,
        body: &ActionBody<'_>,
    ) -> Result<ActionResponse, ApiError> {
        let request = self.request(Method::POST, endpoint, session, &[])?.json(body);
        let response = ActionResponse::from_value(self.send(request).await?)?;
        tracing::info!(path = %endpoint.segments().join("/"), "Payout action accepted");
        Ok(response)
    }

    /// Absolute URL for an endpoint, with query pairs appended.
    fn url(&self, endpoint: Endpoint<'_>, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(endpoint.segments());
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        Ok(url)
    }

    /// Build an authenticated request. Role and credential checks happen
    /// here, before anything goes on the wire.
    fn request(
        &self,
        method: Method,
        endpoint: Endpoint<'_>,
        session: &Session,
        query: &[(&str, String)],
    ) -> Result<RequestBuilder, ApiError> {
        if endpoint.is_admin() {
            session.require_role(UserRole::SuperAdmin)?;
        }

        let builder = self.inner.client.request(method, self.url(endpoint, query)?);
        Ok(match endpoint.auth() {
            AuthScheme::None => builder,
            AuthScheme::Token => builder.header("x-auth-token", session.token()?),
            AuthScheme::ApiKey => builder.header("x-api-key", session.key()?),
        })
    }

    /// Send a request and return its JSON body (`null` for an empty body).
    async fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&body)
                .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(handle_error_status(status, response).await)
        }
    }
}

/// Classify a non-success response.
async fn handle_error_status(status: StatusCode, response: reqwest::Response) -> ApiError {
    // Check for rate limiting
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return ApiError::RateLimited(retry_after);
    }

    let message = match response.text().await {
        Ok(body) => error_message(&body),
        Err(e) => return ApiError::Http(e),
    };
    tracing::debug!(status = status.as_u16(), ?message, "Backend returned an error");

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(
            message.unwrap_or_else(|| "Unauthorized. Please log in again.".to_string()),
        ),
        StatusCode::FORBIDDEN => ApiError::Forbidden(message.unwrap_or_else(|| {
            "You do not have permission to perform this action.".to_string()
        })),
        _ => ApiError::Status {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            }),
        },
    }
}

fn parse_payouts(body: Value) -> Result<PayoutList, ApiError> {
    PayoutList::from_value(body)
        .map_err(|e| ApiError::Parse(format!("Failed to parse payouts: {e}")))
}

fn parse_transactions(body: Value) -> Result<Vec<Transaction>, ApiError> {
    transactions_from_value(body)
        .map_err(|e| ApiError::Parse(format!("Failed to parse transactions: {e}")))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
