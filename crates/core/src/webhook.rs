//! Merchant webhook settings.
//!
//! The backend keeps one webhook per merchant. These types describe what
//! the console sends when configuring it and what it reads back.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::coerce::lenient_flag;

/// Event names a webhook can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookEvent {
    #[serde(rename = "payment.success")]
    PaymentSuccess,
    #[serde(rename = "payment.failed")]
    PaymentFailed,
    #[serde(rename = "payment.captured")]
    PaymentCaptured,
    #[serde(rename = "payment.refunded")]
    PaymentRefunded,
    #[serde(rename = "payout.processed")]
    PayoutProcessed,
    #[serde(rename = "payout.failed")]
    PayoutFailed,
    #[serde(rename = "payment_link.paid")]
    PaymentLinkPaid,
    #[serde(rename = "payment_link.cancelled")]
    PaymentLinkCancelled,
    #[serde(rename = "payment_link.expired")]
    PaymentLinkExpired,
}

impl WebhookEvent {
    pub const ALL: [Self; 9] = [
        Self::PaymentSuccess,
        Self::PaymentFailed,
        Self::PaymentCaptured,
        Self::PaymentRefunded,
        Self::PayoutProcessed,
        Self::PayoutFailed,
        Self::PaymentLinkPaid,
        Self::PaymentLinkCancelled,
        Self::PaymentLinkExpired,
    ];

    /// Wire name, e.g. `payment.success`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PaymentSuccess => "payment.success",
            Self::PaymentFailed => "payment.failed",
            Self::PaymentCaptured => "payment.captured",
            Self::PaymentRefunded => "payment.refunded",
            Self::PayoutProcessed => "payout.processed",
            Self::PayoutFailed => "payout.failed",
            Self::PaymentLinkPaid => "payment_link.paid",
            Self::PaymentLinkCancelled => "payment_link.cancelled",
            Self::PaymentLinkExpired => "payment_link.expired",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::PaymentSuccess => "A payment succeeded",
            Self::PaymentFailed => "A payment failed",
            Self::PaymentCaptured => "A payment was captured",
            Self::PaymentRefunded => "A payment was refunded",
            Self::PayoutProcessed => "A payout was processed",
            Self::PayoutFailed => "A payout failed",
            Self::PaymentLinkPaid => "A payment link was paid",
            Self::PaymentLinkCancelled => "A payment link was cancelled",
            Self::PaymentLinkExpired => "A payment link expired",
        }
    }
}

impl std::fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WebhookEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| format!("invalid webhook event: {s}"))
    }
}

/// Why a webhook configuration was refused before sending.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookSettingsError {
    #[error("webhook URL is not valid: {0}")]
    InvalidUrl(String),

    #[error("webhook URL must use http or https, got {0}")]
    UnsupportedScheme(String),

    #[error("select at least one webhook event")]
    NoEvents,
}

/// Body of a webhook configure request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSettings {
    pub url: String,
    pub events: Vec<WebhookEvent>,
    /// Signing secret. The backend generates one when this is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    pub is_active: bool,
}

impl WebhookSettings {
    /// Active settings for `url` and `events`. The secret is left to the backend.
    #[must_use]
    pub fn new(url: impl Into<String>, events: Vec<WebhookEvent>) -> Self {
        Self {
            url: url.into(),
            events,
            secret: None,
            is_active: true,
        }
    }

    /// Check the URL and event list, dropping repeated events and a blank
    /// secret.
    ///
    /// # Errors
    ///
    /// Returns an error for a URL that does not parse or is not http(s), or
    /// for an empty event list.
    pub fn validated(mut self) -> Result<Self, WebhookSettingsError> {
        let url = self.url.trim();
        let parsed = Url::parse(url).map_err(|_| WebhookSettingsError::InvalidUrl(url.to_owned()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(WebhookSettingsError::UnsupportedScheme(
                parsed.scheme().to_owned(),
            ));
        }
        self.url = url.to_owned();

        let mut seen = Vec::with_capacity(self.events.len());
        self.events.retain(|event| {
            let fresh = !seen.contains(event);
            seen.push(*event);
            fresh
        });
        if self.events.is_empty() {
            return Err(WebhookSettingsError::NoEvents);
        }

        self.secret = self
            .secret
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());
        Ok(self)
    }
}

/// The merchant's webhook as the backend reports it.
///
/// Events stay strings so names added on the server side still show up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "webhookUrl", alias = "webhook_url")]
    pub url: Option<String>,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default, alias = "is_active", deserialize_with = "lenient_flag")]
    pub is_active: Option<bool>,
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<String>,
}

impl WebhookConfig {
    /// Read the webhook from `{ "webhook": {...} }`, `{ "data": {...} }` or a
    /// bare object. `Ok(None)` when no URL is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the webhook object has fields of the wrong type.
    pub fn from_value(value: Value) -> Result<Option<Self>, serde_json::Error> {
        let Value::Object(mut map) = value else {
            return Ok(None);
        };
        for key in ["webhook", "data", "config"] {
            if let Some(inner @ Value::Object(_)) = map.remove(key) {
                return Self::from_value(inner);
            }
        }
        let config: Self = serde_json::from_value(Value::Object(map))?;
        let configured = config
            .url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty());
        Ok(configured.then_some(config))
    }

    /// Secret with everything but the last four characters hidden.
    #[must_use]
    pub fn masked_secret(&self) -> Option<String> {
        let secret = self.secret.as_deref()?;
        let visible = secret.len().saturating_sub(4);
        Some(
            secret
                .char_indices()
                .map(|(i, c)| if i < visible { '*' } else { c })
                .collect(),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_names() {
        for event in WebhookEvent::ALL {
            assert_eq!(event.as_str().parse::<WebhookEvent>().unwrap(), event);
        }
        assert_eq!(
            serde_json::to_value(WebhookEvent::PaymentLinkPaid).unwrap(),
            json!("payment_link.paid")
        );
        assert!("payment.settled".parse::<WebhookEvent>().is_err());
    }

    #[test]
    fn test_settings_validation() {
        let settings = WebhookSettings {
            secret: Some("  ".to_owned()),
            ..WebhookSettings::new(
                " https://shop.example.in/hooks ",
                vec![
                    WebhookEvent::PaymentSuccess,
                    WebhookEvent::PayoutFailed,
                    WebhookEvent::PaymentSuccess,
                ],
            )
        }
        .validated()
        .unwrap();
        assert_eq!(settings.url, "https://shop.example.in/hooks");
        assert_eq!(
            settings.events,
            [WebhookEvent::PaymentSuccess, WebhookEvent::PayoutFailed]
        );
        assert_eq!(settings.secret, None);
        assert_eq!(
            serde_json::to_value(&settings).unwrap(),
            json!({
                "url": "https://shop.example.in/hooks",
                "events": ["payment.success", "payout.failed"],
                "isActive": true
            })
        );
    }

    #[test]
    fn test_settings_rejections() {
        let events = vec![WebhookEvent::PaymentSuccess];
        assert_eq!(
            WebhookSettings::new("not a url", events.clone()).validated(),
            Err(WebhookSettingsError::InvalidUrl("not a url".to_owned()))
        );
        assert_eq!(
            WebhookSettings::new("ftp://shop.example.in", events).validated(),
            Err(WebhookSettingsError::UnsupportedScheme("ftp".to_owned()))
        );
        assert_eq!(
            WebhookSettings::new("https://shop.example.in", Vec::new()).validated(),
            Err(WebhookSettingsError::NoEvents)
        );
    }

    #[test]
    fn test_config_shapes() {
        let config = WebhookConfig::from_value(json!({
            "success": true,
            "webhook": {
                "_id": "wh_1",
                "webhookUrl": "https://shop.example.in/hooks",
                "events": ["payment.success", "payment.disputed"],
                "secret": "whsec_abcdef1234",
                "isActive": "true"
            }
        }))
        .unwrap()
        .unwrap();
        assert_eq!(config.id.as_deref(), Some("wh_1"));
        assert_eq!(config.url.as_deref(), Some("https://shop.example.in/hooks"));
        assert_eq!(config.events.len(), 2);
        assert_eq!(config.is_active, Some(true));
        assert_eq!(config.masked_secret().as_deref(), Some("************1234"));

        let config = WebhookConfig::from_value(json!({
            "data": {"url": "http://localhost:8080/cb", "events": [], "is_active": false}
        }))
        .unwrap()
        .unwrap();
        assert_eq!(config.is_active, Some(false));
        assert_eq!(config.masked_secret(), None);
    }

    #[test]
    fn test_unconfigured_webhook() {
        assert_eq!(WebhookConfig::from_value(Value::Null).unwrap(), None);
        assert_eq!(
            WebhookConfig::from_value(json!({"message": "No webhook configured"})).unwrap(),
            None
        );
        assert_eq!(
            WebhookConfig::from_value(json!({"webhook": {"url": "  "}})).unwrap(),
            None
        );
        assert!(WebhookConfig::from_value(json!({"url": "https://x.in", "events": "all"})).is_err());
    }
}
