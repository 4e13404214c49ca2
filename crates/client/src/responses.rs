//! Response bodies that are not core listing records.

use paydesk_core::{Payout, UserRole};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

/// What the login endpoint hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub token: String,
    pub role: Option<UserRole>,
}

impl LoginResponse {
    /// Read the token and role from `token`/`accessToken` and `role`/`user.role`,
    /// at the top level or under `data`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] if there is no token or the role is not one
    /// this console knows.
    pub fn from_value(body: &Value) -> Result<Self, ApiError> {
        let roots = [Some(body), body.get("data")];
        let find = |paths: &[&[&str]]| {
            roots.iter().flatten().find_map(|root| {
                paths.iter().find_map(|path| {
                    path.iter()
                        .try_fold(*root, |value, key| value.get(*key))
                        .and_then(Value::as_str)
                })
            })
        };

        let token = find(&[&["token"], &["accessToken"]])
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Parse("login response did not include a token".to_string()))?;
        let role = find(&[&["role"], &["user", "role"]])
            .map(str::parse::<UserRole>)
            .transpose()
            .map_err(ApiError::Parse)?;

        Ok(Self {
            token: token.to_string(),
            role,
        })
    }
}

/// Acknowledgement of an action such as a payout review step or a webhook
/// test. Every field is optional; an empty body is a plain success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ActionResponse {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub payout: Option<Payout>,
}

impl ActionResponse {
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] if the body is JSON of the wrong shape.
    pub fn from_value(body: Value) -> Result<Self, ApiError> {
        match body {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => serde_json::from_value(body)
                .map_err(|e| ApiError::Parse(format!("Failed to parse action response: {e}"))),
            Value::String(message) => Ok(Self {
                message: Some(message),
                ..Self::default()
            }),
            other => Err(ApiError::Parse(format!(
                "unexpected action response: {other}"
            ))),
        }
    }

    /// Message to show the user.
    #[must_use]
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message.as_deref().unwrap_or(fallback)
    }
}

/// What the API key endpoints hand back.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyResponse {
    /// `None` when the backend confirmed without echoing the key.
    pub key: Option<SecretString>,
    pub message: Option<String>,
}

impl ApiKeyResponse {
    /// Read the key from `apiKey`/`key`, at the top level or under `data`,
    /// or from a bare string body.
    #[must_use]
    pub fn from_value(body: &Value) -> Self {
        if let Some(key) = body.as_str().filter(|k| !k.trim().is_empty()) {
            return Self {
                key: Some(SecretString::from(key.trim().to_owned())),
                message: None,
            };
        }
        let key = [Some(body), body.get("data")]
            .into_iter()
            .flatten()
            .flat_map(|root| [root.get("apiKey"), root.get("key")])
            .flatten()
            .filter_map(Value::as_str)
            .find(|k| !k.trim().is_empty());
        Self {
            key: key.map(|k| SecretString::from(k.trim().to_owned())),
            message: body
                .get("message")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use paydesk_core::PayoutStatus;
    use secrecy::ExposeSecret;
    use serde_json::json;

    fn exposed(response: &ApiKeyResponse) -> Option<&str> {
        response.key.as_ref().map(ExposeSecret::expose_secret)
    }

    #[test]
    fn test_api_key_shapes() {
        let response = ApiKeyResponse::from_value(&json!({"apiKey": "pk_live_1"}));
        assert_eq!(exposed(&response), Some("pk_live_1"));

        let response = ApiKeyResponse::from_value(&json!({
            "success": true,
            "message": "API key created",
            "data": {"key": "pk_live_2"}
        }));
        assert_eq!(exposed(&response), Some("pk_live_2"));
        assert_eq!(response.message.as_deref(), Some("API key created"));

        assert_eq!(exposed(&ApiKeyResponse::from_value(&json!(" pk_live_3 "))), Some("pk_live_3"));

        let response = ApiKeyResponse::from_value(&json!({"message": "Created", "apiKey": ""}));
        assert_eq!(exposed(&response), None);
        assert_eq!(response.message.as_deref(), Some("Created"));
        assert!(!format!("{response:?}").contains("pk_"));
    }

    #[test]
    fn test_login_shapes() {
        let login = LoginResponse::from_value(&json!({"token": "jwt", "role": "superAdmin"})).unwrap();
        assert_eq!(login.token, "jwt");
        assert_eq!(login.role, Some(UserRole::SuperAdmin));

        let login = LoginResponse::from_value(&json!({
            "data": {"accessToken": "jwt2", "user": {"role": "admin"}}
        }))
        .unwrap();
        assert_eq!(login.token, "jwt2");
        assert_eq!(login.role, Some(UserRole::Admin));

        let login = LoginResponse::from_value(&json!({"token": "jwt3"})).unwrap();
        assert_eq!(login.role, None);
    }

    #[test]
    fn test_login_errors() {
        assert!(matches!(
            LoginResponse::from_value(&json!({"message": "ok"})),
            Err(ApiError::Parse(_))
        ));
        let err = LoginResponse::from_value(&json!({"token": "jwt", "role": "viewer"})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "parse error: invalid role: viewer. Expected 'admin' or 'superAdmin'"
        );
    }

    #[test]
    fn test_action_response_shapes() {
        assert_eq!(
            ActionResponse::from_value(Value::Null).unwrap(),
            ActionResponse::default()
        );
        let response = ActionResponse::from_value(json!({
            "success": true,
            "message": "Payout approved",
            "payout": {"payoutId": "PO-1", "status": "pending"}
        }))
        .unwrap();
        assert_eq!(response.message_or("done"), "Payout approved");
        assert_eq!(response.payout.unwrap().status, PayoutStatus::Pending);
        assert!(ActionResponse::from_value(json!([1])).is_err());
    }
}
