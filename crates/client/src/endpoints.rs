//! Backend routes, relative to the configured base URL.

use paydesk_core::{OrderId, PayoutId};

/// How a route authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    None,
    /// `x-auth-token: <session token>`
    Token,
    /// `x-api-key: <merchant key>`
    ApiKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    Login,
    Balance,
    Payouts,
    PayoutRequest,
    PayoutCancel(&'a PayoutId),
    Transactions,
    PaymentStatus(&'a OrderId),
    CreateApiKey,
    ApiKey,
    WebhookConfig,
    WebhookConfigure,
    WebhookTest,
    WebhookDelete,
    AdminPayouts,
    AdminTransactions,
    AdminApprove(&'a PayoutId),
    AdminReject(&'a PayoutId),
    AdminProcess(&'a PayoutId),
}

impl<'a> Endpoint<'a> {
    /// Path segments. Ids are separate segments so they get percent-encoded.
    #[must_use]
    pub fn segments(self) -> Vec<&'a str> {
        match self {
            Self::Login => vec!["auth", "login"],
            Self::Balance => vec!["payments", "merchant", "balance"],
            Self::Payouts => vec!["payments", "merchant", "payouts"],
            Self::PayoutRequest => vec!["payments", "merchant", "payout", "request"],
            Self::PayoutCancel(id) => vec!["payments", "merchant", "payout", id.as_str(), "cancel"],
            Self::Transactions => vec!["payments", "transactions"],
            Self::PaymentStatus(id) => vec!["payments", "status", id.as_str()],
            Self::CreateApiKey => vec!["create"],
            Self::ApiKey => vec!["get"],
            Self::WebhookConfig => vec!["payments", "merchant", "webhook", "config"],
            Self::WebhookConfigure => vec!["payments", "merchant", "webhook", "configure"],
            Self::WebhookTest => vec!["payments", "merchant", "webhook", "test"],
            Self::WebhookDelete => vec!["payments", "merchant", "webhook"],
            Self::AdminPayouts => vec!["payments", "admin", "payouts", "all"],
            Self::AdminTransactions => vec!["payments", "admin", "transactions"],
            Self::AdminApprove(id) => vec!["payments", "admin", "payout", id.as_str(), "approve"],
            Self::AdminReject(id) => vec!["payments", "admin", "payout", id.as_str(), "reject"],
            Self::AdminProcess(id) => vec!["payments", "admin", "payout", id.as_str(), "process"],
        }
    }

    #[must_use]
    pub const fn auth(self) -> AuthScheme {
        match self {
            Self::Login => AuthScheme::None,
            Self::Transactions | Self::PaymentStatus(_) => AuthScheme::ApiKey,
            _ => AuthScheme::Token,
        }
    }

    /// Operator-only routes.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(
            self,
            Self::AdminPayouts
                | Self::AdminTransactions
                | Self::AdminApprove(_)
                | Self::AdminReject(_)
                | Self::AdminProcess(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let id = PayoutId::new("PO-1");
        let path = |e: Endpoint<'_>| e.segments().join("/");
        assert_eq!(path(Endpoint::Balance), "payments/merchant/balance");
        assert_eq!(path(Endpoint::PayoutCancel(&id)), "payments/merchant/payout/PO-1/cancel");
        assert_eq!(path(Endpoint::AdminPayouts), "payments/admin/payouts/all");
        assert_eq!(path(Endpoint::AdminProcess(&id)), "payments/admin/payout/PO-1/process");

        let order = OrderId::new("ORD-9");
        assert_eq!(path(Endpoint::PaymentStatus(&order)), "payments/status/ORD-9");
        assert_eq!(path(Endpoint::CreateApiKey), "create");
        assert_eq!(path(Endpoint::ApiKey), "get");
        assert_eq!(path(Endpoint::WebhookConfig), "payments/merchant/webhook/config");
        assert_eq!(path(Endpoint::WebhookConfigure), "payments/merchant/webhook/configure");
        assert_eq!(path(Endpoint::WebhookTest), "payments/merchant/webhook/test");
        assert_eq!(path(Endpoint::WebhookDelete), "payments/merchant/webhook");
    }

    #[test]
    fn test_auth_schemes() {
        let id = PayoutId::new("PO-1");
        assert_eq!(Endpoint::Login.auth(), AuthScheme::None);
        assert_eq!(Endpoint::Transactions.auth(), AuthScheme::ApiKey);
        assert_eq!(Endpoint::AdminReject(&id).auth(), AuthScheme::Token);
        assert!(Endpoint::AdminApprove(&id).is_admin());
        assert!(!Endpoint::PayoutCancel(&id).is_admin());

        let order = OrderId::new("ORD-9");
        assert_eq!(Endpoint::PaymentStatus(&order).auth(), AuthScheme::ApiKey);
        assert_eq!(Endpoint::CreateApiKey.auth(), AuthScheme::Token);
        assert_eq!(Endpoint::WebhookConfigure.auth(), AuthScheme::Token);
        assert!(!Endpoint::WebhookDelete.is_admin());
    }
}
