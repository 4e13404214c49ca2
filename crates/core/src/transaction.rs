//! Payment transaction records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce::{lenient_amount, null_as_default};
use crate::types::{OrderId, TransactionId, TransactionStatus};

/// One pay-in as listed by the merchant or operator transactions endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub id: Option<TransactionId>,
    #[serde(default, alias = "order_id")]
    pub order_id: Option<OrderId>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub commission: Option<Decimal>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TransactionStatus,
    #[serde(default, alias = "customer_name")]
    pub customer_name: Option<String>,
    #[serde(default, alias = "customer_email")]
    pub customer_email: Option<String>,
    #[serde(default, alias = "merchant_name")]
    pub merchant_name: Option<String>,
    #[serde(default, alias = "business_name")]
    pub business_name: Option<String>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
}

impl Transaction {
    /// The identifier shown to people: the order id when there is one.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.order_id
            .as_ref()
            .map(OrderId::as_str)
            .or_else(|| self.id.as_ref().map(TransactionId::as_str))
    }

    /// Merchant label for operator listings.
    #[must_use]
    pub fn merchant_label(&self) -> Option<&str> {
        self.business_name
            .as_deref()
            .or(self.merchant_name.as_deref())
    }
}

/// Current state of one order, from the payment status lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    #[serde(default, alias = "order_id")]
    pub order_id: Option<OrderId>,
    #[serde(default, alias = "transaction_id")]
    pub transaction_id: Option<TransactionId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TransactionStatus,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, alias = "payment_method")]
    pub payment_method: Option<String>,
    #[serde(default, alias = "paid_at")]
    pub paid_at: Option<String>,
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<String>,
}

impl PaymentStatus {
    /// Read the status from a bare object or one nested under `data`,
    /// `payment` or `transaction`.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not an object or a field has the
    /// wrong type.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        if let Value::Object(map) = &value {
            for key in ["data", "payment", "transaction"] {
                if let Some(inner @ Value::Object(_)) = map.get(key) {
                    return Self::from_value(inner.clone());
                }
            }
        }
        serde_json::from_value(value)
    }
}

/// Filters for the operator transactions listing. Empty filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilters {
    pub merchant_id: Option<String>,
    pub merchant_name: Option<String>,
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl TransactionFilters {
    /// Query-string pairs, skipping unset and blank filters.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("merchantId", &self.merchant_id),
            ("merchantName", &self.merchant_name),
            ("status", &self.status),
            ("from", &self.from),
            ("to", &self.to),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            let value = value.as_deref()?.trim();
            (!value.is_empty()).then(|| (key, value.to_owned()))
        })
        .collect()
    }
}

/// Parse a transactions listing: `{ "transactions": [...] }` or a bare array.
///
/// # Errors
///
/// Returns an error if a row is not a JSON object.
pub fn transactions_from_value(value: Value) -> Result<Vec<Transaction>, serde_json::Error> {
    match value {
        Value::Array(_) => serde_json::from_value(value),
        Value::Object(mut map) => match map.remove("transactions") {
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(rows) => serde_json::from_value(rows),
        },
        _ => Ok(Vec::new()),
    }
}
