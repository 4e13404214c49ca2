//! Lenient numeric coercion for untrusted backend JSON.
//!
//! Backend versions disagree on whether amounts are JSON numbers or numeric
//! strings. Everything funnels through [`coerce_amount`] so that the rules for
//! "absent", "present" and "malformed" are identical across the crate.

use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Outcome of coercing one JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coerced<T> {
    /// The value is `null` (or the key is missing). Resolution moves on.
    Absent,
    /// A usable value.
    Value(T),
    /// Present but unusable. Callers substitute a default and report it.
    Malformed(MalformedKind),
}

/// Why a present value could not be used as an amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedKind {
    /// A string that does not parse as a decimal number.
    #[error("not a number: {0:?}")]
    Unparsable(String),
    /// A JSON value of the wrong type (boolean, array, object).
    #[error("expected a number, found {0}")]
    WrongType(&'static str),
    /// Amounts in this domain are magnitudes and never negative.
    #[error("negative amount {0}")]
    Negative(Decimal),
    /// A count that is not a whole, non-negative number.
    #[error("not a whole count: {0}")]
    NotACount(Decimal),
}

/// A field that was present in the payload but not coercible.
///
/// Always recovered locally: the field takes its default and normalization
/// continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed field `{field}` at `{path}`: {kind}")]
pub struct MalformedFieldError {
    /// Target field name (e.g. `available_balance`).
    pub field: &'static str,
    /// Dotted source path the bad value was found at.
    pub path: String,
    /// What was wrong with it.
    pub kind: MalformedKind,
}

/// Coerce a JSON value into a non-negative decimal amount.
#[must_use]
pub fn coerce_amount(value: &Value) -> Coerced<Decimal> {
    let parsed = match value {
        Value::Null => return Coerced::Absent,
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        Value::Bool(_) => return Coerced::Malformed(MalformedKind::WrongType("boolean")),
        Value::Array(_) => return Coerced::Malformed(MalformedKind::WrongType("array")),
        Value::Object(_) => return Coerced::Malformed(MalformedKind::WrongType("object")),
    };

    match parsed {
        Some(amount) if amount.is_sign_negative() && !amount.is_zero() => {
            Coerced::Malformed(MalformedKind::Negative(amount))
        }
        Some(amount) => Coerced::Value(amount.normalize()),
        None => Coerced::Malformed(MalformedKind::Unparsable(value_text(value))),
    }
}

/// Coerce a JSON value into a non-negative whole count.
#[must_use]
pub fn coerce_count(value: &Value) -> Coerced<u64> {
    match coerce_amount(value) {
        Coerced::Absent => Coerced::Absent,
        Coerced::Malformed(kind) => Coerced::Malformed(kind),
        Coerced::Value(amount) => match amount.fract().is_zero().then(|| amount.to_u64()) {
            Some(Some(count)) => Coerced::Value(count),
            _ => Coerced::Malformed(MalformedKind::NotACount(amount)),
        },
    }
}

/// Coerce a JSON value into a boolean flag.
///
/// Accepts real booleans and the strings `"true"`/`"false"`.
#[must_use]
pub fn coerce_flag(value: &Value) -> Coerced<bool> {
    match value {
        Value::Null => Coerced::Absent,
        Value::Bool(b) => Coerced::Value(*b),
        Value::String(s) => match s.trim() {
            "true" => Coerced::Value(true),
            "false" => Coerced::Value(false),
            other => Coerced::Malformed(MalformedKind::Unparsable(other.to_owned())),
        },
        Value::Number(_) => Coerced::Malformed(MalformedKind::WrongType("number")),
        Value::Array(_) => Coerced::Malformed(MalformedKind::WrongType("array")),
        Value::Object(_) => Coerced::Malformed(MalformedKind::WrongType("object")),
    }
}

/// Serde helper for record fields whose amounts may be numbers, numeric
/// strings, `null` or garbage. Garbage becomes `None` with a warning.
///
/// # Errors
///
/// Only fails if the underlying deserializer cannot produce a JSON value.
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
    Ok(match coerce_amount(&value) {
        Coerced::Value(amount) => Some(amount),
        Coerced::Absent => None,
        Coerced::Malformed(kind) => {
            tracing::warn!(%kind, "Ignoring malformed amount in record");
            None
        }
    })
}

/// Serde helper for whole counts. Garbage becomes `None` with a warning.
///
/// # Errors
///
/// Only fails if the underlying deserializer cannot produce a JSON value.
pub fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
    Ok(match coerce_count(&value) {
        Coerced::Value(count) => Some(count),
        Coerced::Absent => None,
        Coerced::Malformed(kind) => {
            tracing::warn!(%kind, "Ignoring malformed count in record");
            None
        }
    })
}

/// Serde helper for boolean flags sent as booleans or `"true"`/`"false"`.
/// Garbage becomes `None` with a warning.
///
/// # Errors
///
/// Only fails if the underlying deserializer cannot produce a JSON value.
pub fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
    Ok(match coerce_flag(&value) {
        Coerced::Value(flag) => Some(flag),
        Coerced::Absent => None,
        Coerced::Malformed(kind) => {
            tracing::warn!(%kind, "Ignoring malformed flag in record");
            None
        }
    })
}

/// Serde helper for string enums the backend may extend. Unknown or
/// non-string values become `None`.
///
/// # Errors
///
/// Only fails if the underlying deserializer cannot produce a JSON value.
pub fn lenient_parse<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
    Ok(match value {
        Value::Null => None,
        Value::String(s) => {
            let parsed = s.trim().parse().ok();
            if parsed.is_none() {
                tracing::warn!(value = %s, "Ignoring unrecognised value in record");
            }
            parsed
        }
        other => {
            tracing::warn!(value = %other, "Ignoring non-string value in record");
            None
        }
    })
}

/// Serde helper that maps `null` to the type's default.
///
/// # Errors
///
/// Fails if a non-null value does not deserialize as `T`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_numbers_and_numeric_strings() {
        assert_eq!(coerce_amount(&json!(5000)), Coerced::Value(dec("5000")));
        assert_eq!(coerce_amount(&json!(12.75)), Coerced::Value(dec("12.75")));
        assert_eq!(coerce_amount(&json!("1200.50")), Coerced::Value(dec("1200.5")));
        assert_eq!(coerce_amount(&json!("  42 ")), Coerced::Value(dec("42")));
        assert_eq!(coerce_amount(&json!("1e3")), Coerced::Value(dec("1000")));
    }

    #[test]
    fn test_zero_is_a_value() {
        assert_eq!(coerce_amount(&json!(0)), Coerced::Value(Decimal::ZERO));
        assert_eq!(coerce_amount(&json!("0.00")), Coerced::Value(Decimal::ZERO));
    }

    #[test]
    fn test_null_is_absent() {
        assert_eq!(coerce_amount(&Value::Null), Coerced::Absent);
    }

    #[test]
    fn test_malformed_values() {
        assert!(matches!(
            coerce_amount(&json!("abc")),
            Coerced::Malformed(MalformedKind::Unparsable(_))
        ));
        assert!(matches!(
            coerce_amount(&json!("")),
            Coerced::Malformed(MalformedKind::Unparsable(_))
        ));
        assert!(matches!(
            coerce_amount(&json!(true)),
            Coerced::Malformed(MalformedKind::WrongType("boolean"))
        ));
        assert!(matches!(
            coerce_amount(&json!({"value": 1})),
            Coerced::Malformed(MalformedKind::WrongType("object"))
        ));
        assert!(matches!(
            coerce_amount(&json!(-10)),
            Coerced::Malformed(MalformedKind::Negative(_))
        ));
    }

    #[test]
    fn test_counts() {
        assert_eq!(coerce_count(&json!(12)), Coerced::Value(12));
        assert_eq!(coerce_count(&json!("7")), Coerced::Value(7));
        assert!(matches!(
            coerce_count(&json!(2.5)),
            Coerced::Malformed(MalformedKind::NotACount(_))
        ));
    }

    #[test]
    fn test_flags() {
        assert_eq!(coerce_flag(&json!(false)), Coerced::Value(false));
        assert_eq!(coerce_flag(&json!("true")), Coerced::Value(true));
        assert!(matches!(coerce_flag(&json!(1)), Coerced::Malformed(_)));
    }

    #[test]
    fn test_lenient_amount_in_record() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "lenient_amount")]
            amount: Option<Decimal>,
        }

        let row: Row = serde_json::from_value(json!({"amount": "99.9"})).unwrap();
        assert_eq!(row.amount, Some(dec("99.9")));
        let row: Row = serde_json::from_value(json!({"amount": "n/a"})).unwrap();
        assert_eq!(row.amount, None);
        let row: Row = serde_json::from_value(json!({})).unwrap();
        assert_eq!(row.amount, None);
    }

    #[test]
    fn test_lenient_parse_and_count() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "lenient_parse")]
            mode: Option<crate::types::TransferMode>,
            #[serde(default, deserialize_with = "lenient_count")]
            count: Option<u64>,
        }

        let row: Row = serde_json::from_value(json!({"mode": "bank_transfer", "count": "3"})).unwrap();
        assert_eq!(row.mode, Some(crate::types::TransferMode::BankTransfer));
        assert_eq!(row.count, Some(3));
        let row: Row = serde_json::from_value(json!({"mode": "carrier_pigeon", "count": -1})).unwrap();
        assert_eq!(row.mode, None);
        assert_eq!(row.count, None);
    }
}
