//! Typed records decoded from the provider stats API

use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::Algorithm;

/// How a payment was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentKind {
    Standard,
    Internal,
    Unknown(i64),
}

impl PaymentKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => PaymentKind::Standard,
            1 => PaymentKind::Internal,
            other => PaymentKind::Unknown(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentKind::Standard => "standard",
            PaymentKind::Internal => "internal",
            PaymentKind::Unknown(_) => "unknown",
        }
    }
}

impl Default for PaymentKind {
    fn default() -> Self {
        PaymentKind::Standard
    }
}

impl<'de> Deserialize<'de> for PaymentKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(PaymentKind::from_code)
    }
}

/// A single payout to the provider address
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Payment {
    #[serde(default, deserialize_with = "de_decimal")]
    pub amount: BigDecimal,
    #[serde(default, deserialize_with = "de_decimal")]
    pub fee: BigDecimal,
    #[serde(rename = "TXID", default)]
    pub tx_id: String,
    /// Unix seconds
    #[serde(rename = "time", default)]
    pub timestamp: i64,
    #[serde(rename = "type", default)]
    pub kind: PaymentKind,
}

/// Share counters for one history bucket.
///
/// The API leaves out counters that are zero, so every field defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HashrateEntry {
    #[serde(rename = "a", default, deserialize_with = "de_decimal")]
    pub accepted: BigDecimal,
    #[serde(rename = "rs", default, deserialize_with = "de_decimal")]
    pub rejected_stale: BigDecimal,
    #[serde(rename = "rt", default, deserialize_with = "de_decimal")]
    pub rejected_target: BigDecimal,
    #[serde(rename = "rd", default, deserialize_with = "de_decimal")]
    pub rejected_duplicate: BigDecimal,
    #[serde(rename = "ro", default, deserialize_with = "de_decimal")]
    pub rejected_other: BigDecimal,
}

/// Hashrate and unpaid balance of one algorithm in one 5-minute bucket
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Unix seconds (bucket index * 300)
    pub timestamp: i64,
    pub hashrate: HashrateEntry,
    pub unpaid_balance: BigDecimal,
}

/// History of one algorithm, in the order the API returned it
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmHistory {
    pub algorithm: Algorithm,
    pub entries: Vec<HistoryEntry>,
}

/// Parse a decimal from its JSON form.
///
/// Amounts arrive either quoted (`"0.0001"`) or as bare numbers. serde_json
/// is built with `arbitrary_precision`, so a bare number keeps its literal
/// text and both forms are parsed without passing through `f64`.
pub fn decimal_from_value(value: &Value) -> Result<BigDecimal, String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => return Err(format!("expected decimal, got {other}")),
    };
    BigDecimal::from_str(&text).map_err(|e| format!("invalid decimal {text:?}: {e}"))
}

fn de_decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
    let value = Value::deserialize(deserializer)?;
    decimal_from_value(&value).map_err(serde::de::Error::custom)
}
