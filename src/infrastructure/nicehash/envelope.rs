//! Response envelope validation and history tuple parsing

use serde::Deserialize;
use serde_json::Value;

use crate::core::{ExportError, RecordError};
use crate::domain::{
    decimal_from_value, Algorithm, AlgorithmHistory, HashrateEntry, HistoryEntry, Payment,
};

pub const METHOD_PAYMENTS: &str = "stats.provider.payments";
pub const METHOD_EX: &str = "stats.provider.ex";

/// History buckets are 5 minutes wide
pub const BUCKET_SECS: i64 = 300;

const HISTORY_ARITY: usize = 3;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    method: String,
    #[serde(default)]
    result: ProviderStats,
}

/// The `result` object shared by both provider stats methods
#[derive(Debug, Default, Deserialize)]
pub struct ProviderStats {
    #[serde(default)]
    pub error: String,
    #[serde(rename = "addr", default)]
    pub address: String,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    past: Vec<RawAlgorithmHistory>,
}

#[derive(Debug, Deserialize)]
struct RawAlgorithmHistory {
    algo: Algorithm,
    #[serde(default)]
    data: Vec<Value>,
}

/// Validate a raw HTTP response against the method and address asked for.
///
/// Checks run in a fixed order: status, JSON shape, embedded `error`, echoed
/// `method`, echoed `addr`. A non-200 response whose body still carries an
/// API error message reports that message instead of the bare status.
pub fn decode_response(
    status: u16,
    body: &str,
    method: &str,
    addr: &str,
) -> Result<ProviderStats, ExportError> {
    if status != 200 {
        return match serde_json::from_str::<Envelope>(body) {
            Ok(envelope) if !envelope.result.error.is_empty() => {
                Err(ExportError::Api(envelope.result.error))
            }
            _ => Err(ExportError::http_status(status, body)),
        };
    }

    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| ExportError::decode(e, body))?;

    if !envelope.result.error.is_empty() {
        return Err(ExportError::Api(envelope.result.error));
    }

    if envelope.method != method {
        return Err(ExportError::ProtocolMismatch {
            field: "method",
            expected: method.to_string(),
            actual: envelope.method,
        });
    }

    if envelope.result.address != addr {
        return Err(ExportError::ProtocolMismatch {
            field: "addr",
            expected: addr.to_string(),
            actual: envelope.result.address,
        });
    }

    Ok(envelope.result)
}

impl ProviderStats {
    /// Payments at or after `since`.
    ///
    /// The payments method ignores any time bound and returns the full
    /// history of the address, so the bound is applied here.
    pub fn payments_since(self, since: i64) -> Vec<Payment> {
        self.payments
            .into_iter()
            .filter(|payment| payment.timestamp >= since)
            .collect()
    }

    /// Decode every algorithm's raw history tuples, failing on the first bad one
    pub fn algorithm_histories(self) -> Result<Vec<AlgorithmHistory>, ExportError> {
        self.past
            .into_iter()
            .map(|raw| -> Result<AlgorithmHistory, ExportError> {
                let entries = raw
                    .data
                    .iter()
                    .map(parse_history_entry)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(AlgorithmHistory {
                    algorithm: raw.algo,
                    entries,
                })
            })
            .collect()
    }
}

/// Parse one `[bucketIndex, {hashrate}, unpaidBalance]` tuple
pub fn parse_history_entry(value: &Value) -> Result<HistoryEntry, RecordError> {
    let raw = value.to_string();
    let Value::Array(items) = value else {
        return Err(RecordError::Field {
            field: "history entry",
            reason: "expected an array".to_string(),
            raw,
        });
    };

    if items.len() != HISTORY_ARITY {
        return Err(RecordError::Arity {
            expected: HISTORY_ARITY,
            actual: items.len(),
            raw,
        });
    }

    let field_error = |field: &'static str, reason: String| RecordError::Field {
        field,
        reason,
        raw: raw.clone(),
    };

    let index = items[0]
        .as_i64()
        .filter(|index| *index >= 0)
        .ok_or_else(|| {
            field_error(
                "timestamp",
                format!("expected non-negative integer, got {}", items[0]),
            )
        })?;
    let timestamp = index
        .checked_mul(BUCKET_SECS)
        .ok_or_else(|| field_error("timestamp", format!("bucket index {index} out of range")))?;

    let hashrate = HashrateEntry::deserialize(&items[1])
        .map_err(|e| field_error("hashrate", e.to_string()))?;

    let unpaid_balance =
        decimal_from_value(&items[2]).map_err(|reason| field_error("unpaid balance", reason))?;

    Ok(HistoryEntry {
        timestamp,
        hashrate,
        unpaid_balance,
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use serde_json::json;

    use super::*;
    use crate::domain::PaymentKind;

    const ADDR: &str = "3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy";

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn ex_body(past: Value) -> String {
        json!({
            "method": METHOD_EX,
            "result": { "addr": ADDR, "past": past }
        })
        .to_string()
    }

    #[test]
    fn test_parse_history_entry() {
        let entry = parse_history_entry(&json!([
            5,
            {"a": "1.0", "rs": "0", "rt": "0", "rd": "0", "ro": "0"},
            "2.5"
        ]))
        .unwrap();

        assert_eq!(entry.timestamp, 1500);
        assert_eq!(entry.hashrate.accepted, dec("1.0"));
        assert_eq!(entry.unpaid_balance, dec("2.5"));
    }

    #[test]
    fn test_parse_history_entry_numeric_balance_is_exact() {
        let value: Value = serde_json::from_str(
            r#"[7, {"a": 1234567890.123456789012345, "rs": 0}, 98765432109876543210987654321]"#,
        )
        .unwrap();

        let entry = parse_history_entry(&value).unwrap();
        assert_eq!(entry.timestamp, 2100);
        assert_eq!(entry.hashrate.accepted.to_plain_string(), "1234567890.123456789012345");
        assert_eq!(
            entry.unpaid_balance.to_plain_string(),
            "98765432109876543210987654321"
        );
    }

    #[test]
    fn test_parse_history_entry_wrong_arity() {
        for value in [json!([5, {}]), json!([5, {}, "1", "extra"])] {
            let err = parse_history_entry(&value).unwrap_err();
            match err {
                RecordError::Arity {
                    expected, actual, ..
                } => {
                    assert_eq!(expected, 3);
                    assert_eq!(actual, value.as_array().unwrap().len());
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_history_entry_bad_fields() {
        let err = parse_history_entry(&json!(["x", {}, "1"])).unwrap_err();
        assert!(matches!(err, RecordError::Field { field: "timestamp", .. }));

        let err = parse_history_entry(&json!([1, "fast", "1"])).unwrap_err();
        assert!(matches!(err, RecordError::Field { field: "hashrate", .. }));

        let err = parse_history_entry(&json!([1, {}, null])).unwrap_err();
        assert!(matches!(err, RecordError::Field { field: "unpaid balance", .. }));

        let err = parse_history_entry(&json!({"not": "a tuple"})).unwrap_err();
        assert!(matches!(err, RecordError::Field { field: "history entry", .. }));
    }

    #[test]
    fn test_decode_ex_histories() {
        let body = ex_body(json!([
            {"algo": 20, "data": [[5000000, {"a": "0.5"}, "0.001"], [5000001, {}, 0.002]]},
            {"algo": 99, "data": []}
        ]));

        let histories = decode_response(200, &body, METHOD_EX, ADDR)
            .unwrap()
            .algorithm_histories()
            .unwrap();

        assert_eq!(histories.len(), 2);
        assert_eq!(histories[0].algorithm, Algorithm::DaggerHashimoto);
        assert_eq!(histories[0].entries[0].timestamp, 1_500_000_000);
        assert_eq!(histories[0].entries[1].timestamp, 1_500_000_300);
        assert_eq!(histories[0].entries[1].unpaid_balance, dec("0.002"));
        assert_eq!(histories[1].algorithm.name(), "Unknown");
        assert!(histories[1].entries.is_empty());
    }

    #[test]
    fn test_decode_malformed_tuple_is_error() {
        let body = ex_body(json!([{"algo": 1, "data": [[1, {}]]}]));
        let err = decode_response(200, &body, METHOD_EX, ADDR)
            .unwrap()
            .algorithm_histories()
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::MalformedRecord(RecordError::Arity { actual: 2, .. })
        ));
    }

    #[test]
    fn test_api_error_wins_regardless_of_status() {
        let body = json!({
            "method": METHOD_EX,
            "result": {"error": "Incorrect address"}
        })
        .to_string();

        for status in [200, 400, 500] {
            let err = decode_response(status, &body, METHOD_EX, ADDR).unwrap_err();
            assert!(
                matches!(&err, ExportError::Api(msg) if msg == "Incorrect address"),
                "status {status}: {err:?}"
            );
        }
    }

    #[test]
    fn test_non_200_without_api_error() {
        let err = decode_response(502, "<html>bad gateway</html>", METHOD_EX, ADDR).unwrap_err();
        match err {
            ExportError::HttpStatus { status, body } => {
                assert_eq!(status, 502);
                assert!(body.contains("bad gateway"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = decode_response(200, "{not json", METHOD_EX, ADDR).unwrap_err();
        assert!(matches!(err, ExportError::Decode { .. }));
    }

    #[test]
    fn test_method_and_address_echo() {
        let err = decode_response(200, &ex_body(json!([])), METHOD_PAYMENTS, ADDR).unwrap_err();
        assert!(matches!(
            err,
            ExportError::ProtocolMismatch { field: "method", .. }
        ));

        let err = decode_response(200, &ex_body(json!([])), METHOD_EX, "someone-else").unwrap_err();
        match err {
            ExportError::ProtocolMismatch {
                field,
                expected,
                actual,
            } => {
                assert_eq!(field, "addr");
                assert_eq!(expected, "someone-else");
                assert_eq!(actual, ADDR);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_payments_since_is_left_inclusive() {
        let body = json!({
            "method": METHOD_PAYMENTS,
            "result": {
                "addr": ADDR,
                "payments": [
                    {"amount": "1", "fee": "0", "TXID": "a", "time": 999, "type": 0},
                    {"amount": "2", "fee": "0", "TXID": "b", "time": 1000, "type": 1},
                    {"amount": "3", "fee": "0", "TXID": "", "time": 1001, "type": 0}
                ]
            }
        })
        .to_string();

        let payments = decode_response(200, &body, METHOD_PAYMENTS, ADDR)
            .unwrap()
            .payments_since(1000);

        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].tx_id, "b");
        assert_eq!(payments[0].kind, PaymentKind::Internal);
        assert_eq!(payments[1].timestamp, 1001);
    }
}
