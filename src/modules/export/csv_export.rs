//! CSV Export
//!
//! Projects payments and algorithm histories onto fixed CSV columns.

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::core::ExportError;
use crate::domain::{Algorithm, AlgorithmHistory, HistoryEntry, Payment};

pub const PAYMENTS_HEADER: [&str; 5] = ["timestamp", "amount", "fee", "transactionID", "type"];

pub const HISTORY_HEADER: [&str; 8] = [
    "algorithm",
    "timestamp",
    "accepted",
    "rejectedStale",
    "rejectedTarget",
    "rejectedDuplicate",
    "rejectedOther",
    "unpaidBalance",
];

/// Render Unix seconds as an RFC 3339 UTC timestamp
pub fn format_timestamp(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        // out of chrono's range, keep the raw value rather than drop the row
        .unwrap_or_else(|| ts.to_string())
}

/// CSV fields of one payment, in `PAYMENTS_HEADER` order
pub fn payment_record(payment: &Payment) -> [String; 5] {
    [
        format_timestamp(payment.timestamp),
        payment.amount.to_plain_string(),
        payment.fee.to_plain_string(),
        payment.tx_id.clone(),
        payment.kind.as_str().to_string(),
    ]
}

/// CSV fields of one history bucket, in `HISTORY_HEADER` order
pub fn history_record(algorithm: Algorithm, entry: &HistoryEntry) -> [String; 8] {
    let hashrate = &entry.hashrate;
    [
        algorithm.name().to_string(),
        format_timestamp(entry.timestamp),
        hashrate.accepted.to_plain_string(),
        hashrate.rejected_stale.to_plain_string(),
        hashrate.rejected_target.to_plain_string(),
        hashrate.rejected_duplicate.to_plain_string(),
        hashrate.rejected_other.to_plain_string(),
        entry.unpaid_balance.to_plain_string(),
    ]
}

/// Write payments as CSV, returning the number of data rows
pub fn write_payments<W: Write>(writer: W, payments: &[Payment]) -> Result<usize, ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(PAYMENTS_HEADER)?;
    for payment in payments {
        wtr.write_record(payment_record(payment))?;
    }

    wtr.flush()?;
    Ok(payments.len())
}

/// Write algorithm histories as CSV, one row per bucket, algorithm by algorithm
pub fn write_histories<W: Write>(
    writer: W,
    histories: &[AlgorithmHistory],
) -> Result<usize, ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut rows = 0;

    wtr.write_record(HISTORY_HEADER)?;
    for history in histories {
        for entry in &history.entries {
            wtr.write_record(history_record(history.algorithm, entry))?;
            rows += 1;
        }
    }

    wtr.flush()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::domain::{HashrateEntry, PaymentKind};

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn payment(amount: &str, fee: &str, kind: i64, ts: i64) -> Payment {
        Payment {
            amount: dec(amount),
            fee: dec(fee),
            tx_id: format!("tx{ts}"),
            timestamp: ts,
            kind: PaymentKind::from_code(kind),
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_timestamp(1704067200), "2024-01-01T00:00:00Z");
        assert_eq!(format_timestamp(1500), "1970-01-01T00:25:00Z");
        assert_eq!(format_timestamp(i64::MAX), i64::MAX.to_string());
    }

    #[test]
    fn test_decimals_stay_plain() {
        let p = payment("0.00000001", "1E-10", 0, 0);
        let record = payment_record(&p);
        assert_eq!(record[1], "0.00000001");
        assert_eq!(record[2], "0.0000000001");
    }

    #[test]
    fn test_history_record_columns() {
        let entry = HistoryEntry {
            timestamp: 1_500_000_000,
            hashrate: HashrateEntry {
                accepted: dec("0.01234"),
                rejected_stale: dec("0.5"),
                ..HashrateEntry::default()
            },
            unpaid_balance: dec("0.00031000"),
        };

        let record = history_record(Algorithm::from_code(20), &entry);
        assert_eq!(
            record,
            [
                "DaggerHashimoto",
                "2017-07-14T02:40:00Z",
                "0.01234",
                "0.5",
                "0",
                "0",
                "0",
                "0.00031000",
            ]
        );
    }

    #[test]
    fn test_payments_round_trip() {
        let payments = vec![
            payment("0.12345678901234567890", "0.0001", 0, 1514764800),
            payment("1000000000000.5", "0", 1, 1514851200),
            payment("3", "0.25", 9, 1514937600),
        ];

        let mut out = Vec::new();
        let rows = write_payments(&mut out, &payments).unwrap();
        assert_eq!(rows, 3);

        let mut reader = csv::Reader::from_reader(out.as_slice());
        let header: Vec<&str> = reader.headers().unwrap().iter().collect();
        assert_eq!(header, PAYMENTS_HEADER);

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        for (record, payment) in records.iter().zip(&payments) {
            assert_eq!(dec(&record[1]), payment.amount);
            assert_eq!(dec(&record[2]), payment.fee);
        }
        assert_eq!(&records[0][0], "2018-01-01T00:00:00Z");
        assert_eq!(&records[0][1], "0.12345678901234567890");
        assert_eq!(&records[0][4], "standard");
        assert_eq!(&records[1][4], "internal");
        assert_eq!(&records[2][4], "unknown");
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let mut out = Vec::new();
        assert_eq!(write_histories(&mut out, &[]).unwrap(), 0);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "algorithm,timestamp,accepted,rejectedStale,rejectedTarget,rejectedDuplicate,rejectedOther,unpaidBalance\n"
        );
    }

    #[test]
    fn test_histories_written_in_api_order() {
        let entry = |ts| HistoryEntry {
            timestamp: ts,
            hashrate: HashrateEntry::default(),
            unpaid_balance: dec("0"),
        };
        let histories = vec![
            AlgorithmHistory {
                algorithm: Algorithm::from_code(1),
                entries: vec![entry(300), entry(600)],
            },
            AlgorithmHistory {
                algorithm: Algorithm::from_code(77),
                entries: vec![entry(0)],
            },
        ];

        let mut out = Vec::new();
        assert_eq!(write_histories(&mut out, &histories).unwrap(), 3);

        let text = String::from_utf8(out).unwrap();
        let algos: Vec<&str> = text
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(algos, ["SHA256", "SHA256", "Unknown"]);
    }
}
