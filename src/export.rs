// 📤 Dataset Export - in-memory CSV/JSON rendering
// The core performs no I/O; both renderers write into buffers and hand the
// caller a string. Column order is fixed so exports diff cleanly across
// runs of the same seed.

use anyhow::{Context, Result};

use crate::transaction::Transaction;

const CSV_HEADERS: [&str; 14] = [
    "Id",
    "Date",
    "Amount",
    "Description",
    "Merchant",
    "Category",
    "Kind",
    "Account",
    "Recurring",
    "Subscription",
    "Suspicious",
    "Anomaly_Type",
    "Suspicion_Reason",
    "Parent_Id",
];

/// Render the dataset as CSV with a fixed header row.
pub fn to_csv(transactions: &[Transaction]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CSV_HEADERS)
        .context("writing CSV header")?;

    for tx in transactions {
        writer
            .write_record([
                tx.id.clone(),
                tx.date.to_string(),
                format!("{:.2}", tx.amount),
                tx.description.clone(),
                tx.merchant.clone(),
                tx.category.clone(),
                tx.kind.as_str().to_string(),
                tx.account.clone(),
                tx.recurring.to_string(),
                tx.subscription.to_string(),
                tx.suspicious.to_string(),
                tx.anomaly_kind.map(|k| k.as_str()).unwrap_or("").to_string(),
                tx.suspicion_reason.clone().unwrap_or_default(),
                tx.parent_id.clone().unwrap_or_default(),
            ])
            .with_context(|| format!("writing CSV row for {}", tx.id))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("finalizing CSV buffer: {}", err.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Render the dataset as pretty-printed JSON.
pub fn to_json(transactions: &[Transaction]) -> Result<String> {
    serde_json::to_string_pretty(transactions).context("serializing transactions to JSON")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{AnomalyKind, TransactionKind};
    use chrono::NaiveDate;

    fn sample() -> Vec<Transaction> {
        let mut dup = Transaction {
            id: "k3f9-08ca000".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 14).unwrap(),
            amount: -15.49,
            description: "Recurring Payment - Netflix".to_string(),
            merchant: "Netflix".to_string(),
            category: "Streaming".to_string(),
            kind: TransactionKind::Subscription,
            account: "Chase".to_string(),
            recurring: false,
            subscription: true,
            suspicious: false,
            anomaly_kind: None,
            suspicion_reason: None,
            parent_id: None,
        };
        let original = Transaction {
            id: "k3f9-08cs000".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 12).unwrap(),
            ..dup.clone()
        };
        dup.mark_suspicious(
            AnomalyKind::Duplicate,
            "Duplicate charge of $15.49 only 2 days after the original".to_string(),
            Some(original.id.clone()),
        );
        vec![original, dup]
    }

    #[test]
    fn test_csv_has_header_and_one_row_per_transaction() {
        let csv = to_csv(&sample()).unwrap();
        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Id,Date,Amount"));
        assert!(lines[1].contains("2025-01-12"));
        assert!(lines[2].contains("duplicate"));
        assert!(lines[2].contains("k3f9-08cs000"));
    }

    #[test]
    fn test_csv_is_deterministic() {
        assert_eq!(to_csv(&sample()).unwrap(), to_csv(&sample()).unwrap());
    }

    #[test]
    fn test_json_round_trips() {
        let txs = sample();
        let json = to_json(&txs).unwrap();
        let back: Vec<Transaction> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, txs);
    }
}
