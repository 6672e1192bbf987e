// 💳 Transaction Model - the atomic output unit
// Core fields are set once by the engine; the anomaly injector may replace a
// record wholesale (overcharge) and the detector only adds suspicion fields.
// After post-processing completes the whole collection is immutable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// TRANSACTION KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Subscription,
    Fee,
    InternalTransfer,
    ExternalTransfer,
    Refund,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Subscription => "subscription",
            TransactionKind::Fee => "fee",
            TransactionKind::InternalTransfer => "internal_transfer",
            TransactionKind::ExternalTransfer => "external_transfer",
            TransactionKind::Refund => "refund",
        }
    }
}

// ============================================================================
// ANOMALY KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    Duplicate,
    Overcharge,
    Unexpected,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::Duplicate => "duplicate",
            AnomalyKind::Overcharge => "overcharge",
            AnomalyKind::Unexpected => "unexpected",
        }
    }
}

// ============================================================================
// TRANSACTION
// ============================================================================

/// One ledger record. Positive amount = inflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Deterministic identifier (see `ids::make_id`).
    pub id: String,

    /// Calendar date of the charge.
    pub date: NaiveDate,

    /// Signed dollar amount, cents precision.
    pub amount: f64,

    pub description: String,
    pub merchant: String,
    pub category: String,
    pub kind: TransactionKind,

    /// Owning account reference (bank, card, or wallet name).
    pub account: String,

    /// Fixed recurring bill (housing, utilities, insurance, loans, payroll).
    #[serde(default, skip_serializing_if = "is_false")]
    pub recurring: bool,

    /// Subscription plan charge.
    #[serde(default, skip_serializing_if = "is_false")]
    pub subscription: bool,

    /// Flagged by the injector or the detection pass.
    #[serde(default, skip_serializing_if = "is_false")]
    pub suspicious: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomaly_kind: Option<AnomalyKind>,

    /// Free-text reason for the suspicion flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspicion_reason: Option<String>,

    /// Back-reference to the original charge when flagged as a duplicate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

// Serde helper (skip false flags so exported datasets stay compact)
fn is_false(value: &bool) -> bool {
    !*value
}

impl Transaction {
    /// Unsigned dollar amount.
    pub fn magnitude(&self) -> f64 {
        self.amount.abs()
    }

    /// Attach suspicion fields. The only post-creation mutation the
    /// detection pass performs.
    pub fn mark_suspicious(
        &mut self,
        kind: AnomalyKind,
        reason: String,
        parent_id: Option<String>,
    ) {
        self.suspicious = true;
        self.anomaly_kind = Some(kind);
        self.suspicion_reason = Some(reason);
        self.parent_id = parent_id;
    }
}

// ============================================================================
// TESTS
// ============================================================================
