// 📈 Merchant Pattern Analyzer - statistical "normal" per merchant
// Ephemeral: recomputed on demand from transaction history, never persisted.
// A merchant with fewer than two observed transactions yields no pattern and
// every classifier downstream short-circuits to "not suspicious".

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::ids::pattern_fingerprint;
use crate::transaction::Transaction;

/// Tolerance for dollar-amount comparisons. Exact f64 equality would miss
/// matches through rounding noise.
pub const AMOUNT_TOLERANCE: f64 = 0.10;

/// Expected interval when a merchant has fewer than two observed gaps.
pub const DEFAULT_INTERVAL_DAYS: i64 = 30;

/// Billing day when history is too thin to vote.
pub const DEFAULT_BILLING_DAY: u32 = 15;

// ============================================================================
// MERCHANT PATTERN
// ============================================================================

/// The statistical baseline for one merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantPattern {
    pub merchant: String,

    /// Amount magnitudes seen at least twice, sorted ascending. Falls back
    /// to all distinct magnitudes when nothing recurs, which keeps a
    /// merchant with two simultaneous billing plans analyzable.
    pub normal_amounts: Vec<f64>,

    /// Modal gap between consecutive charges, rounded to the nearest 7-day
    /// bucket. Irregular histories (a skipped month) can shift this
    /// baseline; the heuristic is preserved as-is.
    pub expected_interval_days: i64,

    /// Most common day-of-month for this merchant's charges.
    pub modal_billing_day: u32,

    /// Lightweight pattern key (see `ids::pattern_fingerprint`).
    pub fingerprint: String,

    pub observation_count: usize,
}

impl MerchantPattern {
    /// Does `magnitude` match any known normal amount within tolerance?
    pub fn matches_normal_amount(&self, magnitude: f64) -> bool {
        self.normal_amounts
            .iter()
            .any(|normal| (normal - magnitude).abs() <= AMOUNT_TOLERANCE)
    }

    /// Largest known normal amount.
    pub fn max_normal_amount(&self) -> f64 {
        self.normal_amounts.last().copied().unwrap_or(0.0)
    }
}

// ============================================================================
// ANALYSIS
// ============================================================================

/// Derive the pattern for one merchant, or `None` with fewer than two
/// same-merchant transactions.
pub fn analyze_pattern(transactions: &[Transaction], merchant: &str) -> Option<MerchantPattern> {
    let mut history: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| tx.merchant == merchant)
        .collect();
    if history.len() < 2 {
        return None;
    }
    history.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

    // Recurring amounts, in cents so equal charges actually collide.
    let mut amount_counts: BTreeMap<i64, usize> = BTreeMap::new();
    for tx in &history {
        *amount_counts.entry(to_cents(tx.magnitude())).or_insert(0) += 1;
    }
    let mut normal_amounts: Vec<f64> = amount_counts
        .iter()
        .filter(|(_, count)| **count >= 2)
        .map(|(cents, _)| *cents as f64 / 100.0)
        .collect();
    if normal_amounts.is_empty() {
        normal_amounts = amount_counts.keys().map(|cents| *cents as f64 / 100.0).collect();
    }

    // Consecutive-pair gaps, bucketed to the nearest week.
    let gaps: Vec<i64> = history
        .windows(2)
        .map(|pair| (pair[1].date - pair[0].date).num_days())
        .collect();
    let expected_interval_days = if gaps.len() < 2 {
        DEFAULT_INTERVAL_DAYS
    } else {
        modal_value(gaps.iter().map(|gap| round_to_week(*gap))).unwrap_or(DEFAULT_INTERVAL_DAYS)
    };

    let modal_billing_day = modal_value(history.iter().map(|tx| tx.date.day() as i64))
        .map(|day| day as u32)
        .unwrap_or(DEFAULT_BILLING_DAY);

    let fingerprint = pattern_fingerprint(
        merchant,
        normal_amounts.last().copied().unwrap_or(0.0),
        modal_billing_day,
    );

    Some(MerchantPattern {
        merchant: merchant.to_string(),
        normal_amounts,
        expected_interval_days,
        modal_billing_day,
        fingerprint,
        observation_count: history.len(),
    })
}

fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

fn round_to_week(gap: i64) -> i64 {
    ((gap as f64 / 7.0).round() as i64) * 7
}

/// Most frequent value; ties go to the smallest.
fn modal_value<I: Iterator<Item = i64>>(values: I) -> Option<i64> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by_key(|(value, count)| (*count, std::cmp::Reverse(*value)))
        .map(|(value, _)| value)
}

// ============================================================================
// TESTS
// ============================================================================
