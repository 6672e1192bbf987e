// 🚨 Anomaly Engine - deliberate injection + rule-based detection
// Injection guarantees demo coverage: a bounded number of realistic billing
// anomalies across distinct merchants. Detection independently re-scans the
// whole dataset with the same rules a production monitor would use, so
// anomalies that emerged organically from the randomized schedule get
// labeled too.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::ids::{decode_id, epoch_month, make_id, Phase};
use crate::patterns::{analyze_pattern, MerchantPattern, AMOUNT_TOLERANCE};
use crate::profile::LifestyleProfile;
use crate::rng::{round_cents, SeededRng};
use crate::transaction::{AnomalyKind, Transaction, TransactionKind};

/// Bounds for the injected-anomaly target count.
pub const INJECTION_COUNT_RANGE: (u32, u32) = (2, 6);

/// A duplicate must land this many days before the expected interval.
const DUPLICATE_FORGIVENESS_DAYS: i64 = 3;

/// An overcharge must fall within this many days of the modal billing day.
const BILLING_DAY_WINDOW: i64 = 3;

/// An unexpected amount must be absent from the merchant's history within
/// this many calendar months on either side.
const UNEXPECTED_MONTH_WINDOW: i64 = 3;

/// Types rotate in this order across injected merchants.
const ROTATION: [AnomalyKind; 3] = [
    AnomalyKind::Duplicate,
    AnomalyKind::Overcharge,
    AnomalyKind::Unexpected,
];

// ============================================================================
// INJECTION
// ============================================================================

/// Deliberately seed 2-6 anomalies across distinct merchants drawn from the
/// dataset's subscription/recurring charges. Only records at or past
/// `eligible_from` are touched, so a prior dataset handed to extend mode is
/// never re-derived or mutated. Returns the number of anomalies placed.
pub fn inject_anomalies(
    transactions: &mut Vec<Transaction>,
    profile: &LifestyleProfile,
    eligible_from: usize,
) -> usize {
    let mut rng = SeededRng::from_str_seed(&format!("{}::anomalies", profile.id));

    // Distinct candidate merchants in first-seen order. Billing anomalies
    // only make sense on charges, so payroll is out even though recurring.
    let mut candidates: Vec<String> = Vec::new();
    for tx in &transactions[eligible_from..] {
        if (tx.subscription || tx.recurring)
            && tx.kind != TransactionKind::Income
            && !tx.suspicious
            && !candidates.contains(&tx.merchant)
        {
            candidates.push(tx.merchant.clone());
        }
    }

    let target = rng.range(INJECTION_COUNT_RANGE.0, INJECTION_COUNT_RANGE.1);
    let merchants = rng.pick_distinct(&candidates, target, target);

    // Anomaly-phase sequence counters, pre-seeded past any anomaly id
    // already present (an injected duplicate from a prior run can spill a
    // few days into a month this run generates).
    let mut sequences: BTreeMap<u64, u32> = BTreeMap::new();
    for tx in transactions.iter() {
        if let Some((epoch, tag, sequence)) = decode_id(&tx.id) {
            if tag == Phase::Anomaly.tag() {
                let next = sequences.entry(epoch).or_insert(0);
                *next = (*next).max(sequence + 1);
            }
        }
    }
    let mut next_id = |profile_id: &str, date: NaiveDate| {
        let sequence = sequences.entry(epoch_month(date)).or_insert(0);
        let id = make_id(profile_id, date, Phase::Anomaly, *sequence);
        *sequence += 1;
        id
    };

    let mut injected = 0;
    for (index, merchant) in merchants.iter().enumerate() {
        let positions: Vec<usize> = (eligible_from..transactions.len())
            .filter(|i| transactions[*i].merchant == *merchant && !transactions[*i].suspicious)
            .collect();
        if positions.is_empty() {
            continue;
        }
        let source_index = *rng.pick(&positions);

        match ROTATION[index % ROTATION.len()] {
            AnomalyKind::Duplicate => {
                let source = transactions[source_index].clone();
                let offset = rng.range(2, 4) as i64;
                let date = source.date + Duration::days(offset);
                let mut duplicate = Transaction {
                    id: next_id(&profile.id, date),
                    date,
                    parent_id: Some(source.id.clone()),
                    ..source.clone()
                };
                duplicate.suspicious = true;
                duplicate.anomaly_kind = Some(AnomalyKind::Duplicate);
                duplicate.suspicion_reason = Some(format!(
                    "Duplicate charge of ${:.2} only {} days after the original",
                    source.magnitude(),
                    offset
                ));
                transactions.push(duplicate);
            }
            AnomalyKind::Overcharge => {
                let original = transactions[source_index].clone();
                let percent = rng.range(10, 30);
                let raised = round_cents(original.amount * (1.0 + percent as f64 / 100.0));
                // Replace the record wholesale rather than poking its field.
                let mut updated = original.clone();
                updated.amount = raised;
                updated.suspicious = true;
                updated.anomaly_kind = Some(AnomalyKind::Overcharge);
                updated.suspicion_reason = Some(format!(
                    "Charge of ${:.2} is {}% above the usual ${:.2}",
                    raised.abs(),
                    percent,
                    original.magnitude()
                ));
                transactions[source_index] = updated;
            }
            AnomalyKind::Unexpected => {
                let source = transactions[source_index].clone();
                let offset = rng.range(5, 9) as i64;
                let date = source.date + Duration::days(offset);
                let amount = -rng.amount(1.50, 14.99);
                let mut unexpected = Transaction {
                    id: next_id(&profile.id, date),
                    date,
                    amount,
                    ..source.clone()
                };
                unexpected.suspicious = true;
                unexpected.anomaly_kind = Some(AnomalyKind::Unexpected);
                unexpected.suspicion_reason = Some(format!(
                    "Unrecognized ${:.2} charge from {}",
                    amount.abs(),
                    merchant
                ));
                unexpected.parent_id = None;
                transactions.push(unexpected);
            }
        }
        injected += 1;
    }

    injected
}

// ============================================================================
// DETECTION
// ============================================================================

/// Re-scan the dataset and label every not-yet-suspicious transaction that
/// any classifier matches. Classification reads a pre-pass snapshot, so the
/// outcome does not depend on label order. Records before `eligible_from`
/// are read for history but never labeled.
pub fn run_detection_pass(transactions: &mut [Transaction], eligible_from: usize) {
    let snapshot: Vec<Transaction> = transactions.to_vec();
    for index in eligible_from..transactions.len() {
        if transactions[index].suspicious {
            continue;
        }
        if let Some((kind, reason, parent_id)) = classify(&snapshot, &snapshot[index]) {
            transactions[index].mark_suspicious(kind, reason, parent_id);
        }
    }
}

/// Evaluate the three classifiers in priority order; first match wins.
fn classify(
    history: &[Transaction],
    tx: &Transaction,
) -> Option<(AnomalyKind, String, Option<String>)> {
    let pattern = analyze_pattern(history, &tx.merchant)?;

    if let Some(result) = classify_duplicate(history, tx, &pattern) {
        return Some(result);
    }
    if let Some(result) = classify_overcharge(tx, &pattern) {
        return Some(result);
    }
    classify_unexpected(history, tx, &pattern)
}

/// Right amount, wrong time: a known-normal amount repeated well inside the
/// merchant's expected billing interval.
fn classify_duplicate(
    history: &[Transaction],
    tx: &Transaction,
    pattern: &MerchantPattern,
) -> Option<(AnomalyKind, String, Option<String>)> {
    if !pattern.matches_normal_amount(tx.magnitude()) {
        return None;
    }
    let parent = history
        .iter()
        .filter(|earlier| {
            earlier.merchant == tx.merchant
                && earlier.id != tx.id
                && earlier.date < tx.date
                && (earlier.magnitude() - tx.magnitude()).abs() <= AMOUNT_TOLERANCE
        })
        .max_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)))?;

    let gap = (tx.date - parent.date).num_days();
    let expected = pattern.expected_interval_days;
    if gap < expected - DUPLICATE_FORGIVENESS_DAYS && gap * 2 < expected {
        let reason = format!(
            "Charged ${:.2} again {} days after {}; {} usually bills every {} days",
            tx.magnitude(),
            gap,
            parent.date,
            tx.merchant,
            expected
        );
        return Some((AnomalyKind::Duplicate, reason, Some(parent.id.clone())));
    }
    None
}

/// Right time, wrong amount: above every known normal amount, on or near the
/// merchant's modal billing day.
fn classify_overcharge(
    tx: &Transaction,
    pattern: &MerchantPattern,
) -> Option<(AnomalyKind, String, Option<String>)> {
    if tx.magnitude() <= pattern.max_normal_amount() + AMOUNT_TOLERANCE {
        return None;
    }
    let day_gap = (tx.date.day() as i64 - pattern.modal_billing_day as i64).abs();
    if day_gap > BILLING_DAY_WINDOW {
        return None;
    }
    let reason = format!(
        "${:.2} on the usual billing day (day {}) exceeds the usual ${:.2} for {}",
        tx.magnitude(),
        pattern.modal_billing_day,
        pattern.max_normal_amount(),
        tx.merchant
    );
    Some((AnomalyKind::Overcharge, reason, None))
}

/// A genuinely novel amount: matches no normal amount and has not appeared
/// for this merchant anywhere within the surrounding calendar-month window
/// (which keeps a second known billing plan from being flagged).
fn classify_unexpected(
    history: &[Transaction],
    tx: &Transaction,
    pattern: &MerchantPattern,
) -> Option<(AnomalyKind, String, Option<String>)> {
    if pattern.matches_normal_amount(tx.magnitude()) {
        return None;
    }
    let seen_nearby = history.iter().any(|other| {
        other.merchant == tx.merchant
            && other.id != tx.id
            && (other.magnitude() - tx.magnitude()).abs() <= AMOUNT_TOLERANCE
            && month_distance(other.date, tx.date) <= UNEXPECTED_MONTH_WINDOW
    });
    if seen_nearby {
        return None;
    }
    let reason = format!(
        "${:.2} does not match any usual amount for {}",
        tx.magnitude(),
        tx.merchant
    );
    Some((AnomalyKind::Unexpected, reason, None))
}

fn month_distance(a: NaiveDate, b: NaiveDate) -> i64 {
    let a_months = a.year() as i64 * 12 + a.month() as i64;
    let b_months = b.year() as i64 * 12 + b.month() as i64;
    (a_months - b_months).abs()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MerchantCatalog;
    use crate::profile::build_profile;
    use std::collections::HashSet;

    fn charge(id: &str, date: (i32, u32, u32), amount: f64, merchant: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            amount,
            description: format!("Recurring Payment - {merchant}"),
            merchant: merchant.to_string(),
            category: "Streaming".to_string(),
            kind: TransactionKind::Subscription,
            account: "Chase".to_string(),
            recurring: false,
            subscription: true,
            suspicious: false,
            anomaly_kind: None,
            suspicion_reason: None,
            parent_id: None,
        }
    }

    #[test]
    fn test_duplicate_two_days_apart() {
        // Two $15.99 Netflix charges on Jan 12 and Jan 14; a single gap
        // falls back to the 30-day expected interval, so the second charge
        // must classify as a duplicate of the first.
        let mut txs = vec![
            charge("t1", (2025, 1, 12), -15.99, "Netflix"),
            charge("t2", (2025, 1, 14), -15.99, "Netflix"),
        ];
        run_detection_pass(&mut txs, 0);

        assert!(!txs[0].suspicious);
        assert!(txs[1].suspicious);
        assert_eq!(txs[1].anomaly_kind, Some(AnomalyKind::Duplicate));
        assert_eq!(txs[1].parent_id.as_deref(), Some("t1"));
        let reason = txs[1].suspicion_reason.as_deref().unwrap();
        assert!(reason.contains("2 days"));
        assert!(reason.contains("30 days"));
    }

    #[test]
    fn test_overcharge_beats_unexpected_on_billing_day() {
        // $9.99 billed on day 12 historically; $12.99 lands on day 13.
        // Timing matches, amount does not: overcharge, not unexpected.
        let mut txs = vec![
            charge("t1", (2025, 1, 12), -9.99, "CloudBox"),
            charge("t2", (2025, 2, 12), -9.99, "CloudBox"),
            charge("t3", (2025, 3, 12), -9.99, "CloudBox"),
            charge("t4", (2025, 4, 13), -12.99, "CloudBox"),
        ];
        run_detection_pass(&mut txs, 0);

        assert!(txs[3].suspicious);
        assert_eq!(txs[3].anomaly_kind, Some(AnomalyKind::Overcharge));
        assert!(txs[0..3].iter().all(|tx| !tx.suspicious));
    }

    #[test]
    fn test_unexpected_novel_amount_off_cycle() {
        // Novel $47.13 far from the day-10 billing day: not a duplicate
        // (amount unknown), not an overcharge (wrong timing), so unexpected.
        let mut txs = vec![
            charge("t1", (2025, 1, 10), -9.99, "Hulu"),
            charge("t2", (2025, 2, 10), -9.99, "Hulu"),
            charge("t3", (2025, 3, 10), -9.99, "Hulu"),
            charge("t4", (2025, 3, 25), -47.13, "Hulu"),
        ];
        run_detection_pass(&mut txs, 0);

        assert!(txs[3].suspicious);
        assert_eq!(txs[3].anomaly_kind, Some(AnomalyKind::Unexpected));
    }

    #[test]
    fn test_second_plan_within_window_is_not_unexpected() {
        // A second $4.99 plan charged alongside the $15.49 one: the repeat
        // within the month window keeps it clean.
        let mut txs = vec![
            charge("t1", (2025, 1, 12), -15.49, "Netflix"),
            charge("t2", (2025, 2, 12), -15.49, "Netflix"),
            charge("t3", (2025, 2, 20), -4.99, "Netflix"),
            charge("t4", (2025, 3, 20), -4.99, "Netflix"),
        ];
        run_detection_pass(&mut txs, 0);
        assert!(!txs[2].suspicious);
        assert!(!txs[3].suspicious);
    }

    #[test]
    fn test_thin_history_short_circuits() {
        let mut txs = vec![charge("t1", (2025, 1, 12), -15.49, "Netflix")];
        run_detection_pass(&mut txs, 0);
        assert!(!txs[0].suspicious);
    }

    #[test]
    fn test_same_day_charge_is_not_a_duplicate() {
        // "Strictly earlier" means an equal date never anchors a duplicate.
        let mut txs = vec![
            charge("t1", (2025, 1, 12), -15.99, "Netflix"),
            charge("t2", (2025, 1, 12), -15.99, "Netflix"),
        ];
        run_detection_pass(&mut txs, 0);
        assert!(txs.iter().all(|tx| !tx.suspicious));
    }

    #[test]
    fn test_detection_respects_eligible_from() {
        let mut txs = vec![
            charge("t1", (2025, 1, 12), -15.99, "Netflix"),
            charge("t2", (2025, 1, 14), -15.99, "Netflix"),
        ];
        let eligible_from = txs.len();
        run_detection_pass(&mut txs, eligible_from);
        assert!(txs.iter().all(|tx| !tx.suspicious));
    }

    fn recurring_dataset(profile_id: &str) -> (LifestyleProfile, Vec<Transaction>) {
        let profile = build_profile(profile_id, MerchantCatalog::builtin());
        let mut txs = Vec::new();
        let mut sequence = 0u32;
        for month in 1..=6u32 {
            for plan in &profile.subscriptions {
                let date = NaiveDate::from_ymd_opt(2025, month, plan.billing_day).unwrap();
                let mut tx = charge(
                    &make_id(profile_id, date, Phase::Subscription, sequence),
                    (2025, month, plan.billing_day),
                    -plan.monthly_amount,
                    &plan.merchant,
                );
                tx.category = plan.category.category().to_string();
                txs.push(tx);
                sequence += 1;
            }
        }
        (profile, txs)
    }

    #[test]
    fn test_injection_bounds_and_type_coverage() {
        let (profile, mut txs) = recurring_dataset("inject-test");
        let before = txs.len();
        let injected = inject_anomalies(&mut txs, &profile, 0);

        assert!((2..=6).contains(&injected));

        let flagged_merchants: HashSet<&str> = txs
            .iter()
            .filter(|tx| tx.suspicious)
            .map(|tx| tx.merchant.as_str())
            .collect();
        assert!((2..=6).contains(&flagged_merchants.len()));

        let kinds: HashSet<AnomalyKind> = txs
            .iter()
            .filter_map(|tx| tx.anomaly_kind)
            .collect();
        if injected >= 3 {
            assert_eq!(kinds.len(), 3, "round-robin must cover all three types");
        }

        // Duplicates reference a real parent with the same amount.
        for tx in txs.iter().filter(|tx| tx.anomaly_kind == Some(AnomalyKind::Duplicate)) {
            let parent_id = tx.parent_id.as_deref().expect("duplicate without parent");
            let parent = txs.iter().find(|p| p.id == parent_id).expect("dangling parent");
            assert_eq!(parent.merchant, tx.merchant);
            assert!((parent.magnitude() - tx.magnitude()).abs() <= AMOUNT_TOLERANCE);
            assert!((2..=4).contains(&(tx.date - parent.date).num_days()));
        }

        // Overcharges replace in place, so the record count only grows by
        // the appended duplicates/unexpecteds.
        assert!(txs.len() >= before);
        let ids: HashSet<&str> = txs.iter().map(|tx| tx.id.as_str()).collect();
        assert_eq!(ids.len(), txs.len(), "identifiers must stay unique");
    }

    #[test]
    fn test_injection_is_deterministic() {
        let (profile, mut a) = recurring_dataset("inject-repeat");
        let (_, mut b) = recurring_dataset("inject-repeat");
        inject_anomalies(&mut a, &profile, 0);
        inject_anomalies(&mut b, &profile, 0);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_injection_never_touches_prior_records() {
        let (profile, mut txs) = recurring_dataset("inject-extend");
        let frozen = txs.clone();
        let eligible_from = txs.len();
        let injected = inject_anomalies(&mut txs, &profile, eligible_from);
        // No eligible records, no candidates, nothing to inject.
        assert_eq!(injected, 0);
        assert_eq!(txs, frozen);
    }
}
