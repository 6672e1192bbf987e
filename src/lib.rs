// Ledger Forge - Core Library
// Deterministic synthetic household-transaction generation with anomaly
// injection and pattern-based detection. Pure: a function of (seed, date
// range, optional prior output) to an ordered transaction collection.

pub mod rng;
pub mod ids;
pub mod catalog;
pub mod transaction;
pub mod profile;
pub mod engine;
pub mod patterns;
pub mod anomaly;
pub mod export;

// Re-export commonly used types
pub use rng::{fnv1a_hash, round_cents, SeededRng};
pub use ids::{make_id, pattern_fingerprint, Phase};
pub use catalog::{FeeType, MerchantCatalog, CATALOG_VERSION};
pub use transaction::{AnomalyKind, Transaction, TransactionKind};
pub use profile::{
    build_profile, Housing, HousingKind, InsurancePlans, LifestyleProfile, Loan, LoanKind,
    SpendingPools, SubscriptionCategory, SubscriptionPlan,
};
pub use engine::{GenerationMode, TransactionEngine};
pub use patterns::{analyze_pattern, MerchantPattern, AMOUNT_TOLERANCE};
pub use anomaly::{inject_anomalies, run_detection_pass, INJECTION_COUNT_RANGE};
pub use export::{to_csv, to_json};

use anyhow::Result;
use chrono::NaiveDate;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One-call convenience: build the persona for `seed` against the built-in
/// catalog and generate its full history for the inclusive date range.
pub fn generate_dataset(seed: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Transaction>> {
    let catalog = MerchantCatalog::builtin();
    let profile = build_profile(seed, catalog);
    TransactionEngine::new(catalog).generate(&profile, start, end, GenerationMode::Full, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_dataset_end_to_end() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        let txs = generate_dataset("smoke-test", start, end).unwrap();
        assert!(txs.len() > 50);
        assert!(txs.iter().any(|tx| tx.suspicious));
        assert!(to_csv(&txs).unwrap().lines().count() > txs.len());
    }
}
