// 🏠 Lifestyle Profile Builder - persona materialization
// One pass over the seeded source in a FIXED draw order:
//   1. accounts  2. housing  3. bills  4. insurance  5. loans
//   6. subscriptions  7. daily-spend pools
// The order is a compatibility contract: downstream logic may change freely,
// but reordering these draws changes every profile ever generated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::MerchantCatalog;
use crate::rng::SeededRng;

// ============================================================================
// PROFILE PARTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HousingKind {
    Rent,
    Mortgage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Housing {
    pub kind: HousingKind,
    pub provider: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanKind {
    Car,
    Student,
    Personal,
}

impl LoanKind {
    pub fn category(&self) -> &'static str {
        match self {
            LoanKind::Car => "Car Loan",
            LoanKind::Student => "Student Loan",
            LoanKind::Personal => "Personal Loan",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub kind: LoanKind,
    pub lender: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsurancePlans {
    pub auto: String,
    pub health: String,
    pub home: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionCategory {
    Streaming,
    Music,
    CloudStorage,
    Gym,
    Software,
}

impl SubscriptionCategory {
    pub fn category(&self) -> &'static str {
        match self {
            SubscriptionCategory::Streaming => "Streaming",
            SubscriptionCategory::Music => "Music",
            SubscriptionCategory::CloudStorage => "Cloud Storage",
            SubscriptionCategory::Gym => "Gym",
            SubscriptionCategory::Software => "Software",
        }
    }
}

/// One subscription plan. The amount is fixed for the profile's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub category: SubscriptionCategory,
    pub merchant: String,
    pub monthly_amount: f64,
    /// Day-of-month, 1-28 (always valid, never needs clamping).
    pub billing_day: u32,
}

/// Day-to-day merchant pools, one per spend category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingPools {
    pub grocery: Vec<String>,
    pub coffee: Vec<String>,
    pub dining: Vec<String>,
    pub fuel: Vec<String>,
    pub rideshare: Vec<String>,
    pub delivery: Vec<String>,
    pub retail: Vec<String>,
    pub online: Vec<String>,
    pub misc: Vec<String>,
}

// ============================================================================
// LIFESTYLE PROFILE
// ============================================================================

/// A fixed persona. Immutable once built; the same profile id always yields
/// the same profile (`created_at` is metadata and never feeds generation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifestyleProfile {
    /// The profile seed string, doubling as the identifier.
    pub id: String,
    pub created_at: DateTime<Utc>,

    pub primary_bank: String,
    pub secondary_bank: String,
    pub wallets: Vec<String>,
    pub credit_cards: Vec<String>,
    pub investment_venues: Vec<String>,
    pub crypto_venues: Vec<String>,

    pub housing: Housing,
    pub utilities: Vec<String>,
    pub phone_carrier: String,
    pub internet_provider: String,
    pub insurance: InsurancePlans,
    pub loans: Vec<Loan>,

    pub subscriptions: Vec<SubscriptionPlan>,
    pub pools: SpendingPools,
}

// ============================================================================
// BUILDER
// ============================================================================

/// Materialize the persona for a seed. Single pass, fixed draw order.
pub fn build_profile(seed: &str, catalog: &MerchantCatalog) -> LifestyleProfile {
    let mut rng = SeededRng::from_str_seed(seed);

    // Stage 1: accounts
    let banks = rng.pick_distinct(catalog.banks, 2, 2);
    let primary_bank = banks[0].to_string();
    let secondary_bank = banks[1].to_string();
    let wallets = pick_names(&mut rng, catalog.wallets, 1, 3);
    let credit_cards = pick_names(&mut rng, catalog.credit_cards, 1, 4);
    let investment_venues = pick_names(&mut rng, catalog.investment_venues, 0, 2);
    let crypto_venues = pick_names(&mut rng, catalog.crypto_venues, 0, 1);

    // Stage 2: housing (rent XOR mortgage)
    let housing = if rng.chance(0.5) {
        Housing {
            kind: HousingKind::Rent,
            provider: rng.pick(catalog.landlords).to_string(),
        }
    } else {
        Housing {
            kind: HousingKind::Mortgage,
            provider: rng.pick(catalog.mortgage_lenders).to_string(),
        }
    };

    // Stage 3: bills
    let utilities = pick_names(&mut rng, catalog.utilities, 2, 5);
    let phone_carrier = rng.pick(catalog.phone_carriers).to_string();
    let internet_provider = rng.pick(catalog.internet_providers).to_string();

    // Stage 4: insurance
    let insurance = InsurancePlans {
        auto: rng.pick(catalog.auto_insurers).to_string(),
        health: rng.pick(catalog.health_insurers).to_string(),
        home: rng.pick(catalog.home_insurers).to_string(),
        life: if rng.chance(0.4) {
            Some(rng.pick(catalog.life_insurers).to_string())
        } else {
            None
        },
    };

    // Stage 5: loans
    let mut loans = Vec::new();
    if rng.chance(0.5) {
        loans.push(Loan {
            kind: LoanKind::Car,
            lender: rng.pick(catalog.auto_lenders).to_string(),
        });
    }
    if rng.chance(0.4) {
        loans.push(Loan {
            kind: LoanKind::Student,
            lender: rng.pick(catalog.student_lenders).to_string(),
        });
    }
    for lender in pick_names(&mut rng, catalog.personal_lenders, 0, 2) {
        loans.push(Loan {
            kind: LoanKind::Personal,
            lender,
        });
    }

    // Stage 6: subscriptions
    let mut subscriptions = Vec::new();
    subscribe(&mut rng, catalog, &mut subscriptions, SubscriptionCategory::Streaming, catalog.streaming_services, 2, 5);
    subscribe(&mut rng, catalog, &mut subscriptions, SubscriptionCategory::Music, catalog.music_services, 1, 1);
    subscribe(&mut rng, catalog, &mut subscriptions, SubscriptionCategory::CloudStorage, catalog.cloud_storage, 1, 3);
    let gym_count = if rng.chance(0.5) { 1 } else { 0 };
    subscribe(&mut rng, catalog, &mut subscriptions, SubscriptionCategory::Gym, catalog.gyms, gym_count, gym_count);
    subscribe(&mut rng, catalog, &mut subscriptions, SubscriptionCategory::Software, catalog.software_services, 2, 6);

    // Stage 7: daily-spend pools
    let pools = SpendingPools {
        grocery: pick_names(&mut rng, catalog.grocery, 2, 4),
        coffee: pick_names(&mut rng, catalog.coffee, 3, 6),
        dining: pick_names(&mut rng, catalog.dining, 3, 6),
        fuel: pick_names(&mut rng, catalog.fuel, 1, 3),
        rideshare: pick_names(&mut rng, catalog.rideshare, 1, 2),
        delivery: pick_names(&mut rng, catalog.delivery, 2, 4),
        retail: pick_names(&mut rng, catalog.retail, 3, 6),
        online: pick_names(&mut rng, catalog.online, 3, 6),
        misc: pick_names(&mut rng, catalog.misc, 2, 4),
    };

    LifestyleProfile {
        id: seed.to_string(),
        created_at: Utc::now(),
        primary_bank,
        secondary_bank,
        wallets,
        credit_cards,
        investment_venues,
        crypto_venues,
        housing,
        utilities,
        phone_carrier,
        internet_provider,
        insurance,
        loans,
        subscriptions,
        pools,
    }
}

fn pick_names(rng: &mut SeededRng, pool: &[&'static str], min: u32, max: u32) -> Vec<String> {
    rng.pick_distinct(pool, min, max)
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

fn subscribe(
    rng: &mut SeededRng,
    catalog: &MerchantCatalog,
    plans: &mut Vec<SubscriptionPlan>,
    category: SubscriptionCategory,
    pool: &[&'static str],
    min: u32,
    max: u32,
) {
    for merchant in rng.pick_distinct(pool, min, max) {
        // List price when we carry one; randomized fallback for merchants a
        // caller-supplied catalog leaves unpriced.
        let monthly_amount = match catalog.list_price(merchant) {
            Some(price) => price,
            None => rng.amount(4.99, 29.99),
        };
        let billing_day = rng.range(1, 28);
        plans.push(SubscriptionPlan {
            category,
            merchant: merchant.to_string(),
            monthly_amount,
            billing_day,
        });
    }
}

// ============================================================================
// TESTS
// ============================================================================
