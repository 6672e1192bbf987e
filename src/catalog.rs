// 🗂️ Merchant Catalog - curated static data collaborator
// Read-only input to the profile builder and transaction engine: bank and
// merchant names, subscription list prices, fee palette. The catalog is
// versioned; reordering or renaming an entry changes generated output for
// every seed, so edits must bump CATALOG_VERSION.

/// Bump on any change to the data below.
pub const CATALOG_VERSION: u32 = 1;

// ============================================================================
// FEE TYPES
// ============================================================================

/// One bank fee flavor with its list amount. Monthly occurrences jitter
/// around `base_amount` by up to 20% in either direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeType {
    pub name: &'static str,
    pub base_amount: f64,
}

// ============================================================================
// CATALOG
// ============================================================================

/// The full static catalog. Supplied to the builder and engine by reference;
/// callers may substitute their own instance as long as it stays stable
/// across runs.
#[derive(Debug)]
pub struct MerchantCatalog {
    // Accounts
    pub banks: &'static [&'static str],
    pub wallets: &'static [&'static str],
    pub credit_cards: &'static [&'static str],
    pub investment_venues: &'static [&'static str],
    pub crypto_venues: &'static [&'static str],

    // Housing
    pub landlords: &'static [&'static str],
    pub mortgage_lenders: &'static [&'static str],

    // Bills
    pub utilities: &'static [&'static str],
    pub phone_carriers: &'static [&'static str],
    pub internet_providers: &'static [&'static str],

    // Insurance
    pub auto_insurers: &'static [&'static str],
    pub health_insurers: &'static [&'static str],
    pub home_insurers: &'static [&'static str],
    pub life_insurers: &'static [&'static str],

    // Loans
    pub auto_lenders: &'static [&'static str],
    pub student_lenders: &'static [&'static str],
    pub personal_lenders: &'static [&'static str],

    // Subscriptions
    pub streaming_services: &'static [&'static str],
    pub music_services: &'static [&'static str],
    pub cloud_storage: &'static [&'static str],
    pub gyms: &'static [&'static str],
    pub software_services: &'static [&'static str],

    // Daily-spend pools
    pub grocery: &'static [&'static str],
    pub coffee: &'static [&'static str],
    pub dining: &'static [&'static str],
    pub fuel: &'static [&'static str],
    pub rideshare: &'static [&'static str],
    pub delivery: &'static [&'static str],
    pub retail: &'static [&'static str],
    pub online: &'static [&'static str],
    pub misc: &'static [&'static str],

    // Fees and pricing
    pub fee_types: &'static [FeeType],
    pub subscription_prices: &'static [(&'static str, f64)],
}

impl MerchantCatalog {
    /// The built-in catalog.
    pub fn builtin() -> &'static MerchantCatalog {
        &BUILTIN
    }

    /// Realistic list price for a subscription merchant, if we carry one.
    pub fn list_price(&self, merchant: &str) -> Option<f64> {
        self.subscription_prices
            .iter()
            .find(|(name, _)| *name == merchant)
            .map(|(_, price)| *price)
    }
}

static BUILTIN: MerchantCatalog = MerchantCatalog {
    banks: &[
        "First National Bank",
        "Chase",
        "Wells Fargo",
        "Bank of America",
        "US Bank",
        "PNC Bank",
        "Capital One",
        "TD Bank",
        "Citibank",
        "Regions Bank",
    ],
    wallets: &["Venmo", "PayPal", "Cash App", "Zelle", "Apple Cash"],
    credit_cards: &[
        "Chase Sapphire",
        "Amex Blue Cash",
        "Citi Double Cash",
        "Discover It",
        "Capital One Quicksilver",
        "Wells Fargo Active Cash",
    ],
    investment_venues: &["Vanguard", "Fidelity", "Charles Schwab", "Robinhood", "E*Trade"],
    crypto_venues: &["Coinbase", "Kraken", "Gemini"],

    landlords: &[
        "Oakwood Property Management",
        "Lakeside Apartments",
        "Greystar Residential",
        "Maple Court Rentals",
        "Summit Ridge Properties",
    ],
    mortgage_lenders: &[
        "Rocket Mortgage",
        "Chase Home Lending",
        "Wells Fargo Home Mortgage",
        "US Bank Home Loans",
    ],

    utilities: &[
        "City Power & Light",
        "Metro Water Utility",
        "Piedmont Natural Gas",
        "Duke Energy",
        "National Grid",
        "Waste Management",
        "ConEdison",
    ],
    phone_carriers: &["Verizon Wireless", "AT&T Mobility", "T-Mobile", "Mint Mobile"],
    internet_providers: &[
        "Comcast Xfinity",
        "Spectrum",
        "AT&T Internet",
        "Verizon Fios",
        "CenturyLink",
    ],

    auto_insurers: &["GEICO", "Progressive", "State Farm", "Allstate", "USAA"],
    health_insurers: &[
        "Blue Cross Blue Shield",
        "UnitedHealthcare",
        "Aetna",
        "Cigna",
        "Kaiser Permanente",
    ],
    home_insurers: &[
        "Lemonade Home",
        "Liberty Mutual",
        "Farmers Insurance",
        "American Family",
    ],
    life_insurers: &["Northwestern Mutual", "MetLife", "Prudential"],

    auto_lenders: &[
        "Toyota Financial",
        "Honda Financial Services",
        "Ally Auto",
        "Capital One Auto",
    ],
    student_lenders: &["Nelnet", "Navient", "Great Lakes", "MOHELA"],
    personal_lenders: &["SoFi", "LendingClub", "Marcus by Goldman Sachs", "Upstart"],

    streaming_services: &[
        "Netflix",
        "Hulu",
        "Disney+",
        "Max",
        "Paramount+",
        "Peacock",
        "Apple TV+",
        "YouTube Premium",
    ],
    music_services: &["Spotify", "Apple Music", "YouTube Music", "Tidal"],
    cloud_storage: &["iCloud+", "Google One", "Dropbox", "OneDrive"],
    gyms: &[
        "Planet Fitness",
        "LA Fitness",
        "Anytime Fitness",
        "Crunch Fitness",
        "YMCA",
    ],
    software_services: &[
        "Adobe Creative Cloud",
        "Microsoft 365",
        "ChatGPT Plus",
        "GitHub Copilot",
        "1Password",
        "Notion",
        "Canva Pro",
        "NordVPN",
        "Grammarly",
    ],

    grocery: &[
        "Whole Foods Market",
        "Trader Joe's",
        "Kroger",
        "Safeway",
        "Aldi",
        "Publix",
        "Costco Wholesale",
    ],
    coffee: &[
        "Starbucks",
        "Dunkin'",
        "McDonald's",
        "Chipotle",
        "Chick-fil-A",
        "Subway",
        "Panera Bread",
        "Taco Bell",
    ],
    dining: &[
        "Olive Garden",
        "The Cheesecake Factory",
        "Texas Roadhouse",
        "Red Lobster",
        "Applebee's",
        "Local Thai Kitchen",
        "Sakura Sushi",
    ],
    fuel: &["Shell", "Chevron", "ExxonMobil", "BP", "Costco Gas"],
    rideshare: &["Uber", "Lyft"],
    delivery: &["DoorDash", "Uber Eats", "Grubhub", "Instacart"],
    retail: &[
        "Target",
        "Walmart",
        "Best Buy",
        "Home Depot",
        "TJ Maxx",
        "IKEA",
        "REI",
    ],
    online: &[
        "Amazon",
        "eBay",
        "Etsy",
        "Temu",
        "Steam",
        "Apple.com",
        "Nike.com",
    ],
    misc: &[
        "USPS",
        "CVS Pharmacy",
        "Walgreens",
        "PetSmart",
        "AutoZone",
        "Great Clips",
    ],

    fee_types: &[
        FeeType { name: "Monthly Maintenance Fee", base_amount: 12.00 },
        FeeType { name: "ATM Withdrawal Fee", base_amount: 3.50 },
        FeeType { name: "Overdraft Fee", base_amount: 35.00 },
        FeeType { name: "Wire Transfer Fee", base_amount: 25.00 },
        FeeType { name: "Foreign Transaction Fee", base_amount: 7.50 },
        FeeType { name: "Paper Statement Fee", base_amount: 2.00 },
        FeeType { name: "Returned Item Fee", base_amount: 30.00 },
        FeeType { name: "Card Replacement Fee", base_amount: 5.00 },
    ],
    subscription_prices: &[
        ("Netflix", 15.49),
        ("Hulu", 7.99),
        ("Disney+", 9.99),
        ("Max", 16.99),
        ("Paramount+", 7.99),
        ("Peacock", 5.99),
        ("Apple TV+", 9.99),
        ("YouTube Premium", 13.99),
        ("Spotify", 11.99),
        ("Apple Music", 10.99),
        ("YouTube Music", 10.99),
        ("Tidal", 10.99),
        ("iCloud+", 2.99),
        ("Google One", 1.99),
        ("Dropbox", 11.99),
        ("OneDrive", 1.99),
        ("Planet Fitness", 10.00),
        ("LA Fitness", 34.99),
        ("Anytime Fitness", 41.99),
        ("Crunch Fitness", 12.99),
        ("YMCA", 45.00),
        ("Adobe Creative Cloud", 59.99),
        ("Microsoft 365", 9.99),
        ("ChatGPT Plus", 20.00),
        ("GitHub Copilot", 10.00),
        ("1Password", 3.99),
        ("Notion", 10.00),
        ("Canva Pro", 12.99),
        ("NordVPN", 12.99),
        ("Grammarly", 12.00),
    ],
};

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pools_cover_required_cardinalities() {
        let catalog = MerchantCatalog::builtin();
        // Profile draw ranges must always be satisfiable.
        assert!(catalog.banks.len() >= 2);
        assert!(catalog.utilities.len() >= 5);
        assert!(catalog.streaming_services.len() >= 5);
        assert!(!catalog.music_services.is_empty());
        assert!(catalog.cloud_storage.len() >= 3);
        assert!(catalog.software_services.len() >= 6);
        assert!(catalog.fee_types.len() >= 6);
    }

    #[test]
    fn test_list_price_lookup() {
        let catalog = MerchantCatalog::builtin();
        assert_eq!(catalog.list_price("Netflix"), Some(15.49));
        assert_eq!(catalog.list_price("Unknown Service"), None);
    }

    #[test]
    fn test_subscription_pools_are_priced() {
        // Every built-in subscription merchant carries a list price; the
        // randomized fallback only covers caller-supplied catalogs.
        let catalog = MerchantCatalog::builtin();
        let pools = [
            catalog.streaming_services,
            catalog.music_services,
            catalog.cloud_storage,
            catalog.gyms,
            catalog.software_services,
        ];
        for pool in pools {
            for merchant in pool {
                assert!(
                    catalog.list_price(merchant).is_some(),
                    "missing list price for {merchant}"
                );
            }
        }
    }
}
