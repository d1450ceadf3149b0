//! Demo fixtures.
//!
//! Five products in one region, competitor observations shaped so the demo
//! exercises each pricing rule, and three customer segments with mixed
//! contact coverage. Loaded by the CLI unless `--no-seed` is passed.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

use pricepilot_core::error::Result;
use pricepilot_core::traits::{InventoryStore, MarketDataStore};
use pricepilot_core::types::{CustomerProfile, InventoryRecord, MarketObservation, SkuRegion};
use pricepilot_store::MemoryStore;

const DEMO_REGION: &str = "US-EAST-1";

fn products() -> Vec<(&'static str, &'static str, &'static str, Decimal, Decimal, Decimal)> {
    // (sku, name, category, current_price, stock_level, cost)
    vec![
        ("P001", "Ultra HD Smart TV 55-inch", "Electronics", dec!(999.99), dec!(80), dec!(700.00)),
        ("P002", "Noise-Cancelling Headphones", "Electronics", dec!(199.99), dec!(180), dec!(120.00)),
        ("P003", "Ergonomic Office Chair", "Furniture", dec!(349.00), dec!(25), dec!(280.00)),
        ("P004", "Portable Bluetooth Speaker", "Electronics", dec!(79.99), dec!(200), dec!(45.00)),
        ("P005", "Smart Home Security Camera", "Electronics", dec!(129.00), dec!(60), dec!(90.00)),
    ]
}

fn competitor_prices() -> Vec<(&'static str, Decimal)> {
    vec![
        ("P001", dec!(1150.00)), // materially above, demand boost
        ("P002", dec!(170.00)),  // undercut, match candidate
        ("P003", dec!(360.00)),  // near parity
        ("P004", dec!(75.50)),   // undercut, match candidate
        ("P005", dec!(128.50)),  // near parity
    ]
}

fn profiles() -> Vec<CustomerProfile> {
    vec![
        CustomerProfile {
            customer_id: "CUST-001".to_string(),
            segment: "tech_enthusiast".to_string(),
            preferences: vec!["electronics".to_string(), "early access".to_string()],
            contact: Some("tech.fan@example.com".to_string()),
        },
        CustomerProfile {
            customer_id: "CUST-002".to_string(),
            segment: "bargain_hunter".to_string(),
            preferences: vec!["discounts".to_string(), "clearance".to_string()],
            contact: Some("+1 555-010-2345".to_string()),
        },
        CustomerProfile {
            customer_id: "CUST-003".to_string(),
            segment: "home_office".to_string(),
            preferences: vec!["furniture".to_string(), "productivity".to_string()],
            contact: None,
        },
    ]
}

/// Loads the demo catalog, competitor observations, and customer segments.
///
/// # Errors
///
/// Returns an error if a store write fails.
pub async fn seed_demo_data(store: &MemoryStore) -> Result<()> {
    let now = Utc::now();

    for (sku, name, category, current_price, stock_level, cost) in products() {
        store
            .upsert_inventory(InventoryRecord {
                key: SkuRegion::new(sku, DEMO_REGION),
                name: name.to_string(),
                category: category.to_string(),
                current_price,
                stock_level,
                cost,
                last_updated: now,
            })
            .await?;
    }

    for (sku, competitor_price) in competitor_prices() {
        store
            .record_observation(MarketObservation {
                key: SkuRegion::new(sku, DEMO_REGION),
                observed_at: now,
                competitor_price,
            })
            .await?;
    }

    store.seed_profiles(profiles());

    info!(
        products = products().len(),
        segments = profiles().len(),
        "demo data seeded"
    );
    Ok(())
}
