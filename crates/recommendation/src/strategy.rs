//! The pricing decision seam.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pricepilot_core::error::Result;
use pricepilot_core::types::{RecommendationKind, SkuRegion};

/// Everything a strategy may consider for one SKU/region.
///
/// `demand_factor` defaults to 1.0 and `competitor_price` to `None` when no
/// forecast exists for the key; strategies must handle both without error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingContext {
    pub key: SkuRegion,
    pub current_price: Decimal,
    pub stock_level: Decimal,
    pub cost: Decimal,
    pub demand_factor: Decimal,
    pub competitor_price: Option<Decimal>,
}

/// A proposed change, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceProposal {
    pub recommended_price: Decimal,
    pub kind: RecommendationKind,
    pub reason: String,
    pub promo_text: Option<String>,
}

/// A pricing decision strategy. Selected by configuration; the engine only
/// ever talks to this trait.
#[async_trait]
pub trait PricingStrategy: Send + Sync {
    /// Returns at most one proposal for the context, or `None` when current
    /// conditions warrant no change. Must not fail the whole batch: transient
    /// errors surface as `Err` and are absorbed per item by the engine.
    async fn propose(&self, context: &PricingContext) -> Result<Option<PriceProposal>>;

    fn name(&self) -> &'static str;
}
