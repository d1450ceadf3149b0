//! Run manifest for the Recommendation Engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pricepilot_core::types::SkuRegion;

/// Outcome of the pricing pass for one SKU/region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RecommendationItemOutcome {
    /// A price-adjustment recommendation was persisted for review.
    Recommended { key: SkuRegion, id: Uuid },
    /// Conditions warranted no change (or the proposal was a no-op).
    NoChange { key: SkuRegion },
    /// The item failed; the run continued.
    Failed { key: SkuRegion, error: String },
}

/// Outcome of one promotion attempt for a (sku, segment) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PromoOutcome {
    /// Promotion persisted; `notified` records whether dispatch advanced it
    /// from `Draft` to `Sent`.
    Created {
        key: SkuRegion,
        segment: String,
        id: Uuid,
        notified: bool,
    },
    Failed {
        key: SkuRegion,
        segment: String,
        error: String,
    },
}

/// Structured summary of a recommendation run. The engine always completes a
/// run over all input SKUs and returns this manifest, never a bare error for
/// one item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationRunReport {
    pub items: Vec<RecommendationItemOutcome>,
    pub promos: Vec<PromoOutcome>,
    /// True when the run stopped early at a cancellation checkpoint.
    pub cancelled: bool,
}

impl RecommendationRunReport {
    #[must_use]
    pub fn recommended(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, RecommendationItemOutcome::Recommended { .. }))
            .count()
    }

    #[must_use]
    pub fn no_change(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, RecommendationItemOutcome::NoChange { .. }))
            .count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, RecommendationItemOutcome::Failed { .. }))
            .count()
    }

    #[must_use]
    pub fn promos_created(&self) -> usize {
        self.promos
            .iter()
            .filter(|p| matches!(p, PromoOutcome::Created { .. }))
            .count()
    }
}
