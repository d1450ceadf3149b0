//! Record types for the pricing pipeline.
//!
//! Everything is keyed by the composite `SkuRegion` identity and priced in
//! `rust_decimal::Decimal`; no float arithmetic touches money or demand
//! factors, so values round-trip through stores exactly.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Composite key identifying a product in a sales region.
///
/// Compared and hashed structurally; separator characters inside a SKU are
/// harmless, unlike the string-concatenated `sku_region` keys this replaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkuRegion {
    pub sku: String,
    pub region: String,
}

impl SkuRegion {
    pub fn new(sku: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            region: region.into(),
        }
    }
}

impl core::fmt::Display for SkuRegion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.sku, self.region)
    }
}

/// Current price, stock, and cost for one SKU/region.
///
/// At most one record exists per key; `current_price` is mutated only by the
/// Sync Engine after a successful external price push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub key: SkuRegion,
    pub name: String,
    pub category: String,
    pub current_price: Decimal,
    pub stock_level: Decimal,
    pub cost: Decimal,
    pub last_updated: DateTime<Utc>,
}

/// One timestamped competitor price observation. Append-only; the latest
/// observation per key is the one with the greatest `observed_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketObservation {
    pub key: SkuRegion,
    pub observed_at: DateTime<Utc>,
    pub competitor_price: Decimal,
}

/// One demand forecast for a SKU/region. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub key: SkuRegion,
    pub forecast_at: DateTime<Utc>,
    /// Forecasted units over the horizon, always >= 1.
    pub forecasted_demand_units: i64,
    /// Unitless multiplier versus a baseline of 1.0, nominal range ~0.5-1.5.
    pub demand_factor: Decimal,
    /// Competitor price the forecast saw, if any observation existed.
    pub competitor_price_snapshot: Option<Decimal>,
}

/// What a recommendation proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    PriceAdjustment,
    FlashSale,
    BundleOffer,
}

impl RecommendationKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PriceAdjustment => "price_adjustment",
            Self::FlashSale => "flash_sale",
            Self::BundleOffer => "bundle_offer",
        }
    }
}

/// Lifecycle of a recommendation. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Draft,
    PendingReview,
    Applied,
    Sent,
    Rejected,
}

impl RecommendationStatus {
    /// Whether a transition from `self` to `next` is allowed.
    ///
    /// Allowed edges: Draft -> PendingReview/Applied/Sent,
    /// PendingReview -> Applied/Rejected, Applied -> Sent. `Sent` and
    /// `Rejected` are terminal; nothing ever moves backward.
    #[must_use]
    pub fn can_advance_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::PendingReview)
                | (Self::Draft, Self::Applied)
                | (Self::Draft, Self::Sent)
                | (Self::PendingReview, Self::Applied)
                | (Self::PendingReview, Self::Rejected)
                | (Self::Applied, Self::Sent)
        )
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sent | Self::Rejected)
    }
}

/// A proposed price or promotion change awaiting approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub key: SkuRegion,
    pub created_at: DateTime<Utc>,
    pub kind: RecommendationKind,
    pub original_price: Decimal,
    pub recommended_price: Decimal,
    pub reason: String,
    pub promo_text: Option<String>,
    /// Targeted customer segment, set for promotion recommendations.
    pub customer_segment: Option<String>,
    pub status: RecommendationStatus,
}

impl Recommendation {
    /// A price-adjustment recommendation entering review.
    #[must_use]
    pub fn price_adjustment(
        key: SkuRegion,
        original_price: Decimal,
        recommended_price: Decimal,
        reason: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            created_at,
            kind: RecommendationKind::PriceAdjustment,
            original_price,
            recommended_price,
            reason: reason.into(),
            promo_text: None,
            customer_segment: None,
            status: RecommendationStatus::PendingReview,
        }
    }

    /// A draft promotion recommendation targeting a customer segment.
    #[must_use]
    pub fn promotion(
        key: SkuRegion,
        kind: RecommendationKind,
        current_price: Decimal,
        segment: impl Into<String>,
        promo_text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            created_at,
            kind,
            original_price: current_price,
            recommended_price: current_price,
            reason: "targeted promotion".to_string(),
            promo_text: Some(promo_text.into()),
            customer_segment: Some(segment.into()),
            status: RecommendationStatus::Draft,
        }
    }

    /// No-op suppression rule: a price adjustment that changes nothing must
    /// not be persisted.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.kind == RecommendationKind::PriceAdjustment
            && self.recommended_price == self.original_price
    }
}

/// Equality filter over recommendations, matching the store's indexed fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecommendationFilter {
    pub kind: Option<RecommendationKind>,
    pub status: Option<RecommendationStatus>,
}

impl RecommendationFilter {
    #[must_use]
    pub fn kind(kind: RecommendationKind) -> Self {
        Self {
            kind: Some(kind),
            status: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: RecommendationStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn matches(&self, rec: &Recommendation) -> bool {
        self.kind.map_or(true, |k| k == rec.kind)
            && self.status.map_or(true, |s| s == rec.status)
    }
}

/// How one sync attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Price pushed externally and the inventory store updated.
    Success,
    /// The external price push failed; nothing was changed anywhere.
    FailedExternal,
    /// The push succeeded but the inventory update failed: the storefront and
    /// the inventory store now disagree until reconciled from the log.
    FailedStore,
    /// The recommendation was not eligible; no external call was made.
    Skipped,
}

/// Immutable audit record, written for every sync attempt.
///
/// The log is the source of truth for "did this price change actually take
/// effect"; in particular it is the only place a `FailedStore` divergence
/// between the storefront and the inventory store is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncLogEntry {
    pub key: SkuRegion,
    pub synced_at: DateTime<Utc>,
    pub recommendation_id: Uuid,
    pub old_price: Decimal,
    pub new_price: Decimal,
    pub outcome: SyncOutcome,
    /// Stated reason for skips and failure detail otherwise.
    pub detail: Option<String>,
}

/// A customer segment profile used for promotion targeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_id: String,
    pub segment: String,
    pub preferences: Vec<String>,
    /// Delivery contact (email-like or phone-like); absent means promotions
    /// for this segment stay in `Draft`.
    pub contact: Option<String>,
}

/// Schema for the structured variant of a text-generation response.
///
/// Model output is untrusted input: unknown fields are rejected and values
/// are validated before any of it reaches a `Recommendation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructuredRecommendation {
    pub recommended_price: Decimal,
    pub kind: RecommendationKind,
    pub reason: String,
    #[serde(default)]
    pub promo_text: Option<String>,
}

impl StructuredRecommendation {
    /// Structural validation beyond what serde enforces.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.recommended_price <= Decimal::ZERO {
            return Err(crate::error::PricingError::malformed(format!(
                "recommended_price must be positive, got {}",
                self.recommended_price
            )));
        }
        if self.reason.trim().is_empty() {
            return Err(crate::error::PricingError::malformed(
                "reason must be non-empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn key() -> SkuRegion {
        SkuRegion::new("SKU123", "US-EAST-1")
    }

    // ==================== SkuRegion Tests ====================

    #[test]
    fn sku_region_display() {
        assert_eq!(key().to_string(), "SKU123@US-EAST-1");
    }

    #[test]
    fn sku_region_structural_equality() {
        assert_eq!(key(), SkuRegion::new("SKU123", "US-EAST-1"));
        assert_ne!(key(), SkuRegion::new("SKU123", "EU-WEST-1"));
        // A separator character inside the SKU is not ambiguous.
        assert_ne!(
            SkuRegion::new("A_B", "C"),
            SkuRegion::new("A", "B_C"),
        );
    }

    // ==================== Status Machine Tests ====================

    #[test]
    fn status_advances_forward_only() {
        use RecommendationStatus::*;
        assert!(Draft.can_advance_to(PendingReview));
        assert!(Draft.can_advance_to(Sent));
        assert!(PendingReview.can_advance_to(Applied));
        assert!(PendingReview.can_advance_to(Rejected));
        assert!(Applied.can_advance_to(Sent));

        assert!(!Applied.can_advance_to(PendingReview));
        assert!(!Sent.can_advance_to(Applied));
        assert!(!Sent.can_advance_to(Sent));
        assert!(!Rejected.can_advance_to(Applied));
        assert!(!Applied.can_advance_to(Rejected));
    }

    #[test]
    fn terminal_statuses() {
        assert!(RecommendationStatus::Sent.is_terminal());
        assert!(RecommendationStatus::Rejected.is_terminal());
        assert!(!RecommendationStatus::Applied.is_terminal());
    }

    // ==================== Recommendation Tests ====================

    #[test]
    fn price_adjustment_starts_in_pending_review() {
        let rec = Recommendation::price_adjustment(
            key(),
            dec!(100),
            dec!(105.00),
            "high demand",
            Utc::now(),
        );
        assert_eq!(rec.status, RecommendationStatus::PendingReview);
        assert_eq!(rec.kind, RecommendationKind::PriceAdjustment);
        assert!(!rec.is_noop());
    }

    #[test]
    fn equal_price_adjustment_is_noop() {
        let rec =
            Recommendation::price_adjustment(key(), dec!(100), dec!(100), "nothing", Utc::now());
        assert!(rec.is_noop());
    }

    #[test]
    fn promotion_with_equal_price_is_not_noop() {
        let rec = Recommendation::promotion(
            key(),
            RecommendationKind::FlashSale,
            dec!(100),
            "loyal",
            "Flash sale!",
            Utc::now(),
        );
        assert!(!rec.is_noop());
        assert_eq!(rec.status, RecommendationStatus::Draft);
        assert_eq!(rec.customer_segment.as_deref(), Some("loyal"));
    }

    // ==================== Filter Tests ====================

    #[test]
    fn filter_matches_on_kind_and_status() {
        let rec = Recommendation::price_adjustment(key(), dec!(10), dec!(9), "x", Utc::now());
        let filter = RecommendationFilter::kind(RecommendationKind::PriceAdjustment)
            .with_status(RecommendationStatus::PendingReview);
        assert!(filter.matches(&rec));

        let wrong_status = RecommendationFilter::kind(RecommendationKind::PriceAdjustment)
            .with_status(RecommendationStatus::Applied);
        assert!(!wrong_status.matches(&rec));

        assert!(RecommendationFilter::default().matches(&rec));
    }

    // ==================== Structured Response Tests ====================

    #[test]
    fn structured_recommendation_rejects_unknown_fields() {
        let raw = r#"{"recommended_price": "9.99", "kind": "price_adjustment", "reason": "ok", "confidence": 0.9}"#;
        assert!(serde_json::from_str::<StructuredRecommendation>(raw).is_err());
    }

    #[test]
    fn structured_recommendation_validates_values() {
        let ok = StructuredRecommendation {
            recommended_price: dec!(9.99),
            kind: RecommendationKind::PriceAdjustment,
            reason: "competitor undercut".to_string(),
            promo_text: None,
        };
        assert!(ok.validate().is_ok());

        let bad_price = StructuredRecommendation {
            recommended_price: dec!(0),
            ..ok.clone()
        };
        assert!(bad_price.validate().is_err());

        let empty_reason = StructuredRecommendation {
            reason: "  ".to_string(),
            ..ok
        };
        assert!(empty_reason.validate().is_err());
    }

    #[test]
    fn decimal_price_round_trips_through_serde() {
        let rec = Recommendation::price_adjustment(
            key(),
            dec!(100.00),
            dec!(97.02),
            "match competitor",
            Utc::now(),
        );
        let json = serde_json::to_string(&rec).unwrap();
        let back: Recommendation = serde_json::from_str(&json).unwrap();
        assert_eq!(back.recommended_price, dec!(97.02));
        assert_eq!(back.key, rec.key);
    }
}
