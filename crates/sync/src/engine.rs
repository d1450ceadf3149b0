//! Sync Engine.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use pricepilot_core::cancel::CancelToken;
use pricepilot_core::traits::{InventoryStore, PricePusher, RecommendationStore, SyncLogStore};
use pricepilot_core::types::{
    Recommendation, RecommendationFilter, RecommendationKind, RecommendationStatus, SkuRegion,
    SyncLogEntry, SyncOutcome,
};

/// Per-item result of a sync attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResult {
    pub recommendation_id: Uuid,
    pub key: SkuRegion,
    pub outcome: SyncOutcome,
    pub new_price: Option<Decimal>,
    /// Stated reason for skips, failure detail otherwise.
    pub detail: Option<String>,
}

pub struct SyncEngine {
    recommendations: Arc<dyn RecommendationStore>,
    inventory: Arc<dyn InventoryStore>,
    log: Arc<dyn SyncLogStore>,
    pusher: Arc<dyn PricePusher>,
}

impl SyncEngine {
    #[must_use]
    pub fn new(
        recommendations: Arc<dyn RecommendationStore>,
        inventory: Arc<dyn InventoryStore>,
        log: Arc<dyn SyncLogStore>,
        pusher: Arc<dyn PricePusher>,
    ) -> Self {
        Self {
            recommendations,
            inventory,
            log,
            pusher,
        }
    }

    /// All price adjustments currently approved and waiting to be synced.
    ///
    /// # Errors
    ///
    /// Returns an error if the recommendation scan fails.
    pub async fn pending_applied(&self) -> pricepilot_core::error::Result<Vec<Recommendation>> {
        self.recommendations
            .scan_recommendations(
                &RecommendationFilter::kind(RecommendationKind::PriceAdjustment)
                    .with_status(RecommendationStatus::Applied),
            )
            .await
    }

    /// Processes each recommendation independently: one item's failure never
    /// blocks the others, and the returned list always has one entry per
    /// input item. A cancellation between items marks the remainder skipped.
    pub async fn sync_batch(
        &self,
        recommendations: &[Recommendation],
        cancel: &CancelToken,
    ) -> Vec<SyncResult> {
        let mut results = Vec::with_capacity(recommendations.len());
        for recommendation in recommendations {
            if cancel.is_cancelled() {
                results.push(SyncResult {
                    recommendation_id: recommendation.id,
                    key: recommendation.key.clone(),
                    outcome: SyncOutcome::Skipped,
                    new_price: None,
                    detail: Some("run cancelled".to_string()),
                });
                continue;
            }
            results.push(self.sync_one(recommendation).await);
        }

        let succeeded = results
            .iter()
            .filter(|r| r.outcome == SyncOutcome::Success)
            .count();
        info!(
            total = results.len(),
            succeeded,
            "sync batch finished"
        );
        results
    }

    /// Applies a single recommendation through the sync state machine.
    ///
    /// `Applied` + `PriceAdjustment` is the only eligible shape; everything
    /// else is skipped without touching the storefront, which also makes
    /// re-submitting an already-`Sent` recommendation a safe no-op.
    pub async fn sync_one(&self, recommendation: &Recommendation) -> SyncResult {
        if let Some(reason) = Self::skip_reason(recommendation) {
            self.append_log(
                recommendation,
                recommendation.original_price,
                SyncOutcome::Skipped,
                Some(reason.clone()),
            )
            .await;
            return SyncResult {
                recommendation_id: recommendation.id,
                key: recommendation.key.clone(),
                outcome: SyncOutcome::Skipped,
                new_price: None,
                detail: Some(reason),
            };
        }

        let new_price = recommendation.recommended_price;

        // Step 1: push the price to the storefront of record.
        if let Err(err) = self
            .pusher
            .push_price(&recommendation.key.sku, new_price)
            .await
        {
            warn!(key = %recommendation.key, %err, "external price push failed, recommendation stays applied for retry");
            let detail = err.to_string();
            self.append_log(
                recommendation,
                new_price,
                SyncOutcome::FailedExternal,
                Some(detail.clone()),
            )
            .await;
            return SyncResult {
                recommendation_id: recommendation.id,
                key: recommendation.key.clone(),
                outcome: SyncOutcome::FailedExternal,
                new_price: Some(new_price),
                detail: Some(detail),
            };
        }

        // Step 2: reflect the pushed price in the inventory store. A failure
        // here means the storefront and our inventory now disagree; report it
        // loudly and leave the recommendation applied so the divergence is
        // visible and reconcilable from the log.
        if let Err(err) = self
            .inventory
            .update_price(&recommendation.key, new_price, Utc::now())
            .await
        {
            error!(
                key = %recommendation.key,
                recommendation = %recommendation.id,
                %err,
                "price pushed to storefront but inventory update failed: stores are inconsistent until reconciled"
            );
            let detail = err.to_string();
            self.append_log(
                recommendation,
                new_price,
                SyncOutcome::FailedStore,
                Some(detail.clone()),
            )
            .await;
            return SyncResult {
                recommendation_id: recommendation.id,
                key: recommendation.key.clone(),
                outcome: SyncOutcome::FailedStore,
                new_price: Some(new_price),
                detail: Some(detail),
            };
        }

        // Step 3: audit trail, then advance the status.
        self.append_log(recommendation, new_price, SyncOutcome::Success, None)
            .await;

        let mut detail = None;
        if let Err(err) = self
            .recommendations
            .update_status(recommendation.id, RecommendationStatus::Sent)
            .await
        {
            warn!(recommendation = %recommendation.id, %err, "synced but status advance failed");
            detail = Some(format!("status advance failed: {err}"));
        }

        info!(key = %recommendation.key, %new_price, "price synced");
        SyncResult {
            recommendation_id: recommendation.id,
            key: recommendation.key.clone(),
            outcome: SyncOutcome::Success,
            new_price: Some(new_price),
            detail,
        }
    }

    fn skip_reason(recommendation: &Recommendation) -> Option<String> {
        if recommendation.kind != RecommendationKind::PriceAdjustment {
            return Some(format!(
                "kind {} is not a price adjustment",
                recommendation.kind.as_str()
            ));
        }
        match recommendation.status {
            RecommendationStatus::Applied => None,
            RecommendationStatus::Sent => Some("already sent".to_string()),
            status => Some(format!("status {status:?} is not applied")),
        }
    }

    /// A log entry is written for every attempt; a failing log store must not
    /// change the item's outcome, so the error is only reported.
    async fn append_log(
        &self,
        recommendation: &Recommendation,
        new_price: Decimal,
        outcome: SyncOutcome,
        detail: Option<String>,
    ) {
        let entry = SyncLogEntry {
            key: recommendation.key.clone(),
            synced_at: Utc::now(),
            recommendation_id: recommendation.id,
            old_price: recommendation.original_price,
            new_price,
            outcome,
            detail,
        };
        if let Err(err) = self.log.append(entry).await {
            warn!(key = %recommendation.key, %err, "failed to write sync log entry");
        }
    }
}
