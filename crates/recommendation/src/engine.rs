//! Recommendation Engine.
//!
//! One pass over all inventory: join the latest forecast per key, ask the
//! configured strategy for at most one price adjustment, persist it for
//! review, then generate targeted promotions per customer segment. Every
//! per-item failure is absorbed at the item boundary; only an inventory scan
//! failure aborts the run.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use pricepilot_core::cancel::CancelToken;
use pricepilot_core::config::PromoConfig;
use pricepilot_core::error::Result;
use pricepilot_core::traits::{
    CustomerProfileStore, ForecastStore, InventoryStore, Notifier, RecommendationStore,
    TextGenerator,
};
use pricepilot_core::types::{
    CustomerProfile, InventoryRecord, Recommendation, RecommendationKind, RecommendationStatus,
};

use crate::report::{PromoOutcome, RecommendationItemOutcome, RecommendationRunReport};
use crate::strategy::{PricingContext, PricingStrategy};

const PROMO_SYSTEM_CONTEXT: &str = "You are an expert retail marketing strategist specializing \
in promotions and sales. Your goal is to generate creative, concise, and compelling promotional \
ideas for e-commerce products. Focus on discounts, bundles, limited-time offers, and engaging \
marketing copy. Always provide a specific offer or call to action.";

pub struct RecommendationEngine {
    inventory: Arc<dyn InventoryStore>,
    forecasts: Arc<dyn ForecastStore>,
    recommendations: Arc<dyn RecommendationStore>,
    profiles: Arc<dyn CustomerProfileStore>,
    strategy: Arc<dyn PricingStrategy>,
    /// Promo copy source; `None` falls back to a canned template so the
    /// pipeline runs offline.
    textgen: Option<Arc<dyn TextGenerator>>,
    notifier: Option<Arc<dyn Notifier>>,
    config: PromoConfig,
    rng: Mutex<StdRng>,
}

impl RecommendationEngine {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        forecasts: Arc<dyn ForecastStore>,
        recommendations: Arc<dyn RecommendationStore>,
        profiles: Arc<dyn CustomerProfileStore>,
        strategy: Arc<dyn PricingStrategy>,
        textgen: Option<Arc<dyn TextGenerator>>,
        notifier: Option<Arc<dyn Notifier>>,
        config: PromoConfig,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            inventory,
            forecasts,
            recommendations,
            profiles,
            strategy,
            textgen,
            notifier,
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Runs one recommendation pass over all known SKU/regions.
    ///
    /// # Errors
    ///
    /// Returns an error only if the inventory scan itself fails.
    pub async fn run(&self, cancel: &CancelToken) -> Result<RecommendationRunReport> {
        let records = self.inventory.scan_inventory().await?;
        let profiles = match self.profiles.scan_profiles().await {
            Ok(profiles) => profiles,
            Err(err) => {
                warn!(%err, "customer profiles unavailable, skipping promotions this run");
                Vec::new()
            }
        };
        info!(
            items = records.len(),
            segments = profiles.len(),
            strategy = self.strategy.name(),
            "recommendation run started"
        );

        let mut report = RecommendationRunReport::default();
        let mut promoted: HashSet<(String, String)> = HashSet::new();

        for record in records {
            if cancel.is_cancelled() {
                info!("recommendation run cancelled");
                report.cancelled = true;
                break;
            }

            report.items.push(self.price_one(&record).await);

            for profile in &profiles {
                let seen_key = (record.key.sku.clone(), profile.segment.clone());
                if promoted.contains(&seen_key) {
                    continue;
                }
                if !self.sample_promo() {
                    continue;
                }
                promoted.insert(seen_key);
                report.promos.push(self.promote_one(&record, profile).await);
            }
        }

        info!(
            recommended = report.recommended(),
            failed = report.failed(),
            promos = report.promos_created(),
            "recommendation run finished"
        );
        Ok(report)
    }

    async fn price_one(&self, record: &InventoryRecord) -> RecommendationItemOutcome {
        let forecast = match self.forecasts.latest_forecast(&record.key).await {
            Ok(forecast) => forecast,
            Err(err) => {
                warn!(key = %record.key, %err, "forecast unavailable, using baseline demand");
                None
            }
        };

        // No forecast means baseline demand and no competitor signal.
        let context = PricingContext {
            key: record.key.clone(),
            current_price: record.current_price,
            stock_level: record.stock_level,
            cost: record.cost,
            demand_factor: forecast
                .as_ref()
                .map_or(Decimal::ONE, |f| f.demand_factor),
            competitor_price: forecast.and_then(|f| f.competitor_price_snapshot),
        };

        let proposal = match self.strategy.propose(&context).await {
            Ok(Some(proposal)) => proposal,
            Ok(None) => {
                return RecommendationItemOutcome::NoChange {
                    key: record.key.clone(),
                }
            }
            Err(err) => {
                warn!(key = %record.key, %err, "pricing strategy failed for item");
                return RecommendationItemOutcome::Failed {
                    key: record.key.clone(),
                    error: err.to_string(),
                };
            }
        };

        let mut recommendation = Recommendation::price_adjustment(
            record.key.clone(),
            record.current_price,
            proposal.recommended_price,
            proposal.reason,
            Utc::now(),
        );
        recommendation.kind = proposal.kind;
        recommendation.promo_text = proposal.promo_text;

        if recommendation.is_noop() {
            debug!(key = %record.key, "suppressing no-op price adjustment");
            return RecommendationItemOutcome::NoChange {
                key: record.key.clone(),
            };
        }

        match self
            .recommendations
            .put_recommendation(recommendation.clone())
            .await
        {
            Ok(()) => RecommendationItemOutcome::Recommended {
                key: record.key.clone(),
                id: recommendation.id,
            },
            Err(err) => {
                warn!(key = %record.key, %err, "failed to store recommendation");
                RecommendationItemOutcome::Failed {
                    key: record.key.clone(),
                    error: err.to_string(),
                }
            }
        }
    }

    async fn promote_one(
        &self,
        record: &InventoryRecord,
        profile: &CustomerProfile,
    ) -> PromoOutcome {
        let promo_text = match self.promo_copy(record, profile).await {
            Ok(text) => text,
            Err(err) => {
                warn!(key = %record.key, segment = %profile.segment, %err, "promo copy generation failed");
                return PromoOutcome::Failed {
                    key: record.key.clone(),
                    segment: profile.segment.clone(),
                    error: err.to_string(),
                };
            }
        };

        let recommendation = Recommendation::promotion(
            record.key.clone(),
            RecommendationKind::FlashSale,
            record.current_price,
            profile.segment.clone(),
            promo_text.clone(),
            Utc::now(),
        );
        let id = recommendation.id;

        if let Err(err) = self.recommendations.put_recommendation(recommendation).await {
            warn!(key = %record.key, segment = %profile.segment, %err, "failed to store promotion");
            return PromoOutcome::Failed {
                key: record.key.clone(),
                segment: profile.segment.clone(),
                error: err.to_string(),
            };
        }

        let notified = self.dispatch(profile, &promo_text).await;
        if notified {
            // Dispatch succeeded, so the draft is already in customers' hands.
            if let Err(err) = self
                .recommendations
                .update_status(id, RecommendationStatus::Sent)
                .await
            {
                warn!(%id, %err, "promotion sent but status update failed");
            }
        }

        PromoOutcome::Created {
            key: record.key.clone(),
            segment: profile.segment.clone(),
            id,
            notified,
        }
    }

    async fn promo_copy(
        &self,
        record: &InventoryRecord,
        profile: &CustomerProfile,
    ) -> Result<String> {
        let Some(textgen) = &self.textgen else {
            return Ok(format!(
                "Limited-time offer on {} for our {} customers: check today's price and save!",
                record.name, profile.segment
            ));
        };

        let preferences = profile.preferences.join(", ");
        let user_context = format!(
            "Generate a concise, engaging promotion idea for product SKU '{sku}' targeting \
             '{segment}' customers (who like {preferences}). Current inventory: {stock} units. \
             Focus on {goal}. Suggest a specific discount or offer. Max 50 words.",
            sku = record.key.sku,
            segment = profile.segment,
            stock = record.stock_level,
            goal = self.config.goal,
        );
        textgen
            .generate(
                PROMO_SYSTEM_CONTEXT,
                &user_context,
                self.config.max_output_tokens,
            )
            .await
    }

    /// Attempts notification dispatch; true only when a contact is known and
    /// the send succeeded.
    async fn dispatch(&self, profile: &CustomerProfile, message: &str) -> bool {
        let (Some(notifier), Some(contact)) = (&self.notifier, &profile.contact) else {
            return false;
        };
        match notifier.send(contact, message).await {
            Ok(()) => true,
            Err(err) => {
                warn!(segment = %profile.segment, %err, "notification dispatch failed, promotion stays in draft");
                false
            }
        }
    }

    fn sample_promo(&self) -> bool {
        self.rng.lock().gen_bool(self.config.probability.clamp(0.0, 1.0))
    }
}
