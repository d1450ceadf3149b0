//! Forecast Engine.
//!
//! Starts every key at a baseline demand factor of 1.0, nudges it when the
//! latest competitor observation sits materially below or above the current
//! price, then applies bounded noise. Noise is generated as a scaled-integer
//! `Decimal` (four decimal places) so seeded runs are bit-exact.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info, warn};

use pricepilot_core::cancel::CancelToken;
use pricepilot_core::config::ForecastConfig;
use pricepilot_core::error::Result;
use pricepilot_core::traits::{ForecastStore, InventoryStore, MarketDataStore};
use pricepilot_core::types::{ForecastRecord, InventoryRecord, MarketObservation};

use crate::report::{ForecastItemOutcome, ForecastRunReport};

pub struct ForecastEngine {
    inventory: Arc<dyn InventoryStore>,
    market: Arc<dyn MarketDataStore>,
    forecasts: Arc<dyn ForecastStore>,
    config: ForecastConfig,
    rng: Mutex<StdRng>,
}

impl ForecastEngine {
    #[must_use]
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        market: Arc<dyn MarketDataStore>,
        forecasts: Arc<dyn ForecastStore>,
        config: ForecastConfig,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            inventory,
            market,
            forecasts,
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Runs one forecast pass over all known SKU/regions.
    ///
    /// Emits one `ForecastRecord` per key per invocation without
    /// deduplicating; retention is the caller's policy. A missing or errored
    /// market observation degrades to "no competitor signal"; a failed write
    /// records a per-item failure and the run continues. Only an inventory
    /// scan failure aborts the whole run.
    ///
    /// # Errors
    ///
    /// Returns an error only if the inventory scan itself fails.
    pub async fn run(&self, cancel: &CancelToken) -> Result<ForecastRunReport> {
        let records = self.inventory.scan_inventory().await?;
        info!(items = records.len(), "forecast run started");

        let mut report = ForecastRunReport::default();
        for record in records {
            if cancel.is_cancelled() {
                info!("forecast run cancelled");
                report.cancelled = true;
                break;
            }
            report.items.push(self.forecast_one(&record).await);
        }

        info!(
            forecasted = report.forecasted(),
            failed = report.failed(),
            "forecast run finished"
        );
        Ok(report)
    }

    async fn forecast_one(&self, record: &InventoryRecord) -> ForecastItemOutcome {
        let observation = match self.market.latest_observation(&record.key).await {
            Ok(observation) => observation,
            Err(err) => {
                warn!(key = %record.key, %err, "market observation unavailable, continuing without competitor signal");
                None
            }
        };

        let demand_factor = self.demand_factor(record, observation.as_ref());
        let forecasted_demand_units = (record.stock_level * demand_factor * self.config.damping)
            .round()
            .to_i64()
            .unwrap_or(0)
            .max(1);

        let forecast = ForecastRecord {
            key: record.key.clone(),
            forecast_at: Utc::now(),
            forecasted_demand_units,
            demand_factor: demand_factor.round_dp(2),
            competitor_price_snapshot: observation.map(|o| o.competitor_price),
        };
        debug!(key = %record.key, factor = %forecast.demand_factor, units = forecasted_demand_units, "forecast computed");

        match self.forecasts.put_forecast(forecast.clone()).await {
            Ok(()) => ForecastItemOutcome::Forecasted {
                key: record.key.clone(),
                demand_factor: forecast.demand_factor,
                forecasted_demand_units,
            },
            Err(err) => {
                warn!(key = %record.key, %err, "failed to store forecast");
                ForecastItemOutcome::Failed {
                    key: record.key.clone(),
                    error: err.to_string(),
                }
            }
        }
    }

    fn demand_factor(
        &self,
        record: &InventoryRecord,
        observation: Option<&MarketObservation>,
    ) -> Decimal {
        let mut factor = Decimal::ONE;

        if let Some(observation) = observation {
            let reference = record.current_price;
            // Exclusive band edges: a price exactly on the band does nothing.
            if observation.competitor_price < reference * (Decimal::ONE - self.config.low_band) {
                factor -= self.config.undercut_drop;
            } else if observation.competitor_price
                > reference * (Decimal::ONE + self.config.high_band)
            {
                factor += self.config.premium_boost;
            }
        }

        factor + self.noise()
    }

    /// Uniform perturbation in `[-noise_amplitude, +noise_amplitude]`,
    /// quantized to four decimal places.
    fn noise(&self) -> Decimal {
        let steps = (self.config.noise_amplitude * dec!(10000))
            .to_i64()
            .unwrap_or(0);
        if steps <= 0 {
            return Decimal::ZERO;
        }
        Decimal::new(self.rng.lock().gen_range(-steps..=steps), 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone};
    use pricepilot_core::error::PricingError;
    use pricepilot_core::types::SkuRegion;
    use pricepilot_store::MemoryStore;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()
    }

    fn quiet_config() -> ForecastConfig {
        ForecastConfig {
            noise_amplitude: Decimal::ZERO,
            seed: Some(7),
            ..ForecastConfig::default()
        }
    }

    async fn seed_item(store: &MemoryStore, sku: &str, price: Decimal, stock: Decimal) {
        store
            .upsert_inventory(InventoryRecord {
                key: SkuRegion::new(sku, "US-EAST-1"),
                name: format!("Product {sku}"),
                category: "General".to_string(),
                current_price: price,
                stock_level: stock,
                cost: price * dec!(0.7),
                last_updated: at(0),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn baseline_factor_without_observation() {
        let store = MemoryStore::new();
        seed_item(&store, "SKU001", dec!(100), dec!(200)).await;

        let engine = ForecastEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            quiet_config(),
        );
        let report = engine.run(&CancelToken::new()).await.unwrap();
        assert_eq!(report.forecasted(), 1);

        let forecast = store
            .latest_forecast(&SkuRegion::new("SKU001", "US-EAST-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(forecast.demand_factor, dec!(1.00));
        assert!(forecast.competitor_price_snapshot.is_none());
        // 200 * 1.0 * 0.8
        assert_eq!(forecast.forecasted_demand_units, 160);
    }

    #[tokio::test]
    async fn material_undercut_lowers_factor() {
        let store = MemoryStore::new();
        seed_item(&store, "SKU001", dec!(100), dec!(100)).await;
        store
            .record_observation(MarketObservation {
                key: SkuRegion::new("SKU001", "US-EAST-1"),
                observed_at: at(9),
                competitor_price: dec!(80),
            })
            .await
            .unwrap();

        let engine = ForecastEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            quiet_config(),
        );
        engine.run(&CancelToken::new()).await.unwrap();

        let forecast = store
            .latest_forecast(&SkuRegion::new("SKU001", "US-EAST-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(forecast.demand_factor, dec!(0.95));
        assert_eq!(forecast.competitor_price_snapshot, Some(dec!(80)));
        // 100 * 0.95 * 0.8
        assert_eq!(forecast.forecasted_demand_units, 76);
    }

    #[tokio::test]
    async fn band_edge_is_exclusive() {
        let store = MemoryStore::new();
        seed_item(&store, "SKU001", dec!(100), dec!(100)).await;
        // Exactly 10% below: not a material undercut.
        store
            .record_observation(MarketObservation {
                key: SkuRegion::new("SKU001", "US-EAST-1"),
                observed_at: at(9),
                competitor_price: dec!(90),
            })
            .await
            .unwrap();

        let engine = ForecastEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            quiet_config(),
        );
        engine.run(&CancelToken::new()).await.unwrap();

        let forecast = store
            .latest_forecast(&SkuRegion::new("SKU001", "US-EAST-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(forecast.demand_factor, dec!(1.00));
    }

    #[tokio::test]
    async fn expensive_competitor_raises_factor() {
        let store = MemoryStore::new();
        seed_item(&store, "SKU001", dec!(100), dec!(100)).await;
        store
            .record_observation(MarketObservation {
                key: SkuRegion::new("SKU001", "US-EAST-1"),
                observed_at: at(9),
                competitor_price: dec!(115),
            })
            .await
            .unwrap();

        let engine = ForecastEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            quiet_config(),
        );
        engine.run(&CancelToken::new()).await.unwrap();

        let forecast = store
            .latest_forecast(&SkuRegion::new("SKU001", "US-EAST-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(forecast.demand_factor, dec!(1.03));
    }

    #[tokio::test]
    async fn seeded_runs_are_deterministic() {
        let config = ForecastConfig {
            seed: Some(42),
            ..ForecastConfig::default()
        };

        let mut factors = Vec::new();
        for _ in 0..2 {
            let store = MemoryStore::new();
            seed_item(&store, "SKU001", dec!(100), dec!(100)).await;
            let engine = ForecastEngine::new(
                store.clone(),
                store.clone(),
                store.clone(),
                config.clone(),
            );
            engine.run(&CancelToken::new()).await.unwrap();
            factors.push(
                store
                    .latest_forecast(&SkuRegion::new("SKU001", "US-EAST-1"))
                    .await
                    .unwrap()
                    .unwrap()
                    .demand_factor,
            );
        }
        assert_eq!(factors[0], factors[1]);
        // Noise is bounded.
        assert!(factors[0] >= dec!(0.95) && factors[0] <= dec!(1.05));
    }

    #[tokio::test]
    async fn units_floor_at_one() {
        let store = MemoryStore::new();
        seed_item(&store, "SKU001", dec!(100), dec!(0)).await;

        let engine = ForecastEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            quiet_config(),
        );
        engine.run(&CancelToken::new()).await.unwrap();

        let forecast = store
            .latest_forecast(&SkuRegion::new("SKU001", "US-EAST-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(forecast.forecasted_demand_units, 1);
    }

    struct FlakyMarket;

    #[async_trait]
    impl MarketDataStore for FlakyMarket {
        async fn record_observation(&self, _observation: MarketObservation) -> Result<()> {
            Ok(())
        }

        async fn latest_observation(
            &self,
            _key: &SkuRegion,
        ) -> Result<Option<MarketObservation>> {
            Err(PricingError::store("market data table offline"))
        }
    }

    #[tokio::test]
    async fn observation_error_degrades_to_no_signal() {
        let store = MemoryStore::new();
        seed_item(&store, "SKU001", dec!(100), dec!(200)).await;

        let engine = ForecastEngine::new(
            store.clone(),
            Arc::new(FlakyMarket),
            store.clone(),
            quiet_config(),
        );
        let report = engine.run(&CancelToken::new()).await.unwrap();
        assert_eq!(report.forecasted(), 1);
        assert_eq!(report.failed(), 0);

        let forecast = store
            .latest_forecast(&SkuRegion::new("SKU001", "US-EAST-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(forecast.demand_factor, dec!(1.00));
    }

    struct RejectingForecasts {
        inner: Arc<MemoryStore>,
        reject_sku: String,
    }

    #[async_trait]
    impl ForecastStore for RejectingForecasts {
        async fn put_forecast(&self, forecast: ForecastRecord) -> Result<()> {
            if forecast.key.sku == self.reject_sku {
                return Err(PricingError::store("write throttled"));
            }
            self.inner.put_forecast(forecast).await
        }

        async fn latest_forecast(&self, key: &SkuRegion) -> Result<Option<ForecastRecord>> {
            self.inner.latest_forecast(key).await
        }
    }

    #[tokio::test]
    async fn one_failed_write_does_not_abort_the_run() {
        let store = MemoryStore::new();
        seed_item(&store, "SKU001", dec!(100), dec!(200)).await;
        seed_item(&store, "SKU002", dec!(50), dec!(80)).await;

        let engine = ForecastEngine::new(
            store.clone(),
            store.clone(),
            Arc::new(RejectingForecasts {
                inner: store.clone(),
                reject_sku: "SKU001".to_string(),
            }),
            quiet_config(),
        );
        let report = engine.run(&CancelToken::new()).await.unwrap();
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.forecasted(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[tokio::test]
    async fn cancellation_stops_between_items() {
        let store = MemoryStore::new();
        seed_item(&store, "SKU001", dec!(100), dec!(200)).await;
        seed_item(&store, "SKU002", dec!(50), dec!(80)).await;

        let cancel = CancelToken::new();
        cancel.cancel();
        let engine = ForecastEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            quiet_config(),
        );
        let report = engine.run(&cancel).await.unwrap();
        assert!(report.cancelled);
        assert!(report.items.is_empty());
    }
}
