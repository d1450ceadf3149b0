//! Thread-safe in-memory record store.
//!
//! One `RwLock` per series; every write is a single-item upsert or append, so
//! there is no multi-series transaction to get wrong, which is the consistency
//! model the Sync Engine's state machine is built for. `Decimal` values are
//! stored as-is and round-trip without drift.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use uuid::Uuid;

use pricepilot_core::error::{PricingError, Result};
use pricepilot_core::traits::{
    CustomerProfileStore, ForecastStore, InventoryStore, MarketDataStore, RecommendationStore,
    SyncLogStore,
};
use pricepilot_core::types::{
    CustomerProfile, ForecastRecord, InventoryRecord, MarketObservation, Recommendation,
    RecommendationFilter, RecommendationStatus, SkuRegion, SyncLogEntry,
};

/// In-memory store implementing all pipeline store capabilities.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inventory: RwLock<HashMap<SkuRegion, InventoryRecord>>,
    observations: RwLock<HashMap<SkuRegion, Vec<MarketObservation>>>,
    forecasts: RwLock<HashMap<SkuRegion, Vec<ForecastRecord>>>,
    recommendations: RwLock<HashMap<Uuid, Recommendation>>,
    sync_log: RwLock<Vec<SyncLogEntry>>,
    profiles: RwLock<Vec<CustomerProfile>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replace the customer profile set (seeding).
    pub fn seed_profiles(&self, profiles: Vec<CustomerProfile>) {
        *self.profiles.write() = profiles;
    }

    /// Number of sync log entries written so far.
    #[must_use]
    pub fn sync_log_len(&self) -> usize {
        self.sync_log.read().len()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn scan_inventory(&self) -> Result<Vec<InventoryRecord>> {
        let mut records: Vec<_> = self.inventory.read().values().cloned().collect();
        records.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(records)
    }

    async fn get_inventory(&self, key: &SkuRegion) -> Result<Option<InventoryRecord>> {
        Ok(self.inventory.read().get(key).cloned())
    }

    async fn upsert_inventory(&self, record: InventoryRecord) -> Result<()> {
        self.inventory.write().insert(record.key.clone(), record);
        Ok(())
    }

    async fn update_price(
        &self,
        key: &SkuRegion,
        new_price: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut inventory = self.inventory.write();
        let record = inventory
            .get_mut(key)
            .ok_or_else(|| PricingError::not_found(key.to_string()))?;
        record.current_price = new_price;
        record.last_updated = updated_at;
        Ok(())
    }
}

#[async_trait]
impl MarketDataStore for MemoryStore {
    async fn record_observation(&self, observation: MarketObservation) -> Result<()> {
        self.observations
            .write()
            .entry(observation.key.clone())
            .or_default()
            .push(observation);
        Ok(())
    }

    async fn latest_observation(&self, key: &SkuRegion) -> Result<Option<MarketObservation>> {
        Ok(self
            .observations
            .read()
            .get(key)
            .and_then(|series| series.iter().max_by_key(|o| o.observed_at))
            .cloned())
    }
}

#[async_trait]
impl ForecastStore for MemoryStore {
    async fn put_forecast(&self, forecast: ForecastRecord) -> Result<()> {
        self.forecasts
            .write()
            .entry(forecast.key.clone())
            .or_default()
            .push(forecast);
        Ok(())
    }

    async fn latest_forecast(&self, key: &SkuRegion) -> Result<Option<ForecastRecord>> {
        Ok(self
            .forecasts
            .read()
            .get(key)
            .and_then(|series| series.iter().max_by_key(|f| f.forecast_at))
            .cloned())
    }
}

#[async_trait]
impl RecommendationStore for MemoryStore {
    async fn put_recommendation(&self, recommendation: Recommendation) -> Result<()> {
        self.recommendations
            .write()
            .insert(recommendation.id, recommendation);
        Ok(())
    }

    async fn get_recommendation(&self, id: Uuid) -> Result<Option<Recommendation>> {
        Ok(self.recommendations.read().get(&id).cloned())
    }

    async fn scan_recommendations(
        &self,
        filter: &RecommendationFilter,
    ) -> Result<Vec<Recommendation>> {
        let mut matched: Vec<_> = self
            .recommendations
            .read()
            .values()
            .filter(|rec| filter.matches(rec))
            .cloned()
            .collect();
        // Newest first, the order every consumer wants.
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    async fn update_status(&self, id: Uuid, status: RecommendationStatus) -> Result<()> {
        let mut recommendations = self.recommendations.write();
        let rec = recommendations
            .get_mut(&id)
            .ok_or_else(|| PricingError::not_found(id.to_string()))?;
        if !rec.status.can_advance_to(status) {
            return Err(PricingError::InvalidTransition {
                from: rec.status,
                to: status,
            });
        }
        rec.status = status;
        Ok(())
    }
}

#[async_trait]
impl SyncLogStore for MemoryStore {
    async fn append(&self, entry: SyncLogEntry) -> Result<()> {
        self.sync_log.write().push(entry);
        Ok(())
    }

    async fn entries_for(&self, key: &SkuRegion) -> Result<Vec<SyncLogEntry>> {
        Ok(self
            .sync_log
            .read()
            .iter()
            .filter(|entry| &entry.key == key)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CustomerProfileStore for MemoryStore {
    async fn scan_profiles(&self) -> Result<Vec<CustomerProfile>> {
        Ok(self.profiles.read().clone())
    }
}
