//! Capability traits the engines are constructed over.
//!
//! Storage and external services are injected at engine construction so every
//! engine can run against the in-memory store and recording fakes in tests.
//! All calls are fallible and expected to be bounded by a timeout inside the
//! implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{
    CustomerProfile, ForecastRecord, InventoryRecord, MarketObservation, Recommendation,
    RecommendationFilter, RecommendationStatus, SkuRegion, StructuredRecommendation, SyncLogEntry,
};

/// Inventory rows, one per `SkuRegion`.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// All known inventory records; the product master for a pipeline run.
    async fn scan_inventory(&self) -> Result<Vec<InventoryRecord>>;

    async fn get_inventory(&self, key: &SkuRegion) -> Result<Option<InventoryRecord>>;

    /// Upsert a full record (seeding / master-data ingestion).
    async fn upsert_inventory(&self, record: InventoryRecord) -> Result<()>;

    /// Set the current price after a successful external push.
    async fn update_price(
        &self,
        key: &SkuRegion,
        new_price: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;
}

/// Append-only competitor price observations.
#[async_trait]
pub trait MarketDataStore: Send + Sync {
    async fn record_observation(&self, observation: MarketObservation) -> Result<()>;

    /// The observation with the greatest `observed_at` for this key.
    async fn latest_observation(&self, key: &SkuRegion) -> Result<Option<MarketObservation>>;
}

/// Append-only demand forecasts.
#[async_trait]
pub trait ForecastStore: Send + Sync {
    async fn put_forecast(&self, forecast: ForecastRecord) -> Result<()>;

    /// The forecast with the greatest `forecast_at` for this key.
    async fn latest_forecast(&self, key: &SkuRegion) -> Result<Option<ForecastRecord>>;
}

/// Recommendations, keyed by id and filterable on kind/status.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn put_recommendation(&self, recommendation: Recommendation) -> Result<()>;

    async fn get_recommendation(&self, id: Uuid) -> Result<Option<Recommendation>>;

    async fn scan_recommendations(
        &self,
        filter: &RecommendationFilter,
    ) -> Result<Vec<Recommendation>>;

    /// Advance a recommendation's status. Implementations must reject any
    /// transition `RecommendationStatus::can_advance_to` does not allow.
    async fn update_status(&self, id: Uuid, status: RecommendationStatus) -> Result<()>;
}

/// Append-only sync audit log.
#[async_trait]
pub trait SyncLogStore: Send + Sync {
    async fn append(&self, entry: SyncLogEntry) -> Result<()>;

    async fn entries_for(&self, key: &SkuRegion) -> Result<Vec<SyncLogEntry>>;
}

/// Customer segment profiles for promotion targeting.
#[async_trait]
pub trait CustomerProfileStore: Send + Sync {
    async fn scan_profiles(&self) -> Result<Vec<CustomerProfile>>;
}

/// A text-generation capability (LLM vendor behind a seam).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Free-form generation; returns the generated text.
    async fn generate(
        &self,
        system_context: &str,
        user_context: &str,
        max_output_tokens: u32,
    ) -> Result<String>;

    /// Structured generation. Output that fails schema validation surfaces as
    /// `PricingError::MalformedResponse`; callers treat that as "no
    /// recommendation", never as a fatal error.
    async fn generate_structured(
        &self,
        system_context: &str,
        user_context: &str,
        max_output_tokens: u32,
    ) -> Result<StructuredRecommendation>;
}

/// Customer-facing message dispatch. The contact format (email-like versus
/// phone-like) selects the delivery channel inside the implementation.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, contact: &str, message: &str) -> Result<()>;
}

/// Push an approved price to the storefront of record.
#[async_trait]
pub trait PricePusher: Send + Sync {
    async fn push_price(&self, sku: &str, new_price: Decimal) -> Result<()>;
}
