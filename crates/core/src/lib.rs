//! `pricepilot-core`
//!
//! Core types, capability traits, and configuration for the retail pricing
//! pipeline. This crate is pure domain plus seams: record types keyed by
//! `SkuRegion`, the recommendation status machine, the error taxonomy shared
//! by every engine, and the `async-trait` capabilities (stores, text
//! generation, notification, price push) that engines are constructed over.

pub mod cancel;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod traits;
pub mod types;

pub use cancel::CancelToken;
pub use config::{
    AppConfig, ForecastConfig, NotifySettings, PromoConfig, RuleThresholds, ServerConfig,
    StorefrontSettings, StrategyKind, TextGenSettings,
};
pub use config_loader::ConfigLoader;
pub use error::{PricingError, Result};
pub use traits::{
    CustomerProfileStore, ForecastStore, InventoryStore, MarketDataStore, Notifier, PricePusher,
    RecommendationStore, SyncLogStore, TextGenerator,
};
pub use types::{
    CustomerProfile, ForecastRecord, InventoryRecord, MarketObservation, Recommendation,
    RecommendationFilter, RecommendationKind, RecommendationStatus, SkuRegion,
    StructuredRecommendation, SyncLogEntry, SyncOutcome,
};
