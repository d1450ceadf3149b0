//! Pipeline assembly and one-shot execution.
//!
//! `Pipeline::from_config` turns an [`AppConfig`] into a wired pipeline:
//! in-memory stores, the configured pricing strategy, and HTTP clients for
//! every capability the config enables. A missing textgen endpoint is not an
//! error; the pipeline runs offline on the rule cascade and templated promo
//! copy.

use std::sync::Arc;

use tracing::{info, warn};

use pricepilot_core::config::{AppConfig, NotifySettings, StrategyKind, TextGenSettings};
use pricepilot_core::error::Result;
use pricepilot_core::traits::{Notifier, TextGenerator};
use pricepilot_core::CancelToken;
use pricepilot_forecast::{ForecastEngine, ForecastRunReport};
use pricepilot_notify::{NotifyClient, NotifyClientConfig};
use pricepilot_recommendation::{
    LlmStrategy, PricingStrategy, RecommendationEngine, RecommendationRunReport,
    RuleBasedStrategy,
};
use pricepilot_store::MemoryStore;
use pricepilot_storefront::{StorefrontClient, StorefrontClientConfig};
use pricepilot_sync::{SyncEngine, SyncResult};
use pricepilot_textgen::{TextGenClient, TextGenClientConfig};

/// Outcome of one full pipeline pass.
#[derive(Debug)]
pub struct PipelineReport {
    pub forecast: ForecastRunReport,
    pub recommendation: RecommendationRunReport,
    pub sync: Vec<SyncResult>,
}

/// A fully wired pricing pipeline sharing one record store.
pub struct Pipeline {
    store: Arc<MemoryStore>,
    forecast: ForecastEngine,
    recommendation: RecommendationEngine,
    sync: SyncEngine,
}

impl Pipeline {
    /// Builds a pipeline over a fresh in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = MemoryStore::new();

        let textgen = build_textgen(&config.textgen)?;
        let notifier = build_notifier(&config.notify)?;
        let strategy = build_strategy(config, textgen.clone());

        let pusher = Arc::new(StorefrontClient::new(
            StorefrontClientConfig::default()
                .with_update_url(config.storefront.update_url.clone())
                .with_timeout_secs(config.storefront.timeout_secs),
        )?);

        let forecast = ForecastEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            config.forecast.clone(),
        );
        let recommendation = RecommendationEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            strategy,
            textgen,
            notifier,
            config.promo.clone(),
        );
        let sync = SyncEngine::new(store.clone(), store.clone(), store.clone(), pusher);

        Ok(Self {
            store,
            forecast,
            recommendation,
            sync,
        })
    }

    /// The shared record store backing every stage.
    #[must_use]
    pub fn store(&self) -> Arc<MemoryStore> {
        self.store.clone()
    }

    #[must_use]
    pub fn sync_engine(&self) -> &SyncEngine {
        &self.sync
    }

    /// Runs forecast, recommendation, and sync once, in order.
    ///
    /// The sync stage processes whatever price adjustments are already
    /// approved; recommendations produced earlier in the same pass stay in
    /// review until someone applies them.
    ///
    /// # Errors
    ///
    /// Returns an error if a stage cannot scan its primary input set.
    pub async fn run_once(&self, cancel: &CancelToken) -> Result<PipelineReport> {
        info!("pipeline run started");
        let forecast = self.forecast.run(cancel).await?;
        let recommendation = self.recommendation.run(cancel).await?;
        let pending = self.sync.pending_applied().await?;
        let sync = self.sync.sync_batch(&pending, cancel).await;
        info!(
            forecasted = forecast.forecasted(),
            recommended = recommendation.recommended(),
            synced = sync.len(),
            "pipeline run finished"
        );
        Ok(PipelineReport {
            forecast,
            recommendation,
            sync,
        })
    }
}

fn build_textgen(settings: &TextGenSettings) -> Result<Option<Arc<dyn TextGenerator>>> {
    let Some(endpoint) = &settings.endpoint else {
        info!("no textgen endpoint configured, running offline");
        return Ok(None);
    };
    let client = TextGenClient::new(TextGenClientConfig {
        base_url: endpoint.clone(),
        model: settings.model.clone(),
        api_key: settings.api_key.clone(),
        timeout_secs: settings.timeout_secs,
    })?;
    Ok(Some(Arc::new(client)))
}

fn build_notifier(settings: &NotifySettings) -> Result<Option<Arc<dyn Notifier>>> {
    if settings.email_webhook_url.is_none() && settings.sms_webhook_url.is_none() {
        return Ok(None);
    }
    let defaults = NotifyClientConfig::default();
    let client = NotifyClient::new(NotifyClientConfig {
        email_webhook_url: settings
            .email_webhook_url
            .clone()
            .unwrap_or(defaults.email_webhook_url),
        sms_webhook_url: settings
            .sms_webhook_url
            .clone()
            .unwrap_or(defaults.sms_webhook_url),
        timeout_secs: settings.timeout_secs,
    })?;
    Ok(Some(Arc::new(client)))
}

fn build_strategy(
    config: &AppConfig,
    textgen: Option<Arc<dyn TextGenerator>>,
) -> Arc<dyn PricingStrategy> {
    match (config.strategy, textgen) {
        (StrategyKind::Rules, _) => Arc::new(RuleBasedStrategy::new(config.rules.clone())),
        (StrategyKind::Llm, Some(textgen)) => Arc::new(LlmStrategy::new(
            textgen,
            config.promo.goal.clone(),
            config.promo.max_output_tokens,
        )),
        (StrategyKind::Llm, None) => {
            warn!("llm strategy selected without a textgen endpoint, falling back to rules");
            Arc::new(RuleBasedStrategy::new(config.rules.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm_config(endpoint: Option<&str>) -> AppConfig {
        let mut config = AppConfig::default();
        config.strategy = StrategyKind::Llm;
        config.textgen.endpoint = endpoint.map(str::to_string);
        config
    }

    #[test]
    fn rules_strategy_is_the_default_wiring() {
        let config = AppConfig::default();
        let textgen = build_textgen(&config.textgen).unwrap();
        assert!(textgen.is_none());
        let strategy = build_strategy(&config, textgen);
        assert_eq!(strategy.name(), "rules");
    }

    #[test]
    fn llm_strategy_requires_an_endpoint() {
        let config = llm_config(None);
        let strategy = build_strategy(&config, build_textgen(&config.textgen).unwrap());
        assert_eq!(strategy.name(), "rules");

        let config = llm_config(Some("http://127.0.0.1:5000/mock-api/generate"));
        let strategy = build_strategy(&config, build_textgen(&config.textgen).unwrap());
        assert_eq!(strategy.name(), "llm");
    }

    #[test]
    fn notifier_absent_until_a_webhook_is_configured() {
        let mut settings = NotifySettings::default();
        assert!(build_notifier(&settings).unwrap().is_none());

        settings.email_webhook_url = Some("http://127.0.0.1:5000/mock-api/send_email".to_string());
        assert!(build_notifier(&settings).unwrap().is_some());
    }

    #[tokio::test]
    async fn from_config_builds_a_runnable_pipeline() {
        use pricepilot_core::traits::InventoryStore;

        let pipeline = Pipeline::from_config(&AppConfig::default()).unwrap();
        let records = pipeline.store().scan_inventory().await.unwrap();
        assert!(records.is_empty());
    }
}
