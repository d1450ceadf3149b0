//! Application configuration.
//!
//! Every business threshold the engines consult lives here rather than in
//! engine code; defaults reproduce the demo constants the pipeline shipped
//! with. Loaded via [`crate::ConfigLoader`] from TOML plus `PRICEPILOT_`
//! environment variables.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub strategy: StrategyKind,
    pub forecast: ForecastConfig,
    pub rules: RuleThresholds,
    pub promo: PromoConfig,
    pub textgen: TextGenSettings,
    pub storefront: StorefrontSettings,
    pub notify: NotifySettings,
}

/// Which pricing strategy the Recommendation Engine runs with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Deterministic rule cascade (the baseline).
    #[default]
    Rules,
    /// LLM-assisted structured recommendations; requires a textgen endpoint.
    Llm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Forecast Engine tunables.
///
/// Band comparisons are exclusive: a competitor price exactly on a band edge
/// leaves the demand factor untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Fractional band below the current price that counts as a material
    /// undercut (0.10 = more than 10% below).
    pub low_band: Decimal,
    /// Fractional band above the current price that counts as materially
    /// more expensive.
    pub high_band: Decimal,
    /// Factor decrement applied on a material undercut.
    pub undercut_drop: Decimal,
    /// Factor increment applied when the competitor is materially above.
    pub premium_boost: Decimal,
    /// Half-width of the uniform noise perturbation on the demand factor.
    pub noise_amplitude: Decimal,
    /// Damping constant applied when deriving forecast units from stock.
    pub damping: Decimal,
    /// Seed for the noise generator; set for deterministic runs.
    pub seed: Option<u64>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            low_band: dec!(0.10),
            high_band: dec!(0.10),
            undercut_drop: dec!(0.05),
            premium_boost: dec!(0.03),
            noise_amplitude: dec!(0.05),
            damping: dec!(0.8),
            seed: None,
        }
    }
}

/// Rule-based pricing thresholds, evaluated in priority order (a)-(d).
///
/// All comparisons are strict: a demand factor of exactly `high_demand` does
/// not fire rule (a).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    /// (a) demand factor above this plus stock above `high_stock` raises the
    /// price by `raise_pct`.
    pub high_demand: Decimal,
    pub high_stock: Decimal,
    pub raise_pct: Decimal,
    /// (b) demand factor below this plus stock above `clearance_stock` cuts
    /// the price by `clearance_pct`.
    pub low_demand: Decimal,
    pub clearance_stock: Decimal,
    pub clearance_pct: Decimal,
    /// (c) stock below this with a rising demand factor and the current price
    /// under `cost * margin_multiple` raises the price by
    /// `low_stock_raise_pct`.
    pub low_stock: Decimal,
    pub margin_multiple: Decimal,
    pub low_stock_raise_pct: Decimal,
    /// (d) a competitor price under `current * undercut_ratio` is matched at
    /// `competitor * match_ratio`.
    pub undercut_ratio: Decimal,
    pub match_ratio: Decimal,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            high_demand: dec!(1.1),
            high_stock: dec!(50),
            raise_pct: dec!(0.05),
            low_demand: dec!(0.9),
            clearance_stock: dec!(150),
            clearance_pct: dec!(0.10),
            low_stock: dec!(30),
            margin_multiple: dec!(1.3),
            low_stock_raise_pct: dec!(0.10),
            undercut_ratio: dec!(0.95),
            match_ratio: dec!(0.98),
        }
    }
}

/// Promotion generation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromoConfig {
    /// Per-segment sampling probability for generating a promotion.
    pub probability: f64,
    /// Business goal fed into the promotional copy request.
    pub goal: String,
    /// Token budget for generated promotional copy.
    pub max_output_tokens: u32,
    /// Seed for the sampling RNG; set for deterministic runs.
    pub seed: Option<u64>,
}

impl Default for PromoConfig {
    fn default() -> Self {
        Self {
            probability: 0.2,
            goal: "drive sales or clear inventory".to_string(),
            max_output_tokens: 200,
            seed: None,
        }
    }
}

/// Text-generation endpoint settings. An absent endpoint runs the pipeline
/// offline: rule-based pricing plus templated promotional copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextGenSettings {
    pub endpoint: Option<String>,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for TextGenSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: "claude-3-sonnet".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontSettings {
    pub update_url: String,
    pub timeout_secs: u64,
}

impl Default for StorefrontSettings {
    fn default() -> Self {
        Self {
            update_url: "http://127.0.0.1:5000/mock-api/update_price".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    pub email_webhook_url: Option<String>,
    pub sms_webhook_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            email_webhook_url: None,
            sms_webhook_url: None,
            timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_match_demo_constants() {
        let rules = RuleThresholds::default();
        assert_eq!(rules.high_demand, dec!(1.1));
        assert_eq!(rules.raise_pct, dec!(0.05));
        assert_eq!(rules.clearance_stock, dec!(150));
        assert_eq!(rules.match_ratio, dec!(0.98));

        let forecast = ForecastConfig::default();
        assert_eq!(forecast.damping, dec!(0.8));
        assert_eq!(forecast.undercut_drop, dec!(0.05));
    }

    #[test]
    fn default_strategy_is_rules() {
        assert_eq!(AppConfig::default().strategy, StrategyKind::Rules);
    }
}
