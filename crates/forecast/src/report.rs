//! Per-item outcomes for a forecast run.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pricepilot_core::types::SkuRegion;

/// What happened for one SKU/region during a forecast run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ForecastItemOutcome {
    /// A forecast record was written.
    Forecasted {
        key: SkuRegion,
        demand_factor: Decimal,
        forecasted_demand_units: i64,
    },
    /// The item failed; the run continued.
    Failed { key: SkuRegion, error: String },
}

impl ForecastItemOutcome {
    #[must_use]
    pub fn key(&self) -> &SkuRegion {
        match self {
            Self::Forecasted { key, .. } | Self::Failed { key, .. } => key,
        }
    }
}

/// Structured summary of a forecast run: counts plus per-item outcomes,
/// never a bare error for a single bad item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastRunReport {
    pub items: Vec<ForecastItemOutcome>,
    /// True when the run stopped early at a cancellation checkpoint.
    pub cancelled: bool,
}

impl ForecastRunReport {
    #[must_use]
    pub fn forecasted(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, ForecastItemOutcome::Forecasted { .. }))
            .count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.items.len() - self.forecasted()
    }
}
