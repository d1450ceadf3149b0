//! Rule-based pricing strategy.
//!
//! Four rules evaluated in priority order; the first match wins and later
//! rules are never consulted. All threshold comparisons are strict, so a
//! value exactly on a threshold does not fire the rule.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

use pricepilot_core::config::RuleThresholds;
use pricepilot_core::error::Result;
use pricepilot_core::types::RecommendationKind;

use crate::strategy::{PriceProposal, PricingContext, PricingStrategy};

pub struct RuleBasedStrategy {
    thresholds: RuleThresholds,
}

impl RuleBasedStrategy {
    #[must_use]
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    fn evaluate(&self, ctx: &PricingContext) -> Option<(Decimal, String)> {
        let t = &self.thresholds;

        // (a) High demand with plenty of stock: raise to capture revenue.
        if ctx.demand_factor > t.high_demand && ctx.stock_level > t.high_stock {
            let price = ctx.current_price * (Decimal::ONE + t.raise_pct);
            return Some((
                price,
                format!(
                    "High demand detected ({}). Increasing price to maximize revenue.",
                    ctx.demand_factor
                ),
            ));
        }

        // (b) Low demand on a very full shelf: cut to clear inventory.
        if ctx.demand_factor < t.low_demand && ctx.stock_level > t.clearance_stock {
            let price = ctx.current_price * (Decimal::ONE - t.clearance_pct);
            return Some((
                price,
                format!(
                    "Low demand detected ({}). Decreasing price to clear inventory.",
                    ctx.demand_factor
                ),
            ));
        }

        // (c) Critically low stock with rising demand, but only while there
        // is margin headroom left to price into.
        if ctx.stock_level < t.low_stock
            && ctx.demand_factor > Decimal::ONE
            && ctx.current_price < ctx.cost * t.margin_multiple
        {
            let price = ctx.current_price * (Decimal::ONE + t.low_stock_raise_pct);
            return Some((
                price,
                format!(
                    "Critical low stock ({}). Increasing price to manage demand.",
                    ctx.stock_level
                ),
            ));
        }

        // (d) Competitor undercutting by more than the threshold: match them
        // minus a small margin.
        if let Some(competitor) = ctx.competitor_price {
            if competitor < ctx.current_price * t.undercut_ratio {
                let price = competitor * t.match_ratio;
                return Some((
                    price,
                    format!(
                        "Competitor price ({competitor}) is significantly lower. Adjusting to remain competitive."
                    ),
                ));
            }
        }

        None
    }
}

#[async_trait]
impl PricingStrategy for RuleBasedStrategy {
    async fn propose(&self, context: &PricingContext) -> Result<Option<PriceProposal>> {
        let Some((raw_price, reason)) = self.evaluate(context) else {
            debug!(key = %context.key, "no pricing rule fired");
            return Ok(None);
        };

        let recommended_price = raw_price.round_dp(2);
        if recommended_price == context.current_price {
            return Ok(None);
        }

        Ok(Some(PriceProposal {
            recommended_price,
            kind: RecommendationKind::PriceAdjustment,
            reason,
            promo_text: None,
        }))
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}
