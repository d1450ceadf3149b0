//! LLM-assisted pricing strategy.
//!
//! Builds a structured business context and asks the text-generation
//! capability for a structured recommendation. The model's output is
//! untrusted: it arrives through `generate_structured`, which enforces the
//! schema, and anything malformed degrades to "no recommendation for this
//! SKU" rather than failing the batch.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use pricepilot_core::error::{PricingError, Result};
use pricepilot_core::traits::TextGenerator;

use crate::strategy::{PriceProposal, PricingContext, PricingStrategy};

const SYSTEM_CONTEXT: &str = "You are an expert retail pricing analyst. \
Given a product's current price, stock level, unit cost, demand factor, and \
competitor price, decide whether to change the price. Respond with a single \
JSON object with fields: recommended_price (decimal), kind (one of \
\"price_adjustment\", \"flash_sale\", \"bundle_offer\"), reason (string), \
and optionally promo_text. No other fields, no prose outside the JSON.";

pub struct LlmStrategy {
    textgen: Arc<dyn TextGenerator>,
    business_goal: String,
    max_output_tokens: u32,
}

impl LlmStrategy {
    #[must_use]
    pub fn new(
        textgen: Arc<dyn TextGenerator>,
        business_goal: impl Into<String>,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            textgen,
            business_goal: business_goal.into(),
            max_output_tokens,
        }
    }

    fn user_context(&self, ctx: &PricingContext) -> String {
        let competitor = ctx
            .competitor_price
            .map_or_else(|| "unknown".to_string(), |p| p.to_string());
        format!(
            "SKU: {sku}\nRegion: {region}\nCurrent price: {price}\nStock level: {stock}\n\
             Unit cost: {cost}\nDemand factor: {demand}\nCompetitor price: {competitor}\n\
             Business goal: {goal}",
            sku = ctx.key.sku,
            region = ctx.key.region,
            price = ctx.current_price,
            stock = ctx.stock_level,
            cost = ctx.cost,
            demand = ctx.demand_factor,
            goal = self.business_goal,
        )
    }
}

#[async_trait]
impl PricingStrategy for LlmStrategy {
    async fn propose(&self, context: &PricingContext) -> Result<Option<PriceProposal>> {
        let structured = match self
            .textgen
            .generate_structured(
                SYSTEM_CONTEXT,
                &self.user_context(context),
                self.max_output_tokens,
            )
            .await
        {
            Ok(structured) => structured,
            Err(PricingError::MalformedResponse(msg)) => {
                warn!(key = %context.key, %msg, "model output failed validation, no recommendation");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let recommended_price = structured.recommended_price.round_dp(2);
        if recommended_price == context.current_price
            && structured.kind == pricepilot_core::types::RecommendationKind::PriceAdjustment
        {
            return Ok(None);
        }

        Ok(Some(PriceProposal {
            recommended_price,
            kind: structured.kind,
            reason: structured.reason,
            promo_text: structured.promo_text,
        }))
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pricepilot_core::types::{RecommendationKind, SkuRegion, StructuredRecommendation};
    use rust_decimal_macros::dec;

    struct ScriptedGenerator {
        responses: Mutex<Vec<Result<StructuredRecommendation>>>,
    }

    impl ScriptedGenerator {
        fn returning(responses: Vec<Result<StructuredRecommendation>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _: &str, _: &str, _: u32) -> Result<String> {
            Ok("unused".to_string())
        }

        async fn generate_structured(
            &self,
            _: &str,
            _: &str,
            _: u32,
        ) -> Result<StructuredRecommendation> {
            self.responses.lock().remove(0)
        }
    }

    fn context() -> PricingContext {
        PricingContext {
            key: SkuRegion::new("SKU001", "US-EAST-1"),
            current_price: dec!(100),
            stock_level: dec!(40),
            cost: dec!(60),
            demand_factor: dec!(1.0),
            competitor_price: Some(dec!(92)),
        }
    }

    #[tokio::test]
    async fn valid_structured_output_becomes_a_proposal() {
        let strategy = LlmStrategy::new(
            ScriptedGenerator::returning(vec![Ok(StructuredRecommendation {
                recommended_price: dec!(94.99),
                kind: RecommendationKind::PriceAdjustment,
                reason: "competitor pressure".to_string(),
                promo_text: None,
            })]),
            "maximize margin",
            256,
        );
        let proposal = strategy.propose(&context()).await.unwrap().unwrap();
        assert_eq!(proposal.recommended_price, dec!(94.99));
        assert_eq!(proposal.reason, "competitor pressure");
    }

    #[tokio::test]
    async fn malformed_output_degrades_to_no_recommendation() {
        let strategy = LlmStrategy::new(
            ScriptedGenerator::returning(vec![Err(PricingError::malformed("not json"))]),
            "maximize margin",
            256,
        );
        assert!(strategy.propose(&context()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn external_failure_propagates_for_the_engine_to_absorb() {
        let strategy = LlmStrategy::new(
            ScriptedGenerator::returning(vec![Err(PricingError::external("timeout"))]),
            "maximize margin",
            256,
        );
        assert!(strategy.propose(&context()).await.is_err());
    }

    #[tokio::test]
    async fn noop_price_adjustment_is_suppressed() {
        let strategy = LlmStrategy::new(
            ScriptedGenerator::returning(vec![Ok(StructuredRecommendation {
                recommended_price: dec!(100),
                kind: RecommendationKind::PriceAdjustment,
                reason: "hold".to_string(),
                promo_text: None,
            })]),
            "maximize margin",
            256,
        );
        assert!(strategy.propose(&context()).await.unwrap().is_none());
    }
}
