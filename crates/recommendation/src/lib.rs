//! `pricepilot-recommendation`
//!
//! The Recommendation Engine and its pluggable decision strategies. One
//! engine, one `PricingStrategy` seam, two implementations: a deterministic
//! rule cascade and an LLM-assisted variant whose output is validated as
//! untrusted structured data. Promotion generation and notification dispatch
//! also live here.

pub mod engine;
pub mod llm;
pub mod report;
pub mod rules;
pub mod strategy;

pub use engine::RecommendationEngine;
pub use llm::LlmStrategy;
pub use report::{PromoOutcome, RecommendationItemOutcome, RecommendationRunReport};
pub use rules::RuleBasedStrategy;
pub use strategy::{PriceProposal, PricingContext, PricingStrategy};
