//! `pricepilot-forecast`
//!
//! The Forecast Engine: derives a demand factor and forecasted units per
//! SKU/region from inventory state and the latest competitor observation.
//! The model is placeholder arithmetic by design; the value of this crate is
//! the run contract (graceful degradation, per-item outcomes, deterministic
//! noise under a seed).

pub mod engine;
pub mod report;

pub use engine::ForecastEngine;
pub use report::{ForecastItemOutcome, ForecastRunReport};
