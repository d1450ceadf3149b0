//! `pricepilot-orchestrator`
//!
//! Wires the record store, pricing strategy, and external clients into a
//! runnable three-stage pipeline (forecast, recommend, sync), plus the demo
//! fixtures that make a fresh store interesting to run against.

pub mod pipeline;
pub mod seed;

pub use pipeline::{Pipeline, PipelineReport};
pub use seed::seed_demo_data;
