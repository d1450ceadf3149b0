//! `pricepilot-sync`
//!
//! The Sync Engine: applies approved price recommendations one at a time.
//! Each item walks an ordered state machine (external push, inventory
//! update, audit log, status advance) and every attempt leaves a log entry.
//! There is no transaction spanning the storefront and the stores; the log
//! is how a half-applied price change is detected and reconciled.

pub mod engine;

pub use engine::{SyncEngine, SyncResult};
