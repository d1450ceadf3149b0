//! `pricepilot-store`
//!
//! In-memory implementation of every store capability in
//! `pricepilot-core::traits`. Backs the demo pipeline, the web API, and most
//! engine tests; real deployments swap in a managed key-value store behind
//! the same traits.

pub mod memory;

pub use memory::MemoryStore;
