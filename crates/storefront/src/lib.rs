//! `pricepilot-storefront`
//!
//! Price-push capability behind the `PricePusher` trait: a thin reqwest
//! client for the storefront's price-update endpoint.

pub mod client;

pub use client::{StorefrontClient, StorefrontClientConfig};
