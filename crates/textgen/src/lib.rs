//! `pricepilot-textgen`
//!
//! Text-generation capability behind the `TextGenerator` trait: a reqwest
//! client speaking a messages-style JSON protocol, plus the parsing/validation
//! layer that treats model output as untrusted input.

pub mod client;
pub mod schema;

pub use client::{TextGenClient, TextGenClientConfig};
