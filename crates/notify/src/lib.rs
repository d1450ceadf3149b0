//! `pricepilot-notify`
//!
//! Notification capability behind the `Notifier` trait. The delivery
//! channel is inferred from the contact string: addresses go over the
//! email webhook, phone numbers over the SMS webhook.

pub mod client;

pub use client::{NotifyChannel, NotifyClient, NotifyClientConfig};
