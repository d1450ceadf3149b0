//! Error taxonomy shared by every pipeline stage.
//!
//! Per-item failures inside a batch are caught at the item boundary and
//! recorded in that item's outcome; only a failure to read a primary input
//! set aborts a whole run. `MalformedResponse` is never fatal: callers
//! degrade to "no recommendation for this item".

use thiserror::Error;

use crate::types::RecommendationStatus;

/// Errors produced by stores, external capabilities, and the engines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// A read or write against a record store failed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A text-generation, notification, or price-push call failed or timed out.
    #[error("external call failed: {0}")]
    ExternalCallFailed(String),

    /// Text-generation output failed structural validation.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// An expected record was absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// A request was missing a required field or carried an invalid value.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A recommendation status change would move backward or sideways.
    #[error("invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        /// Status the recommendation currently holds.
        from: RecommendationStatus,
        /// Status the caller asked for.
        to: RecommendationStatus,
    },
}

impl PricingError {
    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    pub fn external(msg: impl Into<String>) -> Self {
        Self::ExternalCallFailed(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Returns true if retrying the same call later could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_) | Self::ExternalCallFailed(_)
        )
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PricingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_is_transient() {
        assert!(PricingError::store("scan failed").is_transient());
        assert!(PricingError::external("timed out").is_transient());
    }

    #[test]
    fn malformed_response_is_not_transient() {
        assert!(!PricingError::malformed("missing field").is_transient());
        assert!(!PricingError::not_found("SKU123@US-EAST-1").is_transient());
        assert!(!PricingError::invalid_input("missing sku").is_transient());
    }

    #[test]
    fn transition_error_names_both_states() {
        let err = PricingError::InvalidTransition {
            from: RecommendationStatus::Sent,
            to: RecommendationStatus::Applied,
        };
        let display = err.to_string();
        assert!(display.contains("Sent"));
        assert!(display.contains("Applied"));
    }
}
