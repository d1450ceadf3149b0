//! Parsing and validation of structured model output.
//!
//! Models are asked for a single JSON object but routinely wrap it in prose
//! or a code fence. Extraction is tolerant about the wrapping and strict
//! about the content: unknown fields, bad values, or no JSON at all are a
//! `MalformedResponse`, which callers treat as "no recommendation".

use pricepilot_core::error::{PricingError, Result};
use pricepilot_core::types::StructuredRecommendation;

/// Parses and validates a structured recommendation from raw model text.
pub fn parse_structured(raw: &str) -> Result<StructuredRecommendation> {
    let json = extract_json(raw)
        .ok_or_else(|| PricingError::malformed("no JSON object found in model output"))?;
    let structured: StructuredRecommendation = serde_json::from_str(json)
        .map_err(|err| PricingError::malformed(format!("schema violation: {err}")))?;
    structured.validate()?;
    Ok(structured)
}

/// Finds the first balanced JSON object in the text, skipping code fences.
fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricepilot_core::types::RecommendationKind;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_a_bare_json_object() {
        let parsed = parse_structured(
            r#"{"recommended_price": "94.99", "kind": "price_adjustment", "reason": "competitor undercut"}"#,
        )
        .unwrap();
        assert_eq!(parsed.recommended_price, dec!(94.99));
        assert_eq!(parsed.kind, RecommendationKind::PriceAdjustment);
        assert!(parsed.promo_text.is_none());
    }

    #[test]
    fn parses_json_wrapped_in_prose_and_fences() {
        let raw = "Here is my recommendation:\n```json\n{\"recommended_price\": 19.5, \
                   \"kind\": \"flash_sale\", \"reason\": \"clear stock\", \
                   \"promo_text\": \"48h flash sale!\"}\n```\nLet me know.";
        let parsed = parse_structured(raw).unwrap();
        assert_eq!(parsed.kind, RecommendationKind::FlashSale);
        assert_eq!(parsed.promo_text.as_deref(), Some("48h flash sale!"));
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_extraction() {
        let raw = r#"{"recommended_price": 10, "kind": "bundle_offer", "reason": "bundle {A+B} sells"}"#;
        let parsed = parse_structured(raw).unwrap();
        assert_eq!(parsed.reason, "bundle {A+B} sells");
    }

    #[test]
    fn missing_json_is_malformed() {
        let err = parse_structured("I cannot decide on a price today.").unwrap_err();
        assert!(matches!(err, PricingError::MalformedResponse(_)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = parse_structured(
            r#"{"recommended_price": 10, "kind": "flash_sale", "reason": "x", "confidence": 0.8}"#,
        )
        .unwrap_err();
        assert!(matches!(err, PricingError::MalformedResponse(_)));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = parse_structured(
            r#"{"recommended_price": 10, "kind": "price_gouge", "reason": "x"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, PricingError::MalformedResponse(_)));
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let err = parse_structured(
            r#"{"recommended_price": -3, "kind": "price_adjustment", "reason": "x"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, PricingError::MalformedResponse(_)));
    }

    #[test]
    fn truncated_output_is_malformed() {
        let err = parse_structured(r#"{"recommended_price": 10, "kind": "flash_sale""#)
            .unwrap_err();
        assert!(matches!(err, PricingError::MalformedResponse(_)));
    }
}
