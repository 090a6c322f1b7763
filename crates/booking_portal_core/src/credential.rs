//! crates/booking_portal_core/src/credential.rs
//!
//! Decodes the expiry claim carried by a session credential.
//!
//! The credential is a compact `header.payload.signature` token. Only the payload
//! is inspected, and only for its `exp` claim; the signature is never verified
//! on the client.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;

use crate::domain::Credential;

/// Why a credential could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("expected 3 dot-separated segments, found {0}")]
    SegmentCount(usize),
    #[error("payload segment is not valid base64url: {0}")]
    Base64(String),
    #[error("payload is not a JSON object: {0}")]
    Json(String),
    #[error("payload has no numeric `exp` claim")]
    MissingExpiry,
}

/// Returns the credential's expiry as milliseconds since the Unix epoch.
pub fn expiry_epoch_ms(token: &str) -> Result<i64, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::SegmentCount(segments.len()));
    }

    // Issuers disagree on padding; the unpadded alphabet is canonical.
    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| TokenError::Base64(e.to_string()))?;

    let claims: Value =
        serde_json::from_slice(&bytes).map_err(|e| TokenError::Json(e.to_string()))?;
    let claims = claims
        .as_object()
        .ok_or_else(|| TokenError::Json("top-level value is not an object".to_string()))?;

    let exp = claims
        .get("exp")
        .and_then(Value::as_f64)
        .ok_or(TokenError::MissingExpiry)?;

    Ok((exp * 1000.0).round() as i64)
}

impl Credential {
    /// Decodes this credential's `exp` claim, see [`expiry_epoch_ms`].
    pub fn expiry_epoch_ms(&self) -> Result<i64, TokenError> {
        expiry_epoch_ms(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_decodes_integer_exp() {
        let token = token_with_payload(r#"{"sub":"u1","exp":1717200000}"#);
        assert_eq!(expiry_epoch_ms(&token), Ok(1_717_200_000_000));
    }

    #[test]
    fn test_decodes_fractional_exp() {
        let token = token_with_payload(r#"{"exp":1717200000.5}"#);
        assert_eq!(expiry_epoch_ms(&token), Ok(1_717_200_000_500));
    }

    #[test]
    fn test_accepts_padded_payload() {
        let padded = format!(
            "h.{}.s",
            base64::engine::general_purpose::URL_SAFE.encode(r#"{"exp":10}"#)
        );
        assert!(padded.contains('='));
        assert_eq!(expiry_epoch_ms(&padded), Ok(10_000));
    }

    #[test]
    fn test_rejects_wrong_segment_count() {
        assert_eq!(expiry_epoch_ms("only.two"), Err(TokenError::SegmentCount(2)));
        assert_eq!(expiry_epoch_ms("a.b.c.d"), Err(TokenError::SegmentCount(4)));
        assert_eq!(expiry_epoch_ms(""), Err(TokenError::SegmentCount(1)));
    }

    #[test]
    fn test_rejects_invalid_base64() {
        assert!(matches!(
            expiry_epoch_ms("h.!!not base64!!.s"),
            Err(TokenError::Base64(_))
        ));
    }

    #[test]
    fn test_rejects_non_json_and_non_object_payloads() {
        let garbage = format!("h.{}.s", URL_SAFE_NO_PAD.encode("not json"));
        assert!(matches!(expiry_epoch_ms(&garbage), Err(TokenError::Json(_))));

        let array = token_with_payload("[1,2,3]");
        assert!(matches!(expiry_epoch_ms(&array), Err(TokenError::Json(_))));
    }

    #[test]
    fn test_rejects_missing_or_non_numeric_exp() {
        let missing = token_with_payload(r#"{"sub":"u1"}"#);
        assert_eq!(expiry_epoch_ms(&missing), Err(TokenError::MissingExpiry));

        let textual = token_with_payload(r#"{"exp":"1717200000"}"#);
        assert_eq!(expiry_epoch_ms(&textual), Err(TokenError::MissingExpiry));
    }
}
