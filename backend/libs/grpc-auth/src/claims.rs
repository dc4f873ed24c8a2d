//! Standard claims of a verified token
//!
//! Stored in the outbound request extensions by the auth layer so that
//! downstream tower layers can log the caller. Never forwarded to a backend.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Registered claims the gateway cares about.
///
/// All fields are optional: the gateway only requires a valid signature, and
/// checks `exp`/`nbf` when they are present. Time claims are NumericDate
/// values, so fractional seconds are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifiedClaims {
    /// Subject (caller identity); numeric subjects are kept in their JSON form
    #[serde(
        default,
        deserialize_with = "subject_claim",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<f64>,

    /// Not before (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<f64>,

    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<f64>,
}

impl VerifiedClaims {
    /// Subject for log fields, `-` when absent
    pub fn subject(&self) -> &str {
        self.sub.as_deref().unwrap_or("-")
    }

    /// `true` if `exp` lies more than `leeway` seconds in the past
    pub fn is_expired(&self, now: f64, leeway: f64) -> bool {
        self.exp.is_some_and(|exp| exp < now - leeway)
    }

    /// `true` if `nbf` lies more than `leeway` seconds in the future
    pub fn is_immature(&self, now: f64, leeway: f64) -> bool {
        self.nbf.is_some_and(|nbf| nbf > now + leeway)
    }
}

/// Accept a string or number `sub`; any other JSON type is treated as absent
fn subject_claim<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(sub)) => Some(sub),
        Some(Value::Number(sub)) => Some(sub.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_claims_deserialize_as_none() {
        let claims: VerifiedClaims = serde_json::from_str(r#"{"user_id": 7}"#).unwrap();

        assert_eq!(claims, VerifiedClaims::default());
        assert_eq!(claims.subject(), "-");
    }

    #[test]
    fn test_subject() {
        let claims = VerifiedClaims {
            sub: Some("user-42".to_string()),
            ..Default::default()
        };

        assert_eq!(claims.subject(), "user-42");
    }

    #[test]
    fn test_numeric_subject_kept() {
        let claims: VerifiedClaims = serde_json::from_str(r#"{"sub": 42}"#).unwrap();

        assert_eq!(claims.subject(), "42");
    }

    #[test]
    fn test_non_scalar_subject_ignored() {
        let claims: VerifiedClaims =
            serde_json::from_str(r#"{"sub": {"id": 1}, "exp": null}"#).unwrap();

        assert_eq!(claims, VerifiedClaims::default());
    }

    #[test]
    fn test_fractional_time_claims() {
        let claims: VerifiedClaims =
            serde_json::from_str(r#"{"exp": 1700000000.5, "nbf": 1600000000, "iat": 1.5e9}"#)
                .unwrap();

        assert_eq!(claims.exp, Some(1_700_000_000.5));
        assert_eq!(claims.nbf, Some(1_600_000_000.0));
        assert_eq!(claims.iat, Some(1_500_000_000.0));
    }

    #[test]
    fn test_non_numeric_exp_rejected() {
        let result = serde_json::from_str::<VerifiedClaims>(r#"{"exp": "tomorrow"}"#);

        assert!(result.is_err());
    }

    #[test]
    fn test_time_window() {
        let claims = VerifiedClaims {
            exp: Some(1000.5),
            nbf: Some(900.0),
            ..Default::default()
        };

        assert!(!claims.is_expired(1000.0, 0.0));
        assert!(claims.is_expired(1001.0, 0.0));
        assert!(!claims.is_expired(1001.0, 60.0));
        assert!(claims.is_immature(899.0, 0.0));
        assert!(!claims.is_immature(899.0, 5.0));
    }
}
