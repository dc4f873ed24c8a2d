//! Bearer token verification
//!
//! ## Security Design
//!
//! - **One algorithm family per deployment**: the token header `alg` must belong
//!   to the configured family before any key material is touched, so a token
//!   signed with HS256 using an RSA public key as the secret is rejected.
//! - **Key injected at construction**: no global key state.
//! - **No panics**: malformed, forged and expired tokens are routine input and
//!   come back as `TokenError`.

use std::fmt;
use std::str::FromStr;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, get_current_timestamp, Algorithm, DecodingKey, Validation};

use crate::claims::VerifiedClaims;
use crate::error::TokenError;

/// Signing algorithm family accepted by a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmFamily {
    /// HS256, HS384, HS512 with a shared secret
    Hmac,
    /// RS256/384/512 and PS256/384/512 with an RSA public key
    Rsa,
    /// ES256, ES384 with an EC public key
    Ecdsa,
}

impl AlgorithmFamily {
    pub fn algorithms(self) -> &'static [Algorithm] {
        match self {
            AlgorithmFamily::Hmac => &[Algorithm::HS256, Algorithm::HS384, Algorithm::HS512],
            AlgorithmFamily::Rsa => &[
                Algorithm::RS256,
                Algorithm::RS384,
                Algorithm::RS512,
                Algorithm::PS256,
                Algorithm::PS384,
                Algorithm::PS512,
            ],
            AlgorithmFamily::Ecdsa => &[Algorithm::ES256, Algorithm::ES384],
        }
    }

    pub fn contains(self, alg: Algorithm) -> bool {
        self.algorithms().contains(&alg)
    }
}

impl fmt::Display for AlgorithmFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlgorithmFamily::Hmac => "hmac",
            AlgorithmFamily::Rsa => "rsa",
            AlgorithmFamily::Ecdsa => "ecdsa",
        };
        f.write_str(name)
    }
}

impl FromStr for AlgorithmFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hmac" | "hs" | "hs256" => Ok(AlgorithmFamily::Hmac),
            "rsa" | "rs" | "rs256" => Ok(AlgorithmFamily::Rsa),
            "ecdsa" | "ec" | "es256" => Ok(AlgorithmFamily::Ecdsa),
            other => Err(format!(
                "unknown algorithm family '{}' (expected hmac, rsa or ecdsa)",
                other
            )),
        }
    }
}

/// Verifies bearer credentials against one algorithm family and one key.
///
/// Immutable after construction and cheap to share behind an `Arc`.
#[derive(Clone)]
pub struct TokenVerifier {
    family: AlgorithmFamily,
    key: DecodingKey,
    leeway_secs: u64,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("family", &self.family)
            .field("leeway_secs", &self.leeway_secs)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Build a verifier from raw key material.
    ///
    /// `key_material` is the shared secret for `Hmac` and a PEM encoded public
    /// key for `Rsa` and `Ecdsa`.
    ///
    /// ## Errors
    ///
    /// `TokenError::InvalidKey` if the secret is empty or the PEM cannot be parsed.
    pub fn new(
        family: AlgorithmFamily,
        key_material: &[u8],
        leeway_secs: u64,
    ) -> Result<Self, TokenError> {
        let key = match family {
            AlgorithmFamily::Hmac => {
                if key_material.is_empty() {
                    return Err(TokenError::InvalidKey("empty HMAC secret".to_string()));
                }
                DecodingKey::from_secret(key_material)
            }
            AlgorithmFamily::Rsa => DecodingKey::from_rsa_pem(key_material)
                .map_err(|e| TokenError::InvalidKey(format!("RSA public key: {e}")))?,
            AlgorithmFamily::Ecdsa => DecodingKey::from_ec_pem(key_material)
                .map_err(|e| TokenError::InvalidKey(format!("EC public key: {e}")))?,
        };

        Ok(Self {
            family,
            key,
            leeway_secs,
        })
    }

    /// HMAC verifier with no clock leeway
    pub fn hmac(secret: impl AsRef<[u8]>) -> Self {
        Self {
            family: AlgorithmFamily::Hmac,
            key: DecodingKey::from_secret(secret.as_ref()),
            leeway_secs: 0,
        }
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    pub fn family(&self) -> AlgorithmFamily {
        self.family
    }

    /// `true` only if every check passes
    pub fn verify(&self, token: &str) -> bool {
        self.verify_detailed(token).is_ok()
    }

    /// Verify a credential and return its standard claims.
    ///
    /// Checks, in order: presence, header structure, algorithm family,
    /// signature, then `exp`/`nbf` when present. An optional `Bearer ` prefix
    /// is stripped first.
    pub fn verify_detailed(&self, token: &str) -> Result<VerifiedClaims, TokenError> {
        let token = strip_bearer(token);
        if token.is_empty() {
            return Err(TokenError::MissingToken);
        }

        let header =
            decode_header(token).map_err(|e| TokenError::InvalidTokenFormat(e.to_string()))?;

        if !self.family.contains(header.alg) {
            return Err(TokenError::AlgorithmMismatch {
                expected: self.family.to_string(),
                found: format!("{:?}", header.alg),
            });
        }

        // Signature only; jsonwebtoken skips exp/nbf it cannot read as integers,
        // so the time window is checked below on the decoded claims
        let mut validation = Validation::new(header.alg);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let claims = decode::<VerifiedClaims>(token, &self.key, &validation)
            .map(|data| data.claims)
            .map_err(classify)?;

        let now = get_current_timestamp() as f64;
        let leeway = self.leeway_secs as f64;
        if claims.is_expired(now, leeway) || claims.is_immature(now, leeway) {
            return Err(TokenError::TokenExpired);
        }

        Ok(claims)
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
        _ => TokenError::InvalidTokenFormat(err.to_string()),
    }
}

/// Remove an optional, case-insensitive `Bearer` scheme prefix.
///
/// A bare scheme with nothing after it yields an empty credential.
fn strip_bearer(value: &str) -> &str {
    let value = value.trim();
    match value.get(..6) {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer") => {
            let rest = &value[6..];
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                rest.trim_start()
            } else {
                value
            }
        }
        _ => value,
    }
}
