use thiserror::Error;

/// Why a credential was not accepted.
///
/// Every variant except `InvalidKey` is routine client input and ends up as
/// `Status::unauthenticated` for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("missing token")]
    MissingToken,

    #[error("invalid token format: {0}")]
    InvalidTokenFormat(String),

    #[error("algorithm {found} not allowed, expected {expected}")]
    AlgorithmMismatch { expected: String, found: String },

    #[error("signature invalid")]
    SignatureInvalid,

    #[error("token expired or not yet valid")]
    TokenExpired,

    /// Key material could not be parsed at construction time
    #[error("invalid verification key: {0}")]
    InvalidKey(String),
}
