//! Gateway errors and their HTTP rendering

pub mod details;
pub mod translator;

pub use details::{field_violations, status_with_violations, ErrorDetail, Violation};
pub use translator::{
    http_status_from_code, EncodeError, ErrorBody, ErrorEncoder, ErrorTranslator, FieldKey,
    JsonEncoder, TranslatedError, FALLBACK_BODY,
};

use thiserror::Error;
use tonic::{Code, Status};

/// Everything a request can fail with after routing
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Backend reply, or a gateway-side rejection from the auth layer
    #[error("backend call failed: {0}")]
    Backend(#[from] Status),

    /// Request could not be transcoded (bad JSON body, path or query)
    #[error("invalid request: {message}")]
    InvalidRequest {
        message: String,
        violations: Vec<Violation>,
    },

    #[error("route not found")]
    RouteNotFound,
}

impl GatewayError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        GatewayError::InvalidRequest {
            message: message.into(),
            violations: Vec::new(),
        }
    }

    pub fn code(&self) -> Code {
        match self {
            GatewayError::Backend(status) => status.code(),
            GatewayError::InvalidRequest { .. } => Code::InvalidArgument,
            GatewayError::RouteNotFound => Code::NotFound,
        }
    }

    /// Text placed in the `error` member of the body
    pub fn message(&self) -> String {
        match self {
            GatewayError::Backend(status) => status.message().to_string(),
            GatewayError::InvalidRequest { message, .. } => message.clone(),
            GatewayError::RouteNotFound => "Not Found".to_string(),
        }
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            GatewayError::InvalidRequest { violations, .. } => violations,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_keeps_status() {
        let err = GatewayError::from(Status::already_exists("email taken"));

        assert_eq!(err.code(), Code::AlreadyExists);
        assert_eq!(err.message(), "email taken");
        assert!(err.violations().is_empty());
    }

    #[test]
    fn test_local_error_codes() {
        assert_eq!(GatewayError::RouteNotFound.code(), Code::NotFound);
        assert_eq!(
            GatewayError::invalid_request("bad id").code(),
            Code::InvalidArgument
        );
    }
}
