//! gRPC failure -> HTTP error response
//!
//! Body shape: `{"details": [{"description": .., "field": ..}], "error": ..}`
//! followed by a newline. Keys are emitted in sorted order, the order
//! existing clients already receive.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use bytes::Bytes;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use tonic::{Code, Status};
use tracing::error;

use super::details::{field_violations, Violation};
use super::GatewayError;

/// Written when the encoder fails; the already computed status is kept
pub const FALLBACK_BODY: &str = r#"{"error": "failed to marshal error message"}"#;

const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP status for a gRPC code
pub fn http_status_from_code(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::OK,
        Code::Cancelled => StatusCode::REQUEST_TIMEOUT,
        Code::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        Code::InvalidArgument => StatusCode::BAD_REQUEST,
        Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::AlreadyExists => StatusCode::CONFLICT,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
        Code::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
        Code::FailedPrecondition => StatusCode::BAD_REQUEST,
        Code::Aborted => StatusCode::CONFLICT,
        Code::OutOfRange => StatusCode::BAD_REQUEST,
        Code::Unimplemented => StatusCode::NOT_IMPLEMENTED,
        Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        Code::DataLoss => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Key naming the offending field inside each detail entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKey {
    #[default]
    Field,
    /// Misspelled key older clients depend on
    Legacy,
}

impl FieldKey {
    pub fn from_legacy_flag(legacy: bool) -> Self {
        if legacy {
            FieldKey::Legacy
        } else {
            FieldKey::Field
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Field => "field",
            FieldKey::Legacy => "feild",
        }
    }
}

/// Error envelope handed to an [`ErrorEncoder`]
#[derive(Debug, Clone, Copy)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
    pub details: &'a [Violation],
    pub field_key: FieldKey,
}

struct DetailEntry<'a> {
    violation: &'a Violation,
    field_key: FieldKey,
}

impl Serialize for DetailEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("description", &self.violation.description)?;
        map.serialize_entry(self.field_key.as_str(), &self.violation.field)?;
        map.end()
    }
}

struct Details<'a>(&'a ErrorBody<'a>);

impl Serialize for Details<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.details.len()))?;
        for violation in self.0.details {
            seq.serialize_element(&DetailEntry {
                violation,
                field_key: self.0.field_key,
            })?;
        }
        seq.end()
    }
}

impl Serialize for ErrorBody<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("details", &Details(self))?;
        map.serialize_entry("error", self.error)?;
        map.end()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to encode error body: {0}")]
pub struct EncodeError(pub String);

/// Serializes the error envelope
pub trait ErrorEncoder: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn encode(&self, body: &ErrorBody<'_>) -> Result<Vec<u8>, EncodeError>;
}

/// Default encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl ErrorEncoder for JsonEncoder {
    fn content_type(&self) -> &'static str {
        JSON_CONTENT_TYPE
    }

    fn encode(&self, body: &ErrorBody<'_>) -> Result<Vec<u8>, EncodeError> {
        serde_json::to_vec(body).map_err(|e| EncodeError(e.to_string()))
    }
}

/// A fully rendered HTTP error
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedError {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Bytes,
}

impl TranslatedError {
    pub fn into_response(self) -> HttpResponse {
        HttpResponse::build(self.status)
            .content_type(self.content_type)
            .body(self.body)
    }
}

/// Turns gRPC failures into HTTP responses. Stateless apart from its settings.
#[derive(Clone)]
pub struct ErrorTranslator {
    encoder: Arc<dyn ErrorEncoder>,
    field_key: FieldKey,
}

impl Default for ErrorTranslator {
    fn default() -> Self {
        Self::new(FieldKey::default())
    }
}

impl std::fmt::Debug for ErrorTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorTranslator")
            .field("content_type", &self.encoder.content_type())
            .field("field_key", &self.field_key)
            .finish()
    }
}

impl ErrorTranslator {
    pub fn new(field_key: FieldKey) -> Self {
        Self::with_encoder(Arc::new(JsonEncoder), field_key)
    }

    pub fn with_encoder(encoder: Arc<dyn ErrorEncoder>, field_key: FieldKey) -> Self {
        Self { encoder, field_key }
    }

    pub fn translate(&self, code: Code, message: &str, violations: &[Violation]) -> TranslatedError {
        let status = http_status_from_code(code);
        let body = ErrorBody {
            error: message,
            details: violations,
            field_key: self.field_key,
        };

        match self.encoder.encode(&body) {
            Ok(mut encoded) => {
                encoded.push(b'\n');
                TranslatedError {
                    status,
                    content_type: self.encoder.content_type(),
                    body: Bytes::from(encoded),
                }
            }
            Err(e) => {
                error!(error = %e, code = ?code, "Failed to encode error body, using fallback");
                TranslatedError {
                    status,
                    content_type: self.encoder.content_type(),
                    body: Bytes::from_static(FALLBACK_BODY.as_bytes()),
                }
            }
        }
    }

    pub fn translate_status(&self, status: &Status) -> TranslatedError {
        self.translate(status.code(), status.message(), &field_violations(status))
    }

    pub fn translate_error(&self, err: &GatewayError) -> TranslatedError {
        match err {
            GatewayError::Backend(status) => self.translate_status(status),
            other => self.translate(other.code(), &other.message(), other.violations()),
        }
    }

    pub fn render(&self, err: &GatewayError) -> HttpResponse {
        self.translate_error(err).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::details::status_with_violations;

    struct FailingEncoder;

    impl ErrorEncoder for FailingEncoder {
        fn content_type(&self) -> &'static str {
            JSON_CONTENT_TYPE
        }

        fn encode(&self, _body: &ErrorBody<'_>) -> Result<Vec<u8>, EncodeError> {
            Err(EncodeError("encoder offline".to_string()))
        }
    }

    fn body_json(translated: &TranslatedError) -> serde_json::Value {
        serde_json::from_slice(&translated.body).unwrap()
    }

    #[test]
    fn test_code_mapping() {
        let cases = [
            (Code::Ok, 200),
            (Code::Cancelled, 408),
            (Code::Unknown, 500),
            (Code::InvalidArgument, 400),
            (Code::DeadlineExceeded, 504),
            (Code::NotFound, 404),
            (Code::AlreadyExists, 409),
            (Code::PermissionDenied, 403),
            (Code::Unauthenticated, 401),
            (Code::ResourceExhausted, 429),
            (Code::FailedPrecondition, 400),
            (Code::Aborted, 409),
            (Code::OutOfRange, 400),
            (Code::Unimplemented, 501),
            (Code::Internal, 500),
            (Code::Unavailable, 503),
            (Code::DataLoss, 500),
        ];

        for (code, expected) in cases {
            assert_eq!(http_status_from_code(code).as_u16(), expected, "{:?}", code);
        }
    }

    #[test]
    fn test_out_of_range_code_is_internal_error() {
        // tonic folds unknown numeric codes into Code::Unknown
        assert_eq!(
            http_status_from_code(Code::from_i32(42)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_argument_with_violations() {
        let status = status_with_violations(
            Code::InvalidArgument,
            "invalid post",
            &[
                Violation::new("title", "required"),
                Violation::new("body", "too long"),
            ],
        );

        let translated = ErrorTranslator::default().translate_status(&status);

        assert_eq!(translated.status, StatusCode::BAD_REQUEST);
        assert_eq!(translated.content_type, "application/json");
        assert_eq!(
            body_json(&translated),
            serde_json::json!({
                "error": "invalid post",
                "details": [
                    {"field": "title", "description": "required"},
                    {"field": "body", "description": "too long"},
                ]
            })
        );
    }

    #[test]
    fn test_exact_bytes() {
        let translated = ErrorTranslator::default().translate(
            Code::InvalidArgument,
            "bad",
            &[Violation::new("title", "required")],
        );

        assert_eq!(
            translated.body,
            Bytes::from_static(
                b"{\"details\":[{\"description\":\"required\",\"field\":\"title\"}],\"error\":\"bad\"}\n"
            )
        );
    }

    #[test]
    fn test_not_found_without_details() {
        let translated =
            ErrorTranslator::default().translate_status(&Status::not_found("no such post"));

        assert_eq!(translated.status, StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(&translated),
            serde_json::json!({"error": "no such post", "details": []})
        );
    }

    #[test]
    fn test_translation_is_deterministic() {
        let status = status_with_violations(
            Code::InvalidArgument,
            "invalid post",
            &[Violation::new("title", "required")],
        );
        let translator = ErrorTranslator::default();

        assert_eq!(
            translator.translate_status(&status),
            translator.translate_status(&status)
        );
    }

    #[test]
    fn test_failing_encoder_writes_fallback() {
        let translator = ErrorTranslator::with_encoder(Arc::new(FailingEncoder), FieldKey::Field);

        let translated = translator.translate_status(&Status::permission_denied("nope"));

        assert_eq!(translated.status, StatusCode::FORBIDDEN);
        assert_eq!(translated.body, Bytes::from_static(FALLBACK_BODY.as_bytes()));
    }

    #[test]
    fn test_legacy_field_key() {
        let translator = ErrorTranslator::new(FieldKey::from_legacy_flag(true));

        let translated = translator.translate(
            Code::InvalidArgument,
            "bad",
            &[Violation::new("email", "invalid")],
        );

        assert_eq!(
            body_json(&translated),
            serde_json::json!({
                "error": "bad",
                "details": [{"feild": "email", "description": "invalid"}]
            })
        );
    }

    #[test]
    fn test_gateway_errors_render() {
        let translator = ErrorTranslator::default();

        let not_found = translator.translate_error(&GatewayError::RouteNotFound);
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);

        let invalid = translator.translate_error(&GatewayError::invalid_request("Json deserialize error"));
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(&invalid)["error"],
            serde_json::json!("Json deserialize error")
        );
    }
}
