//! Structured error details carried by a backend `Status`
//!
//! Backends attach a serialized `google.rpc.Status` to the
//! `grpc-status-details-bin` trailer. Only `google.rpc.BadRequest` is
//! understood; every other detail kind is skipped.

use bytes::Bytes;
use prost::Message;
use prost_types::Any;
use tonic::{Code, Status};
use tracing::debug;

use crate::proto::rpc::{
    bad_request::FieldViolation, BadRequest, Status as RpcStatus, BAD_REQUEST_TYPE_URL,
};

/// One offending field of a rejected request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub description: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            description: description.into(),
        }
    }
}

impl From<FieldViolation> for Violation {
    fn from(v: FieldViolation) -> Self {
        Self {
            field: v.field,
            description: v.description,
        }
    }
}

/// A decoded status detail
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDetail {
    BadRequest(BadRequest),
    Unrecognized { type_url: String },
}

impl ErrorDetail {
    /// Decode one `Any`; `None` when a known kind carries a corrupt payload
    pub fn from_any(any: &Any) -> Option<Self> {
        if any.type_url == BAD_REQUEST_TYPE_URL {
            match BadRequest::decode(any.value.as_slice()) {
                Ok(bad_request) => Some(ErrorDetail::BadRequest(bad_request)),
                Err(e) => {
                    debug!(error = %e, "skipping undecodable BadRequest detail");
                    None
                }
            }
        } else {
            Some(ErrorDetail::Unrecognized {
                type_url: any.type_url.clone(),
            })
        }
    }
}

/// All details attached to `status`, in order
pub fn decode_details(status: &Status) -> Vec<ErrorDetail> {
    if status.details().is_empty() {
        return Vec::new();
    }

    match RpcStatus::decode(status.details()) {
        Ok(rpc_status) => rpc_status
            .details
            .iter()
            .filter_map(ErrorDetail::from_any)
            .collect(),
        Err(e) => {
            debug!(error = %e, "ignoring undecodable status details");
            Vec::new()
        }
    }
}

/// Field violations of every `BadRequest` detail, flattened in order
pub fn field_violations(status: &Status) -> Vec<Violation> {
    decode_details(status)
        .into_iter()
        .flat_map(|detail| match detail {
            ErrorDetail::BadRequest(bad_request) => bad_request.field_violations,
            ErrorDetail::Unrecognized { .. } => Vec::new(),
        })
        .map(Violation::from)
        .collect()
}

/// Build a `Status` carrying one `BadRequest` detail, as a backend would
pub fn status_with_violations(
    code: Code,
    message: impl Into<String>,
    violations: &[Violation],
) -> Status {
    let message = message.into();
    let bad_request = BadRequest {
        field_violations: violations
            .iter()
            .map(|v| FieldViolation {
                field: v.field.clone(),
                description: v.description.clone(),
            })
            .collect(),
    };
    let rpc_status = RpcStatus {
        code: code as i32,
        message: message.clone(),
        details: vec![Any {
            type_url: BAD_REQUEST_TYPE_URL.to_string(),
            value: bad_request.encode_to_vec(),
        }],
    };

    Status::with_details(code, message, Bytes::from(rpc_status.encode_to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violations_flattened_in_order() {
        let status = status_with_violations(
            Code::InvalidArgument,
            "invalid post",
            &[
                Violation::new("title", "required"),
                Violation::new("body", "too long"),
            ],
        );

        assert_eq!(
            field_violations(&status),
            vec![
                Violation::new("title", "required"),
                Violation::new("body", "too long"),
            ]
        );
    }

    #[test]
    fn test_status_without_details() {
        let status = Status::not_found("no such post");

        assert!(decode_details(&status).is_empty());
        assert!(field_violations(&status).is_empty());
    }

    #[test]
    fn test_unrecognized_detail_ignored() {
        let rpc_status = RpcStatus {
            code: Code::FailedPrecondition as i32,
            message: "precondition".to_string(),
            details: vec![
                Any {
                    type_url: "type.googleapis.com/google.rpc.RetryInfo".to_string(),
                    value: vec![0x0a, 0x02, 0x08, 0x05],
                },
                Any {
                    type_url: BAD_REQUEST_TYPE_URL.to_string(),
                    value: BadRequest {
                        field_violations: vec![FieldViolation {
                            field: "email".to_string(),
                            description: "taken".to_string(),
                        }],
                    }
                    .encode_to_vec(),
                },
            ],
        };
        let status = Status::with_details(
            Code::FailedPrecondition,
            "precondition",
            Bytes::from(rpc_status.encode_to_vec()),
        );

        let details = decode_details(&status);
        assert_eq!(details.len(), 2);
        assert!(matches!(details[0], ErrorDetail::Unrecognized { .. }));
        assert_eq!(field_violations(&status), vec![Violation::new("email", "taken")]);
    }

    #[test]
    fn test_garbage_details_ignored() {
        let status = Status::with_details(
            Code::InvalidArgument,
            "bad",
            Bytes::from_static(&[0xff, 0xff, 0xff]),
        );

        assert!(field_violations(&status).is_empty());
    }
}
