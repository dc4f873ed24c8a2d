//! Per-method authentication for outbound gRPC calls
//!
//! This library decides, for every call the gateway makes to a backend service,
//! whether the call may leave the process.
//!
//! ## Core Components
//!
//! - **AccessPolicy**: table of operations callable without a credential
//! - **TokenVerifier**: JWT verification pinned to one algorithm family
//! - **AuthLayer / AuthService**: tower middleware wrapping the outbound channel
//! - **VerifiedClaims**: standard claims of a verified token, stored in request extensions
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use grpc_auth::{AccessPolicy, AuthLayer, TokenVerifier};
//! use tonic::transport::Channel;
//! use tower::ServiceBuilder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = Arc::new(AccessPolicy::default());
//! let verifier = Arc::new(TokenVerifier::hmac(b"signing-key"));
//!
//! let channel = Channel::from_static("http://user:9001").connect_lazy();
//! let channel = ServiceBuilder::new()
//!     .layer(AuthLayer::new(policy, verifier))
//!     .service(channel);
//!
//! // Build any tonic client on top of `channel`
//! # Ok(())
//! # }
//! ```
//!
//! ## Security Guarantees
//!
//! - Operations not listed as public always require a credential
//! - The token header algorithm must belong to the configured family
//! - Rejected calls never reach the inner service
//! - Verification failures are ordinary `Status::unauthenticated` results

mod claims;
mod error;
mod layer;
mod policy;
mod verifier;

pub use claims::VerifiedClaims;
pub use error::TokenError;
pub use layer::{AuthLayer, AuthService, AUTHORIZATION_KEY};
pub use policy::{AccessPolicy, DEFAULT_PUBLIC_OPERATIONS};
pub use verifier::{AlgorithmFamily, TokenVerifier};

// Re-export tonic Status for convenience
pub use tonic::Status;
