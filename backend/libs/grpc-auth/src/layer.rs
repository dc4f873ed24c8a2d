//! Outbound authentication layer
//!
//! Wraps the gRPC channel every backend client is built on. The operation
//! identifier is the request URI path (`/<package>.<Service>/<Method>`), which
//! is exactly what tonic puts on the wire.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tonic::codegen::http::Request;
use tonic::codegen::StdError;
use tonic::Status;
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::claims::VerifiedClaims;
use crate::policy::AccessPolicy;
use crate::verifier::TokenVerifier;

/// Metadata key carrying the bearer credential
pub const AUTHORIZATION_KEY: &str = "authorization";

/// Tower layer enforcing the access policy on outbound calls
#[derive(Clone, Debug)]
pub struct AuthLayer {
    policy: Arc<AccessPolicy>,
    verifier: Arc<TokenVerifier>,
}

impl AuthLayer {
    pub fn new(policy: Arc<AccessPolicy>, verifier: Arc<TokenVerifier>) -> Self {
        Self { policy, verifier }
    }

    /// Decide whether a call to `operation` carrying `credential` may proceed.
    ///
    /// Returns `Ok(None)` for public operations, `Ok(Some(claims))` for a
    /// verified credential, and `Status::unauthenticated` otherwise.
    pub fn authorize(
        &self,
        operation: &str,
        credential: &str,
    ) -> Result<Option<VerifiedClaims>, Status> {
        if self.policy.is_public(operation) {
            debug!(operation, "public operation, credential not required");
            return Ok(None);
        }

        match self.verifier.verify_detailed(credential) {
            Ok(claims) => {
                debug!(operation, subject = claims.subject(), "credential verified");
                Ok(Some(claims))
            }
            Err(err) => {
                warn!(operation, error = %err, "rejecting outbound call");
                Err(Status::unauthenticated(format!(
                    "authentication required: {}",
                    err
                )))
            }
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, service: S) -> Self::Service {
        AuthService {
            inner: service,
            auth: self.clone(),
        }
    }
}

/// Service produced by [`AuthLayer`]
#[derive(Clone, Debug)]
pub struct AuthService<S> {
    inner: S,
    auth: AuthLayer,
}

impl<S, B> Service<Request<B>> for AuthService<S>
where
    S: Service<Request<B>> + Clone,
    S::Future: Send + 'static,
    S::Error: Into<StdError>,
{
    type Response = S::Response;
    type Error = StdError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let credential = req
            .headers()
            .get(AUTHORIZATION_KEY)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        match self.auth.authorize(req.uri().path(), credential) {
            Ok(claims) => {
                if let Some(claims) = claims {
                    req.extensions_mut().insert(claims);
                }

                // Hand the ready service to this call, keep a fresh clone
                let clone = self.inner.clone();
                let mut inner = std::mem::replace(&mut self.inner, clone);
                let fut = inner.call(req);
                Box::pin(async move { fut.await.map_err(Into::into) })
            }
            // tonic recovers the Status from the boxed error unchanged
            Err(status) => Box::pin(async move { Err(Box::new(status) as StdError) }),
        }
    }
}
