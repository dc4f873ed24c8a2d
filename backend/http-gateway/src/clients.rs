//! gRPC backend clients
//!
//! ## Key points:
//! - One lazily connected `Channel` per backend, HTTP/2 multiplexing handles concurrency
//! - Connect and per-request timeouts from configuration
//! - Every channel is wrapped in `AuthLayer` here and nowhere else, so no client
//!   can be built without the outbound authentication check

use std::time::Duration;

use anyhow::{Context, Result};
use grpc_auth::{AuthLayer, AuthService};
use tonic::body::BoxBody;
use tonic::codegen::http::{Request, Response};
use tonic::codegen::{Body, Bytes, StdError};
use tonic::transport::{Channel, Endpoint};
use tower::util::BoxCloneService;
use tower::{Layer, Service, ServiceExt};
use tracing::info;

use crate::config::ServiceEndpoints;
use crate::proto::post::post_service_client::PostServiceClient;
use crate::proto::user::user_service_client::UserServiceClient;

/// Type-erased transport under the auth layer (a tonic `Channel` in production)
pub type Transport = BoxCloneService<Request<BoxBody>, Response<BoxBody>, StdError>;

/// Transport with the outbound authentication check applied
pub type AuthChannel = AuthService<Transport>;

/// Erase any gRPC-capable HTTP service into a [`Transport`]
pub fn boxed_transport<T, RB>(transport: T) -> Transport
where
    T: Service<Request<BoxBody>, Response = Response<RB>> + Clone + Send + 'static,
    T::Future: Send + 'static,
    T::Error: Into<StdError>,
    RB: Body<Data = Bytes> + Send + 'static,
    RB::Error: Into<StdError>,
{
    BoxCloneService::new(
        transport
            .map_response(|response: Response<RB>| response.map(tonic::body::boxed))
            .map_err(Into::into),
    )
}

/// Clients for every backend the gateway exposes
#[derive(Clone)]
pub struct ServiceClients {
    users: UserServiceClient<AuthChannel>,
    posts: PostServiceClient<AuthChannel>,
}

impl ServiceClients {
    /// Build clients on lazily connected channels
    ///
    /// # Configuration:
    /// - **connect_lazy()**: connects on first RPC, backends may start in any order
    /// - **connect_timeout / timeout**: from `ServiceEndpoints`
    /// - **http2_keep_alive_interval(60s)**, **keep_alive_timeout(20s)**
    pub fn connect_lazy(endpoints: &ServiceEndpoints, auth: AuthLayer) -> Result<Self> {
        let users = create_channel(
            &endpoints.user_service,
            endpoints.connect_timeout,
            endpoints.request_timeout,
        )
        .context("Invalid user service endpoint")?;
        let posts = create_channel(
            &endpoints.post_service,
            endpoints.connect_timeout,
            endpoints.request_timeout,
        )
        .context("Invalid post service endpoint")?;

        info!(
            user_service = %endpoints.user_service,
            post_service = %endpoints.post_service,
            "Backend channels configured"
        );

        Ok(Self::from_transports(
            boxed_transport(users),
            boxed_transport(posts),
            auth,
        ))
    }

    pub fn from_transports(users: Transport, posts: Transport, auth: AuthLayer) -> Self {
        Self {
            users: UserServiceClient::new(auth.layer(users)),
            posts: PostServiceClient::new(auth.layer(posts)),
        }
    }

    /// Get a user service client
    ///
    /// Cheap: clones share the underlying channel.
    pub fn users(&self) -> UserServiceClient<AuthChannel> {
        self.users.clone()
    }

    /// Get a post service client
    pub fn posts(&self) -> PostServiceClient<AuthChannel> {
        self.posts.clone()
    }
}

fn create_channel(
    endpoint: &str,
    connect_timeout: Duration,
    request_timeout: Duration,
) -> Result<Channel> {
    let channel = Endpoint::from_shared(endpoint.to_string())
        .with_context(|| format!("malformed endpoint URL '{}'", endpoint))?
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .http2_keep_alive_interval(Duration::from_secs(60))
        .keep_alive_timeout(Duration::from_secs(20))
        .keep_alive_while_idle(true)
        .connect_lazy();
    Ok(channel)
}
