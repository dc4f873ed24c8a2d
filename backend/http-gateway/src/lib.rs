//! HTTP Gateway Library
//! Re-exports modules for testing and integration

pub mod clients;
pub mod config;
pub mod error;
pub mod middleware;
pub mod proto;
pub mod rest_api;

pub use clients::{boxed_transport, AuthChannel, ServiceClients, Transport};
pub use error::{ErrorTranslator, FieldKey, GatewayError};
pub use rest_api::{configure, GatewayState};
