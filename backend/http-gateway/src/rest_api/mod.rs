/// REST API Module
///
/// Transcodes HTTP/JSON requests into unary gRPC calls on the user and post
/// backends and renders replies (or failures) back as JSON.
///
/// Architecture:
/// ```text
/// Client (HTTP/JSON)
///     ↓
/// REST handler (this module)
///     ↓
/// AuthLayer → gRPC channel → backend
/// ```
pub mod posts;
pub mod users;

use actix_web::error::{InternalError, JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use grpc_auth::AUTHORIZATION_KEY;
use serde::Serialize;
use tonic::metadata::MetadataValue;
use tonic::Status;
use tracing::{error, warn};

use crate::clients::ServiceClients;
use crate::error::{http_status_from_code, ErrorTranslator, GatewayError};

/// Per-worker application state
#[derive(Clone)]
pub struct GatewayState {
    pub clients: ServiceClients,
    pub translator: ErrorTranslator,
}

impl GatewayState {
    pub fn new(clients: ServiceClients, translator: ErrorTranslator) -> Self {
        Self {
            clients,
            translator,
        }
    }
}

/// Register every route plus the extractor error handlers
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .route("/health", web::get().to(health))
        .service(
            web::scope("/v1")
                .route("/users/login", web::post().to(users::login))
                .route("/users", web::post().to(users::create_user))
                .route("/users/{id}", web::get().to(users::get_user))
                .route("/users/{id}", web::put().to(users::update_user))
                .route("/users/{id}", web::delete().to(users::delete_user))
                .route("/posts", web::get().to(posts::get_posts))
                .route("/posts", web::post().to(posts::create_post))
                .route("/posts/{id}", web::get().to(posts::get_post))
                .route("/posts/{id}", web::put().to(posts::update_post))
                .route("/posts/{id}", web::delete().to(posts::delete_post)),
        )
        .default_service(web::to(route_not_found));
}

async fn health() -> &'static str {
    "ok"
}

async fn route_not_found(req: HttpRequest) -> HttpResponse {
    warn!(method = %req.method(), path = %req.path(), "No route matched");
    translator(&req).render(&GatewayError::RouteNotFound)
}

/// Wrap `message` for the backend, forwarding the caller's credential
pub(crate) fn outbound_request<T>(req: &HttpRequest, message: T) -> tonic::Request<T> {
    let mut request = tonic::Request::new(message);

    let credential = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| MetadataValue::try_from(value).ok());
    if let Some(value) = credential {
        request.metadata_mut().insert(AUTHORIZATION_KEY, value);
    }

    request
}

/// Reply as JSON, or translate the failure
pub(crate) fn respond<T: Serialize>(
    state: &GatewayState,
    operation: &str,
    result: Result<tonic::Response<T>, Status>,
) -> HttpResponse {
    match result {
        Ok(reply) => HttpResponse::Ok().json(reply.into_inner()),
        Err(status) => {
            if http_status_from_code(status.code()).is_server_error() {
                error!(operation, code = ?status.code(), error = %status.message(), "Backend call failed");
            } else {
                warn!(operation, code = ?status.code(), error = %status.message(), "Backend call rejected");
            }
            state.translator.render(&GatewayError::Backend(status))
        }
    }
}

fn translator(req: &HttpRequest) -> ErrorTranslator {
    req.app_data::<web::Data<GatewayState>>()
        .map(|state| state.translator.clone())
        .unwrap_or_default()
}

fn transcoding_error<E>(err: E, req: &HttpRequest) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    warn!(path = %req.path(), error = %err, "Request could not be transcoded");
    let response = translator(req).render(&GatewayError::invalid_request(err.to_string()));
    InternalError::from_response(err, response).into()
}

fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    transcoding_error(err, req)
}

fn path_error_handler(err: PathError, req: &HttpRequest) -> actix_web::Error {
    transcoding_error(err, req)
}

fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    transcoding_error(err, req)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_outbound_request_forwards_authorization() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();

        let request = outbound_request(&req, ());

        assert_eq!(
            request
                .metadata()
                .get(AUTHORIZATION_KEY)
                .and_then(|v| v.to_str().ok()),
            Some("Bearer abc.def.ghi")
        );
    }

    #[test]
    fn test_outbound_request_without_authorization() {
        let req = TestRequest::default().to_http_request();

        let request = outbound_request(&req, ());

        assert!(request.metadata().get(AUTHORIZATION_KEY).is_none());
    }
}
