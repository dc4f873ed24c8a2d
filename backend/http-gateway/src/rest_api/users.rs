//! User API endpoints
//!
//! POST /v1/users/login - Exchange credentials for a token (public)
//! POST /v1/users - Register a user (public)
//! GET /v1/users/{id} - Get a user
//! PUT /v1/users/{id} - Update a user
//! DELETE /v1/users/{id} - Delete a user

use actix_web::{web, HttpRequest, HttpResponse};
use tracing::info;

use super::{outbound_request, respond, GatewayState};
use crate::proto::user::{
    operations, CreateUserRequest, DeleteUserRequest, GetUserRequest, LoginRequest,
    UpdateUserRequest,
};

pub async fn login(
    req: HttpRequest,
    state: web::Data<GatewayState>,
    body: web::Json<LoginRequest>,
) -> HttpResponse {
    info!("POST /v1/users/login");

    let request = outbound_request(&req, body.into_inner());
    let result = state.clients.users().login(request).await;
    respond(&state, operations::LOGIN, result)
}

pub async fn create_user(
    req: HttpRequest,
    state: web::Data<GatewayState>,
    body: web::Json<CreateUserRequest>,
) -> HttpResponse {
    info!("POST /v1/users");

    let request = outbound_request(&req, body.into_inner());
    let result = state.clients.users().create_user(request).await;
    respond(&state, operations::CREATE_USER, result)
}

pub async fn get_user(
    req: HttpRequest,
    state: web::Data<GatewayState>,
    path: web::Path<i64>,
) -> HttpResponse {
    let id = path.into_inner();
    info!(user_id = id, "GET /v1/users/{{id}}");

    let request = outbound_request(&req, GetUserRequest { id });
    let result = state.clients.users().get_user(request).await;
    respond(&state, operations::GET_USER, result)
}

pub async fn update_user(
    req: HttpRequest,
    state: web::Data<GatewayState>,
    path: web::Path<i64>,
    body: web::Json<UpdateUserRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    info!(user_id = id, "PUT /v1/users/{{id}}");

    // Path wins over any id in the body
    let message = UpdateUserRequest {
        id,
        ..body.into_inner()
    };
    let request = outbound_request(&req, message);
    let result = state.clients.users().update_user(request).await;
    respond(&state, operations::UPDATE_USER, result)
}

pub async fn delete_user(
    req: HttpRequest,
    state: web::Data<GatewayState>,
    path: web::Path<i64>,
) -> HttpResponse {
    let id = path.into_inner();
    info!(user_id = id, "DELETE /v1/users/{{id}}");

    let request = outbound_request(&req, DeleteUserRequest { id });
    let result = state.clients.users().delete_user(request).await;
    respond(&state, operations::DELETE_USER, result)
}
