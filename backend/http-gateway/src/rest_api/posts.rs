//! Post API endpoints
//!
//! GET /v1/posts - List posts (public)
//! GET /v1/posts/{id} - Get a specific post
//! POST /v1/posts - Create a new post
//! PUT /v1/posts/{id} - Update a post
//! DELETE /v1/posts/{id} - Delete a post

use actix_web::{web, HttpRequest, HttpResponse};
use tracing::info;

use super::{outbound_request, respond, GatewayState};
use crate::proto::post::{
    operations, CreatePostRequest, DeletePostRequest, GetPostRequest, GetPostsRequest,
    UpdatePostRequest,
};

pub async fn get_posts(
    req: HttpRequest,
    state: web::Data<GatewayState>,
    query: web::Query<GetPostsRequest>,
) -> HttpResponse {
    let query = query.into_inner();
    info!(
        limit = query.limit,
        offset = query.offset,
        user_id = query.user_id,
        "GET /v1/posts"
    );

    let request = outbound_request(&req, query);
    let result = state.clients.posts().get_posts(request).await;
    respond(&state, operations::GET_POSTS, result)
}

pub async fn get_post(
    req: HttpRequest,
    state: web::Data<GatewayState>,
    path: web::Path<i64>,
) -> HttpResponse {
    let id = path.into_inner();
    info!(post_id = id, "GET /v1/posts/{{id}}");

    let request = outbound_request(&req, GetPostRequest { id });
    let result = state.clients.posts().get_post(request).await;
    respond(&state, operations::GET_POST, result)
}

pub async fn create_post(
    req: HttpRequest,
    state: web::Data<GatewayState>,
    body: web::Json<CreatePostRequest>,
) -> HttpResponse {
    info!("POST /v1/posts");

    let request = outbound_request(&req, body.into_inner());
    let result = state.clients.posts().create_post(request).await;
    respond(&state, operations::CREATE_POST, result)
}

pub async fn update_post(
    req: HttpRequest,
    state: web::Data<GatewayState>,
    path: web::Path<i64>,
    body: web::Json<UpdatePostRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    info!(post_id = id, "PUT /v1/posts/{{id}}");

    let message = UpdatePostRequest {
        id,
        ..body.into_inner()
    };
    let request = outbound_request(&req, message);
    let result = state.clients.posts().update_post(request).await;
    respond(&state, operations::UPDATE_POST, result)
}

pub async fn delete_post(
    req: HttpRequest,
    state: web::Data<GatewayState>,
    path: web::Path<i64>,
) -> HttpResponse {
    let id = path.into_inner();
    info!(post_id = id, "DELETE /v1/posts/{{id}}");

    let request = outbound_request(&req, DeletePostRequest { id });
    let result = state.clients.posts().delete_post(request).await;
    respond(&state, operations::DELETE_POST, result)
}
