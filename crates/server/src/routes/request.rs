use crate::dtos::item::PageParams;
use crate::dtos::request::{RequestCreateRequest, RequestResponse};
use crate::error::{ApiError, ErrorResponse};
use crate::extract::SharerId;
use crate::routes::item::to_item_response;
use axum::{
    Json,
    extract::{Path, Query},
};
use database::db::create_connection;
use database::services::clock::SystemClock;
use database::services::request::{ItemRequestService, RequestView};
use uuid::Uuid;

/// Ask for an item nobody has listed yet
#[utoipa::path(
    post,
    path = "/requests",
    request_body = RequestCreateRequest,
    responses(
        (status = 200, description = "Request created", body = RequestResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Requests"
)]
pub async fn create_request(
    SharerId(user_id): SharerId,
    Json(body): Json<RequestCreateRequest>,
) -> Result<Json<RequestResponse>, ApiError> {
    let db = create_connection().await?;

    let request =
        ItemRequestService::create(&db, &SystemClock, user_id, body.description).await?;

    Ok(Json(RequestResponse {
        id: request.id.to_string(),
        description: request.description,
        created: request.created,
        items: vec![],
    }))
}

/// The caller's own requests with matching items
#[utoipa::path(
    get,
    path = "/requests",
    responses(
        (status = 200, description = "Requests retrieved", body = [RequestResponse]),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Requests"
)]
pub async fn get_own_requests(
    SharerId(user_id): SharerId,
) -> Result<Json<Vec<RequestResponse>>, ApiError> {
    let db = create_connection().await?;

    let views = ItemRequestService::get_own(&db, user_id).await?;
    Ok(Json(views.into_iter().map(to_request_response).collect()))
}

/// Other users' requests, newest first
#[utoipa::path(
    get,
    path = "/requests/all",
    params(PageParams),
    responses(
        (status = 200, description = "Requests retrieved", body = [RequestResponse]),
        (status = 400, description = "Invalid page window", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Requests"
)]
pub async fn get_all_requests(
    SharerId(user_id): SharerId,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<RequestResponse>>, ApiError> {
    if params.size == 0 {
        return Err(ApiError::bad_request("size must be positive"));
    }
    let db = create_connection().await?;

    let views = ItemRequestService::get_all(&db, user_id, params.from, params.size).await?;
    Ok(Json(views.into_iter().map(to_request_response).collect()))
}

/// Get one request with matching items
#[utoipa::path(
    get,
    path = "/requests/{request_id}",
    params(
        ("request_id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request found", body = RequestResponse),
        (status = 404, description = "User or request not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Requests"
)]
pub async fn get_request_by_id(
    SharerId(user_id): SharerId,
    Path(request_id): Path<Uuid>,
) -> Result<Json<RequestResponse>, ApiError> {
    let db = create_connection().await?;

    let view = ItemRequestService::get_by_id(&db, user_id, request_id).await?;
    Ok(Json(to_request_response(view)))
}

fn to_request_response(view: RequestView) -> RequestResponse {
    RequestResponse {
        id: view.request.id.to_string(),
        description: view.request.description,
        created: view.request.created,
        items: view.items.into_iter().map(to_item_response).collect(),
    }
}
