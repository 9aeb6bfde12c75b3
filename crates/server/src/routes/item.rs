use crate::dtos::item::{
    BookingBrief, CommentCreateRequest, CommentResponse, ItemCreateRequest, ItemDetailResponse,
    ItemResponse, ItemUpdateRequest, PageParams, SearchParams,
};
use crate::error::{ApiError, ErrorResponse};
use crate::extract::SharerId;
use axum::{
    Json,
    extract::{Path, Query},
};
use database::db::create_connection;
use database::entities::{bookings, items};
use database::services::clock::SystemClock;
use database::services::item::{CommentWithAuthor, ItemService, ItemView, NewItem, UpdateItem};
use uuid::Uuid;

/// List the caller's own items with booking aggregation and comments
#[utoipa::path(
    get,
    path = "/items",
    params(PageParams),
    responses(
        (status = 200, description = "Items retrieved", body = [ItemDetailResponse]),
        (status = 400, description = "Invalid page window", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Items"
)]
pub async fn get_items(
    SharerId(user_id): SharerId,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<ItemDetailResponse>>, ApiError> {
    if params.size == 0 {
        return Err(ApiError::bad_request("size must be positive"));
    }
    let db = create_connection().await?;

    let views =
        ItemService::find_all(&db, &SystemClock, user_id, params.from, params.size).await?;
    Ok(Json(views.into_iter().map(to_item_detail_response).collect()))
}

/// Get one item. Last/next bookings are only populated for the owner.
#[utoipa::path(
    get,
    path = "/items/{item_id}",
    params(
        ("item_id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item found", body = ItemDetailResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Items"
)]
pub async fn get_item_by_id(
    SharerId(user_id): SharerId,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ItemDetailResponse>, ApiError> {
    let db = create_connection().await?;

    let view = ItemService::find_item(&db, &SystemClock, user_id, item_id).await?;
    Ok(Json(to_item_detail_response(view)))
}

/// List a new item
#[utoipa::path(
    post,
    path = "/items",
    request_body = ItemCreateRequest,
    responses(
        (status = 200, description = "Item created", body = ItemResponse),
        (status = 404, description = "User or request not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Items"
)]
pub async fn create_item(
    SharerId(user_id): SharerId,
    Json(body): Json<ItemCreateRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let db = create_connection().await?;

    let item = ItemService::create(
        &db,
        user_id,
        NewItem {
            name: body.name,
            description: body.description,
            available: body.available,
            request_id: body.request_id,
        },
    )
    .await?;

    Ok(Json(to_item_response(item)))
}

/// Update name, description or availability; owner only
#[utoipa::path(
    patch,
    path = "/items/{item_id}",
    params(
        ("item_id" = Uuid, Path, description = "Item ID")
    ),
    request_body = ItemUpdateRequest,
    responses(
        (status = 200, description = "Item updated", body = ItemResponse),
        (status = 404, description = "Item not found or not owned", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Items"
)]
pub async fn update_item(
    SharerId(user_id): SharerId,
    Path(item_id): Path<Uuid>,
    Json(body): Json<ItemUpdateRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let db = create_connection().await?;

    let item = ItemService::update(
        &db,
        user_id,
        item_id,
        UpdateItem {
            name: body.name,
            description: body.description,
            available: body.available,
        },
    )
    .await?;

    Ok(Json(to_item_response(item)))
}

/// Substring search over available items
#[utoipa::path(
    get,
    path = "/items/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching items", body = [ItemResponse]),
        (status = 400, description = "Invalid page window", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Items"
)]
pub async fn search_items(
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    if params.size == 0 {
        return Err(ApiError::bad_request("size must be positive"));
    }
    let db = create_connection().await?;

    let found = ItemService::search(&db, &params.text, params.from, params.size).await?;
    Ok(Json(found.into_iter().map(to_item_response).collect()))
}

/// Comment on an item after a completed booking
#[utoipa::path(
    post,
    path = "/items/{item_id}/comment",
    params(
        ("item_id" = Uuid, Path, description = "Item ID")
    ),
    request_body = CommentCreateRequest,
    responses(
        (status = 200, description = "Comment added", body = CommentResponse),
        (status = 400, description = "No completed booking for this item", body = ErrorResponse),
        (status = 404, description = "User or item not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Items"
)]
pub async fn add_comment(
    SharerId(user_id): SharerId,
    Path(item_id): Path<Uuid>,
    Json(body): Json<CommentCreateRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    let db = create_connection().await?;

    let comment =
        ItemService::add_comment(&db, &SystemClock, user_id, item_id, body.text).await?;
    Ok(Json(to_comment_response(comment)))
}

pub(crate) fn to_item_response(item: items::Model) -> ItemResponse {
    ItemResponse {
        id: item.id.to_string(),
        name: item.name,
        description: item.description,
        available: item.available,
        request_id: item.request_id.map(|id| id.to_string()),
    }
}

fn to_booking_brief(booking: bookings::Model) -> BookingBrief {
    BookingBrief {
        id: booking.id.to_string(),
        booker_id: booking.booker_id.to_string(),
        start: booking.start_date,
        end: booking.end_date,
        status: booking.status.to_string(),
    }
}

fn to_comment_response(comment: CommentWithAuthor) -> CommentResponse {
    CommentResponse {
        id: comment.comment.id.to_string(),
        text: comment.comment.text,
        author_name: comment.author_name,
        created: comment.comment.created,
    }
}

fn to_item_detail_response(view: ItemView) -> ItemDetailResponse {
    ItemDetailResponse {
        id: view.item.id.to_string(),
        name: view.item.name,
        description: view.item.description,
        available: view.item.available,
        request_id: view.item.request_id.map(|id| id.to_string()),
        last_booking: view.last_booking.map(to_booking_brief),
        next_booking: view.next_booking.map(to_booking_brief),
        comments: view.comments.into_iter().map(to_comment_response).collect(),
    }
}
