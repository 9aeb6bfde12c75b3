use crate::dtos::booking::{
    ApproveParams, BookingCreateRequest, BookingQueryParams, BookingResponse,
};
use crate::error::{ApiError, ErrorResponse};
use crate::extract::SharerId;
use crate::routes::item::to_item_response;
use crate::routes::user::to_user_response;
use axum::{
    Json,
    extract::{Path, Query},
};
use database::db::create_connection;
use database::error::ServiceError;
use database::services::booking::{BookingService, BookingView, NewBooking};
use database::services::clock::SystemClock;
use models::state_filter::StateFilter;
use uuid::Uuid;

/// Create a booking request for an item
#[utoipa::path(
    post,
    path = "/bookings",
    request_body = BookingCreateRequest,
    responses(
        (status = 200, description = "Booking created in WAITING status", body = BookingResponse),
        (status = 400, description = "Invalid time range or item not available", body = ErrorResponse),
        (status = 404, description = "Item or user not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Bookings"
)]
pub async fn create_booking(
    SharerId(user_id): SharerId,
    Json(body): Json<BookingCreateRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    let db = create_connection().await?;

    let view = BookingService::create(
        &db,
        user_id,
        NewBooking {
            item_id: body.item_id,
            start_date: body.start,
            end_date: body.end,
        },
    )
    .await?;

    Ok(Json(to_booking_response(view)))
}

/// Approve or reject a waiting booking
#[utoipa::path(
    patch,
    path = "/bookings/{booking_id}",
    params(
        ("booking_id" = Uuid, Path, description = "Booking ID"),
        ApproveParams
    ),
    responses(
        (status = 200, description = "Booking decided", body = BookingResponse),
        (status = 400, description = "Booking already decided", body = ErrorResponse),
        (status = 404, description = "Booking not found or not visible", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Bookings"
)]
pub async fn change_status(
    SharerId(user_id): SharerId,
    Path(booking_id): Path<Uuid>,
    Query(params): Query<ApproveParams>,
) -> Result<Json<BookingResponse>, ApiError> {
    let db = create_connection().await?;

    let view = BookingService::change_status(&db, user_id, booking_id, params.approved).await?;
    Ok(Json(to_booking_response(view)))
}

/// Get a booking, visible to its booker and the item's owner
#[utoipa::path(
    get,
    path = "/bookings/{booking_id}",
    params(
        ("booking_id" = Uuid, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Booking found", body = BookingResponse),
        (status = 404, description = "Booking not found or not visible", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Bookings"
)]
pub async fn get_booking_by_id(
    SharerId(user_id): SharerId,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, ApiError> {
    let db = create_connection().await?;

    let view = BookingService::get_booking_info(&db, user_id, booking_id).await?;
    Ok(Json(to_booking_response(view)))
}

/// List the caller's own booking requests, filtered by state
#[utoipa::path(
    get,
    path = "/bookings",
    params(BookingQueryParams),
    responses(
        (status = 200, description = "Bookings retrieved", body = [BookingResponse]),
        (status = 400, description = "Unknown state or invalid page window", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Bookings"
)]
pub async fn get_by_booker(
    SharerId(user_id): SharerId,
    Query(params): Query<BookingQueryParams>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let (state, from, size) = validate_query(&params)?;
    let db = create_connection().await?;

    let views =
        BookingService::get_by_booker(&db, &SystemClock, user_id, state, from, size).await?;
    Ok(Json(views.into_iter().map(to_booking_response).collect()))
}

/// List bookings on the caller's items, filtered by state
#[utoipa::path(
    get,
    path = "/bookings/owner",
    params(BookingQueryParams),
    responses(
        (status = 200, description = "Bookings retrieved", body = [BookingResponse]),
        (status = 400, description = "Unknown state or invalid page window", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Bookings"
)]
pub async fn get_by_owner(
    SharerId(user_id): SharerId,
    Query(params): Query<BookingQueryParams>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let (state, from, size) = validate_query(&params)?;
    let db = create_connection().await?;

    let views = BookingService::get_by_owner(&db, &SystemClock, user_id, state, from, size).await?;
    Ok(Json(views.into_iter().map(to_booking_response).collect()))
}

/// Boundary validation: the state filter is a closed set and the page
/// window needs a positive size
fn validate_query(params: &BookingQueryParams) -> Result<(StateFilter, u64, u64), ApiError> {
    let state = params
        .state
        .parse()
        .map_err(|err: models::state_filter::UnsupportedStateError| {
            ApiError::from(ServiceError::UnsupportedState(err.to_string()))
        })?;

    if params.size == 0 {
        return Err(ApiError::bad_request("size must be positive"));
    }

    Ok((state, params.from, params.size))
}

fn to_booking_response(view: BookingView) -> BookingResponse {
    BookingResponse {
        id: view.booking.id.to_string(),
        start: view.booking.start_date,
        end: view.booking.end_date,
        status: view.booking.status.to_string(),
        booker: to_user_response(view.booker),
        item: to_item_response(view.item),
    }
}
