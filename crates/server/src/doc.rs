use crate::routes::{booking, health, item, request, user};
use utoipa::OpenApi;

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        booking::create_booking,
        booking::change_status,
        booking::get_booking_by_id,
        booking::get_by_booker,
        booking::get_by_owner,
        item::get_items,
        item::get_item_by_id,
        item::create_item,
        item::update_item,
        item::search_items,
        item::add_comment,
        user::get_users,
        user::get_user_by_id,
        user::create_user,
        user::update_user,
        user::delete_user,
        request::create_request,
        request::get_own_requests,
        request::get_all_requests,
        request::get_request_by_id
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Bookings", description = "Booking lifecycle and listings"),
        (name = "Items", description = "Item catalog and comments"),
        (name = "Users", description = "User directory"),
        (name = "Requests", description = "Requests for items not yet listed"),
    ),
    info(
        title = "Item Sharing API",
        version = "1.0.0",
        description = "Item sharing service: list items, book them, approve bookings",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;
