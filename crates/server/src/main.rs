use axum::{
    Router,
    routing::{get, patch, post},
};
use log::info;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod doc;
mod dtos;
mod error;
mod extract;
mod routes;
mod utils;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/bookings",
            post(routes::booking::create_booking).get(routes::booking::get_by_booker),
        )
        .route("/bookings/owner", get(routes::booking::get_by_owner))
        .route(
            "/bookings/{booking_id}",
            patch(routes::booking::change_status).get(routes::booking::get_booking_by_id),
        )
        .route(
            "/items",
            get(routes::item::get_items).post(routes::item::create_item),
        )
        .route("/items/search", get(routes::item::search_items))
        .route(
            "/items/{item_id}",
            get(routes::item::get_item_by_id).patch(routes::item::update_item),
        )
        .route("/items/{item_id}/comment", post(routes::item::add_comment))
        .route(
            "/users",
            get(routes::user::get_users).post(routes::user::create_user),
        )
        .route(
            "/users/{user_id}",
            get(routes::user::get_user_by_id)
                .patch(routes::user::update_user)
                .delete(routes::user::delete_user),
        )
        .route(
            "/requests",
            post(routes::request::create_request).get(routes::request::get_own_requests),
        )
        .route("/requests/all", get(routes::request::get_all_requests))
        .route(
            "/requests/{request_id}",
            get(routes::request::get_request_by_id),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::ApiDoc::openapi()))
        .layer(ServiceBuilder::new().layer(CompressionLayer::new()));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Running axum on http://localhost:3000");

    axum::serve(listener, app)
        .with_graceful_shutdown(utils::shutdown::shutdown_signal())
        .await
        .unwrap();
}
