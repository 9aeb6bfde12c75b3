use crate::dtos::user::{UserCreateRequest, UserResponse, UserUpdateRequest};
use crate::error::{ApiError, ErrorResponse};
use axum::{Json, extract::Path, http::StatusCode};
use database::db::create_connection;
use database::entities::users;
use database::services::user::{NewUser, UpdateUser, UserService};
use uuid::Uuid;

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users retrieved", body = [UserResponse]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users"
)]
pub async fn get_users() -> Result<Json<Vec<UserResponse>>, ApiError> {
    let db = create_connection().await?;

    let found = UserService::get_all(&db).await?;
    Ok(Json(found.into_iter().map(to_user_response).collect()))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users"
)]
pub async fn get_user_by_id(Path(user_id): Path<Uuid>) -> Result<Json<UserResponse>, ApiError> {
    let db = create_connection().await?;

    let user = UserService::get_by_id(&db, user_id).await?;
    Ok(Json(to_user_response(user)))
}

/// Register a user
#[utoipa::path(
    post,
    path = "/users",
    request_body = UserCreateRequest,
    responses(
        (status = 200, description = "User created", body = UserResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users"
)]
pub async fn create_user(
    Json(body): Json<UserCreateRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let db = create_connection().await?;

    let user = UserService::create(
        &db,
        NewUser {
            name: body.name,
            email: body.email,
        },
    )
    .await?;

    Ok(Json(to_user_response(user)))
}

/// Update name and/or email
#[utoipa::path(
    patch,
    path = "/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    request_body = UserUpdateRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users"
)]
pub async fn update_user(
    Path(user_id): Path<Uuid>,
    Json(body): Json<UserUpdateRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let db = create_connection().await?;

    let user = UserService::update(
        &db,
        user_id,
        UpdateUser {
            name: body.name,
            email: body.email,
        },
    )
    .await?;

    Ok(Json(to_user_response(user)))
}

/// Delete a user; deleting an unknown id is a no-op
#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users"
)]
pub async fn delete_user(Path(user_id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    let db = create_connection().await?;

    UserService::delete(&db, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn to_user_response(user: users::Model) -> UserResponse {
    UserResponse {
        id: user.id.to_string(),
        name: user.name,
        email: user.email,
    }
}
