use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ItemCreateRequest {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ItemUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<String>,
}

/// Booking fields shown inside an item's last/next slots
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingBrief {
    pub id: String,
    pub booker_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    pub id: String,
    pub text: String,
    pub author_name: String,
    pub created: NaiveDateTime,
}

/// Owner-facing item view with its booking aggregation and comments
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemDetailResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<String>,
    pub last_booking: Option<BookingBrief>,
    pub next_booking: Option<BookingBrief>,
    pub comments: Vec<CommentResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentCreateRequest {
    pub text: String,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct PageParams {
    #[serde(default)]
    pub from: u64,

    #[serde(default = "default_size")]
    pub size: u64,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct SearchParams {
    pub text: String,

    #[serde(default)]
    pub from: u64,

    #[serde(default = "default_size")]
    pub size: u64,
}

fn default_size() -> u64 {
    20
}
