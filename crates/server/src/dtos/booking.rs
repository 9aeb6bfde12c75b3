use crate::dtos::item::ItemResponse;
use crate::dtos::user::UserResponse;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct BookingCreateRequest {
    pub item_id: Uuid,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingResponse {
    pub id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: String,
    pub booker: UserResponse,
    pub item: ItemResponse,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct ApproveParams {
    pub approved: bool,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct BookingQueryParams {
    #[serde(default = "default_state")]
    pub state: String,

    #[serde(default)]
    pub from: u64,

    #[serde(default = "default_size")]
    pub size: u64,
}

fn default_state() -> String {
    "ALL".to_string()
}

fn default_size() -> u64 {
    20
}
