use crate::dtos::item::ItemResponse;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RequestCreateRequest {
    pub description: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestResponse {
    pub id: String,
    pub description: String,
    pub created: NaiveDateTime,
    /// Items listed in answer to this request
    pub items: Vec<ItemResponse>,
}
