use crate::entities::{item_requests, items, users};
use crate::error::{ServiceError, ServiceResult};
use crate::services::clock::Clock;
use crate::services::page_index;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use std::collections::HashMap;
use uuid::Uuid;

/// A request with the items listed in answer to it
#[derive(Debug, Clone, PartialEq)]
pub struct RequestView {
    pub request: item_requests::Model,
    pub items: Vec<items::Model>,
}

pub struct ItemRequestService;

impl ItemRequestService {
    pub async fn create(
        db: &DatabaseConnection,
        clock: &dyn Clock,
        user_id: Uuid,
        description: String,
    ) -> ServiceResult<item_requests::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id} not found")))?;

        let request = item_requests::Model {
            id: Uuid::new_v4(),
            description,
            requester_id: user_id,
            created: clock.now(),
        };

        item_requests::Entity::insert(item_requests::ActiveModel {
            id: Set(request.id),
            description: Set(request.description.clone()),
            requester_id: Set(request.requester_id),
            created: Set(request.created),
        })
        .exec_without_returning(db)
        .await?;

        log::info!("request {} created by user {user_id}", request.id);
        Ok(request)
    }

    /// The caller's own requests, newest first, with matching items
    pub async fn get_own(
        db: &DatabaseConnection,
        user_id: Uuid,
    ) -> ServiceResult<Vec<RequestView>> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id} not found")))?;

        let requests = item_requests::Entity::find()
            .filter(item_requests::Column::RequesterId.eq(user_id))
            .order_by_desc(item_requests::Column::Created)
            .all(db)
            .await?;

        Self::attach_items(db, requests).await
    }

    /// Other users' requests, newest first, one page window
    pub async fn get_all(
        db: &DatabaseConnection,
        user_id: Uuid,
        from: u64,
        size: u64,
    ) -> ServiceResult<Vec<RequestView>> {
        let requests = item_requests::Entity::find()
            .filter(item_requests::Column::RequesterId.ne(user_id))
            .order_by_desc(item_requests::Column::Created)
            .paginate(db, size)
            .fetch_page(page_index(from, size))
            .await?;

        Self::attach_items(db, requests).await
    }

    pub async fn get_by_id(
        db: &DatabaseConnection,
        user_id: Uuid,
        request_id: Uuid,
    ) -> ServiceResult<RequestView> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id} not found")))?;

        let request = item_requests::Entity::find_by_id(request_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("request {request_id} not found")))?;

        let items = items::Entity::find()
            .filter(items::Column::RequestId.eq(request_id))
            .all(db)
            .await?;

        Ok(RequestView { request, items })
    }

    /// One batched item lookup for the whole request set
    async fn attach_items(
        db: &DatabaseConnection,
        requests: Vec<item_requests::Model>,
    ) -> ServiceResult<Vec<RequestView>> {
        if requests.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<Uuid> = requests.iter().map(|request| request.id).collect();
        let answers = items::Entity::find()
            .filter(items::Column::RequestId.is_in(ids))
            .all(db)
            .await?;

        let mut items_by_request: HashMap<Uuid, Vec<items::Model>> = HashMap::new();
        for item in answers {
            if let Some(request_id) = item.request_id {
                items_by_request.entry(request_id).or_default().push(item);
            }
        }

        let mut views = Vec::with_capacity(requests.len());
        for request in requests {
            views.push(RequestView {
                items: items_by_request.remove(&request.id).unwrap_or_default(),
                request,
            });
        }

        Ok(views)
    }
}
