use crate::entities::{bookings, comments, item_requests, items, users};
use crate::error::{ServiceError, ServiceResult};
use crate::services::booking::BookingService;
use crate::services::clock::Clock;
use crate::services::page_index;
use futures::future::try_join;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, prelude::Expr,
};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<Uuid>,
}

/// Partial update; None leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentWithAuthor {
    pub comment: comments::Model,
    pub author_name: String,
}

/// An item with its owner-facing booking aggregation and comments
#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    pub item: items::Model,
    pub last_booking: Option<bookings::Model>,
    pub next_booking: Option<bookings::Model>,
    pub comments: Vec<CommentWithAuthor>,
}

pub struct ItemService;

impl ItemService {
    pub async fn create(
        db: &DatabaseConnection,
        user_id: Uuid,
        new: NewItem,
    ) -> ServiceResult<items::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id} not found")))?;

        if let Some(request_id) = new.request_id {
            item_requests::Entity::find_by_id(request_id)
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("request {request_id} not found"))
                })?;
        }

        let item = items::Model {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            available: new.available,
            owner_id: user_id,
            request_id: new.request_id,
        };

        items::Entity::insert(items::ActiveModel {
            id: Set(item.id),
            name: Set(item.name.clone()),
            description: Set(item.description.clone()),
            available: Set(item.available),
            owner_id: Set(item.owner_id),
            request_id: Set(item.request_id),
        })
        .exec_without_returning(db)
        .await?;

        log::info!("item {} created by user {user_id}", item.id);
        Ok(item)
    }

    /// Only the owner may update; everyone else sees NotFound
    pub async fn update(
        db: &DatabaseConnection,
        user_id: Uuid,
        item_id: Uuid,
        patch: UpdateItem,
    ) -> ServiceResult<items::Model> {
        let item = items::Entity::find_by_id(item_id)
            .one(db)
            .await?
            .filter(|item| item.owner_id == user_id)
            .ok_or_else(|| ServiceError::NotFound(format!("item {item_id} not found")))?;

        // An empty patch has nothing to write
        if patch.name.is_none() && patch.description.is_none() && patch.available.is_none() {
            return Ok(item);
        }

        let mut active = item.into_active_model();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(available) = patch.available {
            active.available = Set(available);
        }

        let updated = items::Entity::update(active).exec(db).await?;
        log::info!("item {item_id} updated");
        Ok(updated)
    }

    /// One item with its aggregation. The last/next bookings only
    /// materialize for the owner, since the aggregation queries are
    /// owner-scoped.
    pub async fn find_item(
        db: &DatabaseConnection,
        clock: &dyn Clock,
        user_id: Uuid,
        item_id: Uuid,
    ) -> ServiceResult<ItemView> {
        let item = items::Entity::find_by_id(item_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("item {item_id} not found")))?;

        let mut views = Self::assemble(db, clock, user_id, vec![item]).await?;
        views
            .pop()
            .ok_or_else(|| ServiceError::NotFound(format!("item {item_id} not found")))
    }

    /// The caller's own items, id ascending, one page window, aggregated
    pub async fn find_all(
        db: &DatabaseConnection,
        clock: &dyn Clock,
        user_id: Uuid,
        from: u64,
        size: u64,
    ) -> ServiceResult<Vec<ItemView>> {
        let page = items::Entity::find()
            .filter(items::Column::OwnerId.eq(user_id))
            .order_by_asc(items::Column::Id)
            .paginate(db, size)
            .fetch_page(page_index(from, size))
            .await?;

        Self::assemble(db, clock, user_id, page).await
    }

    /// Substring search over name and description of available items.
    /// A blank query short-circuits to an empty list.
    pub async fn search(
        db: &DatabaseConnection,
        text: &str,
        from: u64,
        size: u64,
    ) -> ServiceResult<Vec<items::Model>> {
        if text.trim().is_empty() {
            return Ok(vec![]);
        }

        let pattern = format!("%{}%", text.to_lowercase());
        let page = items::Entity::find()
            .filter(items::Column::Available.eq(true))
            .filter(
                Condition::any()
                    .add(Expr::cust_with_expr("lower(items.name) LIKE $1", pattern.clone()))
                    .add(Expr::cust_with_expr(
                        "lower(items.description) LIKE $1",
                        pattern,
                    )),
            )
            .order_by_asc(items::Column::Id)
            .paginate(db, size)
            .fetch_page(page_index(from, size))
            .await?;

        Ok(page)
    }

    /// Commenting requires a completed booking by the caller on the item
    pub async fn add_comment(
        db: &DatabaseConnection,
        clock: &dyn Clock,
        user_id: Uuid,
        item_id: Uuid,
        text: String,
    ) -> ServiceResult<CommentWithAuthor> {
        let author = users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id} not found")))?;

        items::Entity::find_by_id(item_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("item {item_id} not found")))?;

        let now = clock.now();
        let past_booking = bookings::Entity::find()
            .filter(bookings::Column::BookerId.eq(user_id))
            .filter(bookings::Column::ItemId.eq(item_id))
            .filter(bookings::Column::EndDate.lt(now))
            .one(db)
            .await?;

        if past_booking.is_none() {
            return Err(ServiceError::BadRequest(
                "cannot comment without a completed booking".to_string(),
            ));
        }

        let comment = comments::Model {
            id: Uuid::new_v4(),
            text,
            item_id,
            author_id: user_id,
            created: now,
        };

        comments::Entity::insert(comments::ActiveModel {
            id: Set(comment.id),
            text: Set(comment.text.clone()),
            item_id: Set(comment.item_id),
            author_id: Set(comment.author_id),
            created: Set(comment.created),
        })
        .exec_without_returning(db)
        .await?;

        Ok(CommentWithAuthor {
            comment,
            author_name: author.name,
        })
    }

    /// Read-model assembly: batched last/next booking and comment lookups
    /// keyed by the item id set, then one pass to zip everything together
    async fn assemble(
        db: &DatabaseConnection,
        clock: &dyn Clock,
        owner_id: Uuid,
        items: Vec<items::Model>,
    ) -> ServiceResult<Vec<ItemView>> {
        if items.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<Uuid> = items.iter().map(|item| item.id).collect();
        let now = clock.now();

        let (mut last, mut next) = try_join(
            BookingService::find_last_bookings(db, &ids, now, owner_id),
            BookingService::find_next_bookings(db, &ids, now, owner_id),
        )
        .await?;

        let comment_rows = comments::Entity::find()
            .filter(comments::Column::ItemId.is_in(ids))
            .all(db)
            .await?;

        let authors_by_id: HashMap<Uuid, users::Model> = if comment_rows.is_empty() {
            HashMap::new()
        } else {
            let author_ids: Vec<Uuid> = comment_rows.iter().map(|c| c.author_id).collect();
            users::Entity::find()
                .filter(users::Column::Id.is_in(author_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|user| (user.id, user))
                .collect()
        };

        let mut comments_by_item: HashMap<Uuid, Vec<CommentWithAuthor>> = HashMap::new();
        for comment in comment_rows {
            let author_name = authors_by_id
                .get(&comment.author_id)
                .map(|user| user.name.clone())
                .unwrap_or_default();
            comments_by_item
                .entry(comment.item_id)
                .or_default()
                .push(CommentWithAuthor {
                    comment,
                    author_name,
                });
        }

        let mut views = Vec::with_capacity(items.len());
        for item in items {
            views.push(ItemView {
                last_booking: last.remove(&item.id),
                next_booking: next.remove(&item.id),
                comments: comments_by_item.remove(&item.id).unwrap_or_default(),
                item,
            });
        }

        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::FixedClock;
    use chrono::NaiveDate;
    use models::booking_status::BookingStatus;
    use sea_orm::prelude::DateTime;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn ts(day: u32, hour: u32) -> DateTime {
        NaiveDate::from_ymd_opt(2025, 8, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn user(name: &str) -> users::Model {
        users::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{name}@example.com"),
        }
    }

    fn item(owner_id: Uuid) -> items::Model {
        items::Model {
            id: Uuid::new_v4(),
            name: "drill".to_string(),
            description: "cordless drill".to_string(),
            available: true,
            owner_id,
            request_id: None,
        }
    }

    fn booking(
        item_id: Uuid,
        booker_id: Uuid,
        start_date: DateTime,
        end_date: DateTime,
    ) -> bookings::Model {
        bookings::Model {
            id: Uuid::new_v4(),
            start_date,
            end_date,
            item_id,
            booker_id,
            status: BookingStatus::Approved,
        }
    }

    #[tokio::test]
    async fn test_blank_search_never_hits_the_database() {
        // No queued results: any query would fail the test
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let found = ItemService::search(&db, "   ", 0, 20).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_add_comment_requires_completed_booking() {
        let owner = user("owner");
        let renter = user("renter");
        let item = item(owner.id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![renter.clone()]])
            .append_query_results([vec![item.clone()]])
            .append_query_results([Vec::<bookings::Model>::new()])
            .into_connection();

        let err = ItemService::add_comment(
            &db,
            &FixedClock(ts(20, 0)),
            renter.id,
            item.id,
            "great drill".to_string(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_find_all_attaches_last_and_next_bookings() {
        let owner = user("owner");
        let renter = user("renter");
        let item = item(owner.id);
        let past = booking(item.id, renter.id, ts(1, 0), ts(2, 0));
        let future = booking(item.id, renter.id, ts(20, 0), ts(21, 0));

        let id_row = || {
            std::collections::BTreeMap::from([("id", sea_orm::Value::from(item.id))])
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // items page
            .append_query_results([vec![item.clone()]])
            // find_last_bookings: owned-id projection, then rows
            .append_query_results([vec![id_row()]])
            .append_query_results([vec![past.clone()]])
            // find_next_bookings: owned-id projection, then rows
            .append_query_results([vec![id_row()]])
            .append_query_results([vec![future.clone()]])
            // comments
            .append_query_results([Vec::<comments::Model>::new()])
            .into_connection();

        let views = ItemService::find_all(&db, &FixedClock(ts(10, 0)), owner.id, 0, 20)
            .await
            .unwrap();

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].item, item);
        assert_eq!(views[0].last_booking, Some(past));
        assert_eq!(views[0].next_booking, Some(future));
        assert!(views[0].comments.is_empty());
    }

    #[tokio::test]
    async fn test_find_item_unknown_id_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<items::Model>::new()])
            .into_connection();

        let err = ItemService::find_item(&db, &FixedClock(ts(10, 0)), Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_by_non_owner_reads_as_missing() {
        let owner = user("owner");
        let stranger = user("stranger");
        let item = item(owner.id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![item.clone()]])
            .into_connection();

        let err = ItemService::update(
            &db,
            stranger.id,
            item.id,
            UpdateItem {
                available: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
