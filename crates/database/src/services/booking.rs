use crate::entities::{bookings, items, users};
use crate::error::{ServiceError, ServiceResult};
use crate::services::clock::Clock;
use crate::services::page_index;
use futures::future::try_join;
use models::booking_status::BookingStatus;
use models::state_filter::StateFilter;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, prelude::DateTime, prelude::Expr,
};
use std::collections::HashMap;
use uuid::Uuid;

/// A booking together with the resolved item and booker snapshots,
/// ready for presentation
#[derive(Debug, Clone, PartialEq)]
pub struct BookingView {
    pub booking: bookings::Model,
    pub item: items::Model,
    pub booker: users::Model,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub item_id: Uuid,
    pub start_date: DateTime,
    pub end_date: DateTime,
}

pub struct BookingService;

impl BookingService {
    /// Create a booking in WAITING status. Requests may overlap existing
    /// bookings on the same item; approval is the gating step.
    pub async fn create(
        db: &DatabaseConnection,
        booker_id: Uuid,
        new: NewBooking,
    ) -> ServiceResult<BookingView> {
        let item = items::Entity::find_by_id(new.item_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("item {} not found", new.item_id)))?;

        let booker = users::Entity::find_by_id(booker_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {booker_id} not found")))?;

        if new.start_date >= new.end_date {
            return Err(ServiceError::BadRequest("invalid time range".to_string()));
        }

        // Booking one's own item reads as nonexistence, not as a
        // permission failure
        if item.owner_id == booker_id {
            return Err(ServiceError::NotFound(format!(
                "item {} not found",
                new.item_id
            )));
        }

        if !item.available {
            return Err(ServiceError::BadRequest("item not available".to_string()));
        }

        let booking = bookings::Model {
            id: Uuid::new_v4(),
            start_date: new.start_date,
            end_date: new.end_date,
            item_id: item.id,
            booker_id,
            status: BookingStatus::Waiting,
        };

        bookings::Entity::insert(bookings::ActiveModel {
            id: Set(booking.id),
            start_date: Set(booking.start_date),
            end_date: Set(booking.end_date),
            item_id: Set(booking.item_id),
            booker_id: Set(booking.booker_id),
            status: Set(booking.status),
        })
        .exec_without_returning(db)
        .await?;

        log::info!("booking {} created for item {}", booking.id, item.id);

        Ok(BookingView {
            booking,
            item,
            booker,
        })
    }

    /// Decide a WAITING booking. Only the item's owner may decide, and only
    /// once: the status write is a conditional update, so of two concurrent
    /// decisions at most one matches the WAITING row.
    pub async fn change_status(
        db: &DatabaseConnection,
        caller_id: Uuid,
        booking_id: Uuid,
        approved: bool,
    ) -> ServiceResult<BookingView> {
        let booking = bookings::Entity::find_by_id(booking_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("booking {booking_id} not found")))?;

        let item = items::Entity::find_by_id(booking.item_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("item {} not found", booking.item_id)))?;

        // Non-owners must not learn the booking exists
        if item.owner_id != caller_id {
            return Err(ServiceError::NotFound(format!(
                "booking {booking_id} not found"
            )));
        }

        if booking.status != BookingStatus::Waiting {
            return Err(ServiceError::BadRequest("already decided".to_string()));
        }

        let status = if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        };

        let result = bookings::Entity::update_many()
            .col_expr(bookings::Column::Status, Expr::value(status))
            .filter(bookings::Column::Id.eq(booking_id))
            .filter(bookings::Column::Status.eq(BookingStatus::Waiting))
            .exec(db)
            .await?;

        // Zero rows affected: a concurrent decision won the race
        if result.rows_affected == 0 {
            return Err(ServiceError::BadRequest("already decided".to_string()));
        }

        log::info!("booking {booking_id} {status}");

        let booker = users::Entity::find_by_id(booking.booker_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("user {} not found", booking.booker_id))
            })?;

        Ok(BookingView {
            booking: bookings::Model { status, ..booking },
            item,
            booker,
        })
    }

    /// Read a single booking. Visible to the booker and the item's owner
    /// only; everyone else sees NotFound.
    pub async fn get_booking_info(
        db: &DatabaseConnection,
        caller_id: Uuid,
        booking_id: Uuid,
    ) -> ServiceResult<BookingView> {
        let booking = bookings::Entity::find_by_id(booking_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("booking {booking_id} not found")))?;

        let item = items::Entity::find_by_id(booking.item_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("item {} not found", booking.item_id)))?;

        if booking.booker_id != caller_id && item.owner_id != caller_id {
            return Err(ServiceError::NotFound(format!(
                "booking {booking_id} not found"
            )));
        }

        let booker = users::Entity::find_by_id(booking.booker_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("user {} not found", booking.booker_id))
            })?;

        Ok(BookingView {
            booking,
            item,
            booker,
        })
    }

    /// Bookings made by `user_id`, filtered by state, one page window
    pub async fn get_by_booker(
        db: &DatabaseConnection,
        clock: &dyn Clock,
        user_id: Uuid,
        state: StateFilter,
        from: u64,
        size: u64,
    ) -> ServiceResult<Vec<BookingView>> {
        Self::ensure_user_exists(db, user_id).await?;

        let role = Condition::all().add(bookings::Column::BookerId.eq(user_id));
        Self::list(db, clock, role, state, from, size).await
    }

    /// Bookings on items owned by `user_id`, filtered by state, one page
    /// window
    pub async fn get_by_owner(
        db: &DatabaseConnection,
        clock: &dyn Clock,
        user_id: Uuid,
        state: StateFilter,
        from: u64,
        size: u64,
    ) -> ServiceResult<Vec<BookingView>> {
        Self::ensure_user_exists(db, user_id).await?;

        let item_ids: Vec<Uuid> = items::Entity::find()
            .select_only()
            .column(items::Column::Id)
            .filter(items::Column::OwnerId.eq(user_id))
            .into_tuple()
            .all(db)
            .await?;

        let role = Condition::all().add(bookings::Column::ItemId.is_in(item_ids));
        Self::list(db, clock, role, state, from, size).await
    }

    /// One query strategy per state variant, evaluated against the clock's
    /// "now" at call time
    async fn list(
        db: &DatabaseConnection,
        clock: &dyn Clock,
        role: Condition,
        state: StateFilter,
        from: u64,
        size: u64,
    ) -> ServiceResult<Vec<BookingView>> {
        let now = clock.now();
        let query = bookings::Entity::find().filter(role);

        let query = match state {
            StateFilter::All => query.order_by_desc(bookings::Column::StartDate),
            StateFilter::Current => query
                .filter(bookings::Column::StartDate.lt(now))
                .filter(bookings::Column::EndDate.gt(now))
                .order_by_asc(bookings::Column::StartDate),
            StateFilter::Past => query
                .filter(bookings::Column::EndDate.lt(now))
                .order_by_asc(bookings::Column::StartDate),
            StateFilter::Future => query
                .filter(bookings::Column::StartDate.gt(now))
                .order_by_desc(bookings::Column::StartDate),
            // Same-status rows have no meaningful status order; start
            // descending keeps the listing deterministic
            StateFilter::Waiting => query
                .filter(bookings::Column::Status.eq(BookingStatus::Waiting))
                .order_by_desc(bookings::Column::StartDate),
            StateFilter::Rejected => query
                .filter(bookings::Column::Status.eq(BookingStatus::Rejected))
                .order_by_desc(bookings::Column::StartDate),
        };

        let page = query
            .paginate(db, size)
            .fetch_page(page_index(from, size))
            .await?;

        Self::attach_snapshots(db, page).await
    }

    /// Most recent past booking per item (greatest start among end < now),
    /// scoped to items the caller owns. One batched query for the whole id
    /// set.
    pub async fn find_last_bookings(
        db: &DatabaseConnection,
        item_ids: &[Uuid],
        now: DateTime,
        owner_id: Uuid,
    ) -> ServiceResult<HashMap<Uuid, bookings::Model>> {
        let rows = Self::owned_bookings(db, item_ids, owner_id, |query| {
            query
                .filter(bookings::Column::EndDate.lt(now))
                .order_by_desc(bookings::Column::StartDate)
        })
        .await?;

        Ok(Self::first_per_item(rows))
    }

    /// Nearest future booking per item (smallest start among start > now),
    /// scoped to items the caller owns
    pub async fn find_next_bookings(
        db: &DatabaseConnection,
        item_ids: &[Uuid],
        now: DateTime,
        owner_id: Uuid,
    ) -> ServiceResult<HashMap<Uuid, bookings::Model>> {
        let rows = Self::owned_bookings(db, item_ids, owner_id, |query| {
            query
                .filter(bookings::Column::StartDate.gt(now))
                .order_by_asc(bookings::Column::StartDate)
        })
        .await?;

        Ok(Self::first_per_item(rows))
    }

    async fn owned_bookings(
        db: &DatabaseConnection,
        item_ids: &[Uuid],
        owner_id: Uuid,
        shape: impl FnOnce(sea_orm::Select<bookings::Entity>) -> sea_orm::Select<bookings::Entity>,
    ) -> ServiceResult<Vec<bookings::Model>> {
        if item_ids.is_empty() {
            return Ok(vec![]);
        }

        let owned_ids: Vec<Uuid> = items::Entity::find()
            .select_only()
            .column(items::Column::Id)
            .filter(items::Column::Id.is_in(item_ids.to_vec()))
            .filter(items::Column::OwnerId.eq(owner_id))
            .into_tuple()
            .all(db)
            .await?;

        if owned_ids.is_empty() {
            return Ok(vec![]);
        }

        let query = shape(
            bookings::Entity::find().filter(bookings::Column::ItemId.is_in(owned_ids)),
        );

        Ok(query.all(db).await?)
    }

    /// Rows arrive pre-ordered; the first row seen per item wins
    fn first_per_item(rows: Vec<bookings::Model>) -> HashMap<Uuid, bookings::Model> {
        let mut by_item = HashMap::new();
        for booking in rows {
            by_item.entry(booking.item_id).or_insert(booking);
        }
        by_item
    }

    async fn ensure_user_exists(db: &DatabaseConnection, user_id: Uuid) -> ServiceResult<()> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id} not found")))
    }

    /// Resolve item and booker snapshots for a page of bookings with two
    /// batched lookups
    async fn attach_snapshots(
        db: &DatabaseConnection,
        page: Vec<bookings::Model>,
    ) -> ServiceResult<Vec<BookingView>> {
        if page.is_empty() {
            return Ok(vec![]);
        }

        let item_ids: Vec<Uuid> = page.iter().map(|b| b.item_id).collect();
        let booker_ids: Vec<Uuid> = page.iter().map(|b| b.booker_id).collect();

        let (item_rows, user_rows) = try_join(
            items::Entity::find()
                .filter(items::Column::Id.is_in(item_ids))
                .all(db),
            users::Entity::find()
                .filter(users::Column::Id.is_in(booker_ids))
                .all(db),
        )
        .await?;

        let items_by_id: HashMap<Uuid, items::Model> =
            item_rows.into_iter().map(|item| (item.id, item)).collect();
        let users_by_id: HashMap<Uuid, users::Model> =
            user_rows.into_iter().map(|user| (user.id, user)).collect();

        let mut views = Vec::with_capacity(page.len());
        for booking in page {
            let item = items_by_id.get(&booking.item_id).cloned().ok_or_else(|| {
                ServiceError::NotFound(format!("item {} not found", booking.item_id))
            })?;
            let booker = users_by_id
                .get(&booking.booker_id)
                .cloned()
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("user {} not found", booking.booker_id))
                })?;
            views.push(BookingView {
                booking,
                item,
                booker,
            });
        }

        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

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

    fn item(owner_id: Uuid, available: bool) -> items::Model {
        items::Model {
            id: Uuid::new_v4(),
            name: "drill".to_string(),
            description: "cordless drill".to_string(),
            available,
            owner_id,
            request_id: None,
        }
    }

    fn booking(item_id: Uuid, booker_id: Uuid, status: BookingStatus) -> bookings::Model {
        bookings::Model {
            id: Uuid::new_v4(),
            start_date: ts(10, 12),
            end_date: ts(11, 12),
            item_id,
            booker_id,
            status,
        }
    }

    #[tokio::test]
    async fn test_create_persists_waiting_booking() {
        let owner = user("owner");
        let booker = user("booker");
        let item = item(owner.id, true);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![item.clone()]])
            .append_query_results([vec![booker.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let view = BookingService::create(
            &db,
            booker.id,
            NewBooking {
                item_id: item.id,
                start_date: ts(10, 12),
                end_date: ts(11, 12),
            },
        )
        .await
        .unwrap();

        assert_eq!(view.booking.status, BookingStatus::Waiting);
        assert_eq!(view.booking.item_id, item.id);
        assert_eq!(view.booking.booker_id, booker.id);
        assert_eq!(view.item, item);
        assert_eq!(view.booker, booker);
    }

    #[tokio::test]
    async fn test_create_rejects_inverted_time_range() {
        let owner = user("owner");
        let booker = user("booker");
        let item = item(owner.id, true);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![item.clone()]])
            .append_query_results([vec![booker.clone()]])
            .into_connection();

        let err = BookingService::create(
            &db,
            booker.id,
            NewBooking {
                item_id: item.id,
                start_date: ts(11, 12),
                end_date: ts(11, 12),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::BadRequest(msg) if msg == "invalid time range"));
    }

    #[tokio::test]
    async fn test_create_hides_own_item() {
        let owner = user("owner");
        let item = item(owner.id, true);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![item.clone()]])
            .append_query_results([vec![owner.clone()]])
            .into_connection();

        let err = BookingService::create(
            &db,
            owner.id,
            NewBooking {
                item_id: item.id,
                start_date: ts(10, 12),
                end_date: ts(11, 12),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_unavailable_item() {
        let owner = user("owner");
        let booker = user("booker");
        let item = item(owner.id, false);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![item.clone()]])
            .append_query_results([vec![booker.clone()]])
            .into_connection();

        let err = BookingService::create(
            &db,
            booker.id,
            NewBooking {
                item_id: item.id,
                start_date: ts(10, 12),
                end_date: ts(11, 12),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::BadRequest(msg) if msg == "item not available"));
    }

    #[tokio::test]
    async fn test_create_unknown_item_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<items::Model>::new()])
            .into_connection();

        let err = BookingService::create(
            &db,
            Uuid::new_v4(),
            NewBooking {
                item_id: Uuid::new_v4(),
                start_date: ts(10, 12),
                end_date: ts(11, 12),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_change_status_approves_waiting_booking() {
        let owner = user("owner");
        let booker = user("booker");
        let item = item(owner.id, true);
        let waiting = booking(item.id, booker.id, BookingStatus::Waiting);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![waiting.clone()]])
            .append_query_results([vec![item.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![booker.clone()]])
            .into_connection();

        let view = BookingService::change_status(&db, owner.id, waiting.id, true)
            .await
            .unwrap();

        assert_eq!(view.booking.status, BookingStatus::Approved);
        assert_eq!(view.booking.id, waiting.id);
    }

    #[tokio::test]
    async fn test_change_status_rejects_waiting_booking() {
        let owner = user("owner");
        let booker = user("booker");
        let item = item(owner.id, true);
        let waiting = booking(item.id, booker.id, BookingStatus::Waiting);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![waiting.clone()]])
            .append_query_results([vec![item.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![booker.clone()]])
            .into_connection();

        let view = BookingService::change_status(&db, owner.id, waiting.id, false)
            .await
            .unwrap();

        assert_eq!(view.booking.status, BookingStatus::Rejected);
    }

    #[tokio::test]
    async fn test_change_status_is_owner_only() {
        let owner = user("owner");
        let booker = user("booker");
        let item = item(owner.id, true);
        let waiting = booking(item.id, booker.id, BookingStatus::Waiting);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![waiting.clone()]])
            .append_query_results([vec![item.clone()]])
            .into_connection();

        // The booker may not decide their own request
        let err = BookingService::change_status(&db, booker.id, waiting.id, true)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_change_status_fails_once_decided() {
        let owner = user("owner");
        let booker = user("booker");
        let item = item(owner.id, true);
        let approved = booking(item.id, booker.id, BookingStatus::Approved);

        for approve in [true, false] {
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![approved.clone()]])
                .append_query_results([vec![item.clone()]])
                .into_connection();

            let err = BookingService::change_status(&db, owner.id, approved.id, approve)
                .await
                .unwrap_err();

            assert!(matches!(err, ServiceError::BadRequest(msg) if msg == "already decided"));
        }
    }

    #[tokio::test]
    async fn test_change_status_lost_race_reads_as_decided() {
        let owner = user("owner");
        let booker = user("booker");
        let item = item(owner.id, true);
        let waiting = booking(item.id, booker.id, BookingStatus::Waiting);

        // The row read WAITING but the conditional update matched nothing:
        // a concurrent decision got there first
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![waiting.clone()]])
            .append_query_results([vec![item.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let err = BookingService::change_status(&db, owner.id, waiting.id, true)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::BadRequest(msg) if msg == "already decided"));
    }

    #[tokio::test]
    async fn test_get_booking_info_visible_to_booker_and_owner() {
        let owner = user("owner");
        let booker = user("booker");
        let item = item(owner.id, true);
        let b = booking(item.id, booker.id, BookingStatus::Waiting);

        for caller in [booker.id, owner.id] {
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![b.clone()]])
                .append_query_results([vec![item.clone()]])
                .append_query_results([vec![booker.clone()]])
                .into_connection();

            let view = BookingService::get_booking_info(&db, caller, b.id)
                .await
                .unwrap();
            assert_eq!(view.booking, b);
        }
    }

    #[tokio::test]
    async fn test_get_booking_info_hidden_from_strangers() {
        let owner = user("owner");
        let booker = user("booker");
        let stranger = user("stranger");
        let item = item(owner.id, true);
        let b = booking(item.id, booker.id, BookingStatus::Waiting);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![b.clone()]])
            .append_query_results([vec![item.clone()]])
            .into_connection();

        let err = BookingService::get_booking_info(&db, stranger.id, b.id)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_by_booker_requires_known_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();

        let err = BookingService::get_by_booker(
            &db,
            &crate::services::clock::FixedClock(ts(10, 12)),
            Uuid::new_v4(),
            StateFilter::All,
            0,
            20,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_by_booker_attaches_snapshots() {
        let owner = user("owner");
        let booker = user("booker");
        let item = item(owner.id, true);
        let first = booking(item.id, booker.id, BookingStatus::Waiting);
        let second = booking(item.id, booker.id, BookingStatus::Approved);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![booker.clone()]])
            .append_query_results([vec![first.clone(), second.clone()]])
            .append_query_results([vec![item.clone()]])
            .append_query_results([vec![booker.clone()]])
            .into_connection();

        let views = BookingService::get_by_booker(
            &db,
            &crate::services::clock::FixedClock(ts(20, 0)),
            booker.id,
            StateFilter::All,
            0,
            20,
        )
        .await
        .unwrap();

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].booking, first);
        assert_eq!(views[1].booking, second);
        assert!(views.iter().all(|v| v.item == item && v.booker == booker));
    }

    #[test]
    fn test_first_per_item_keeps_leading_row() {
        let item_id = Uuid::new_v4();
        let booker_id = Uuid::new_v4();
        let mut earlier = booking(item_id, booker_id, BookingStatus::Approved);
        earlier.start_date = ts(5, 0);
        earlier.end_date = ts(6, 0);
        let mut later = booking(item_id, booker_id, BookingStatus::Approved);
        later.start_date = ts(7, 0);
        later.end_date = ts(8, 0);

        // Descending order: the most recent start wins
        let picked = BookingService::first_per_item(vec![later.clone(), earlier.clone()]);
        assert_eq!(picked.get(&item_id), Some(&later));

        // Ascending order: the earliest start wins
        let picked = BookingService::first_per_item(vec![earlier.clone(), later]);
        assert_eq!(picked.get(&item_id), Some(&earlier));
    }
}
