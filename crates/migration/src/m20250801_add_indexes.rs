use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One account per email
        manager
            .create_index(
                Index::create()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index on items.owner_id for the owner-role booking queries
        manager
            .create_index(
                Index::create()
                    .name("idx_items_owner_id")
                    .table(Items::Table)
                    .col(Items::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_items_request_id")
                    .table(Items::Table)
                    .col(Items::RequestId)
                    .to_owned(),
            )
            .await?;

        // Booker listings order by start_date
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_booker_id_start_date")
                    .table(Bookings::Table)
                    .col(Bookings::BookerId)
                    .col(Bookings::StartDate)
                    .to_owned(),
            )
            .await?;

        // Per-item lookups: owner listings and last/next aggregation
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_item_id_start_date")
                    .table(Bookings::Table)
                    .col(Bookings::ItemId)
                    .col(Bookings::StartDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_status")
                    .table(Bookings::Table)
                    .col(Bookings::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_item_id")
                    .table(Comments::Table)
                    .col(Comments::ItemId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_item_requests_requester_id")
                    .table(ItemRequests::Table)
                    .col(ItemRequests::RequesterId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop indexes in reverse order
        manager
            .drop_index(
                Index::drop()
                    .name("idx_item_requests_requester_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_comments_item_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_bookings_status").to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_bookings_item_id_start_date")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_bookings_booker_id_start_date")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_items_request_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_items_owner_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_users_email").to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Email,
}

#[derive(Iden)]
enum Items {
    Table,
    OwnerId,
    RequestId,
}

#[derive(Iden)]
enum Bookings {
    Table,
    StartDate,
    ItemId,
    BookerId,
    Status,
}

#[derive(Iden)]
enum Comments {
    Table,
    ItemId,
}

#[derive(Iden)]
enum ItemRequests {
    Table,
    RequesterId,
}
