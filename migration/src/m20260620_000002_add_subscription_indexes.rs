use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Subscriptions {
    Table,
    OwnerId,
    AccountId,
    Status,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // The sweep scans by status; list endpoints filter by owner.
        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_status")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_owner_id")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::OwnerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_account_id")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::AccountId)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_subscriptions_status").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_subscriptions_owner_id").to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_subscriptions_account_id")
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
