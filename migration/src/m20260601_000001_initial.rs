use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    UserName,
    EmailAddress,
    PasswordHash,
    FirstName,
    LastName,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    OwnerId,
    UserName,
    FirstName,
    LastName,
    EmailAddress,
    PhoneNumber,
    AddressLine1,
    AddressLine2,
    City,
    State,
    Country,
    ZipCode,
    Deleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Plans {
    Table,
    Id,
    OwnerId,
    Name,
    Code,
    Description,
    PricePerBillingCycle,
    SetupFee,
    TrialPeriod,
    TrialPeriodUnit,
    Term,
    TermUnit,
    TotalBillingCycles,
    Renews,
    Deleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Subscriptions {
    Table,
    Id,
    OwnerId,
    AccountId,
    PlanId,
    Status,
    PricePerBillingCycle,
    SetupFee,
    Quantity,
    StartsAt,
    TotalBillingCycles,
    CurrentBillingCycle,
    Renews,
    TrialPeriod,
    TrialPeriodUnit,
    Term,
    TermUnit,
    ActivatedAt,
    CancelledAt,
    PausedAt,
    CurrentPeriodStart,
    CurrentPeriodEnd,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BillingLedger {
    Table,
    Id,
    SubscriptionId,
    CycleNumber,
    Amount,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // enums
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("period_unit"))
                    .values(vec![Alias::new("days"), Alias::new("months")])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("subscription_status"))
                    .values(vec![
                        Alias::new("new"),
                        Alias::new("future"),
                        Alias::new("in_trial"),
                        Alias::new("active"),
                        Alias::new("pending"),
                        Alias::new("halted"),
                        Alias::new("canceled"),
                        Alias::new("expired"),
                        Alias::new("paused"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::UserName)
                            .string_len(30)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::EmailAddress)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(ColumnDef::new(Users::FirstName).string_len(100).null())
                    .col(ColumnDef::new(Users::LastName).string_len(100).null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::OwnerId).big_integer().not_null())
                    .col(ColumnDef::new(Accounts::UserName).string_len(100).not_null())
                    .col(ColumnDef::new(Accounts::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Accounts::LastName).string_len(100).not_null())
                    .col(ColumnDef::new(Accounts::EmailAddress).string_len(255).null())
                    .col(ColumnDef::new(Accounts::PhoneNumber).string_len(30).null())
                    .col(ColumnDef::new(Accounts::AddressLine1).string_len(255).null())
                    .col(ColumnDef::new(Accounts::AddressLine2).string_len(255).null())
                    .col(ColumnDef::new(Accounts::City).string_len(100).null())
                    .col(ColumnDef::new(Accounts::State).string_len(100).null())
                    .col(ColumnDef::new(Accounts::Country).string_len(100).null())
                    .col(ColumnDef::new(Accounts::ZipCode).string_len(20).null())
                    .col(
                        ColumnDef::new(Accounts::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Accounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_accounts_owner_id")
                    .table(Accounts::Table)
                    .col(Accounts::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Plans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Plans::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Plans::OwnerId).big_integer().not_null())
                    .col(ColumnDef::new(Plans::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Plans::Code).string_len(50).not_null())
                    .col(ColumnDef::new(Plans::Description).string_len(500).null())
                    .col(
                        ColumnDef::new(Plans::PricePerBillingCycle)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Plans::SetupFee)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Plans::TrialPeriod).integer().null())
                    .col(
                        ColumnDef::new(Plans::TrialPeriodUnit)
                            .custom(Alias::new("period_unit"))
                            .not_null()
                            .default(Expr::cust("'days'::period_unit")),
                    )
                    .col(ColumnDef::new(Plans::Term).integer().not_null())
                    .col(
                        ColumnDef::new(Plans::TermUnit)
                            .custom(Alias::new("period_unit"))
                            .not_null()
                            .default(Expr::cust("'days'::period_unit")),
                    )
                    .col(
                        ColumnDef::new(Plans::TotalBillingCycles)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Plans::Renews)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Plans::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Plans::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Plans::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_plans_owner_id")
                    .table(Plans::Table)
                    .col(Plans::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscriptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::OwnerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::PlanId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::Status)
                            .custom(Alias::new("subscription_status"))
                            .not_null()
                            .default(Expr::cust("'new'::subscription_status")),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::PricePerBillingCycle)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::SetupFee)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Subscriptions::Quantity).integer().not_null())
                    .col(
                        ColumnDef::new(Subscriptions::StartsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::TotalBillingCycles)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CurrentBillingCycle)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::Renews)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Subscriptions::TrialPeriod).integer().null())
                    .col(
                        ColumnDef::new(Subscriptions::TrialPeriodUnit)
                            .custom(Alias::new("period_unit"))
                            .not_null()
                            .default(Expr::cust("'days'::period_unit")),
                    )
                    .col(ColumnDef::new(Subscriptions::Term).integer().not_null())
                    .col(
                        ColumnDef::new(Subscriptions::TermUnit)
                            .custom(Alias::new("period_unit"))
                            .not_null()
                            .default(Expr::cust("'days'::period_unit")),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::ActivatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CancelledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::PausedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CurrentPeriodStart)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CurrentPeriodEnd)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BillingLedger::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BillingLedger::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BillingLedger::SubscriptionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BillingLedger::CycleNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BillingLedger::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(BillingLedger::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one ledger entry per (subscription, cycle); the insert
        // against this index is the double-billing guard.
        manager
            .create_index(
                Index::create()
                    .name("uq_billing_ledger_subscription_cycle")
                    .table(BillingLedger::Table)
                    .col(BillingLedger::SubscriptionId)
                    .col(BillingLedger::CycleNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BillingLedger::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subscriptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Plans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_type(
                Type::drop()
                    .name(Alias::new("subscription_status"))
                    .to_owned(),
            )
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("period_unit")).to_owned())
            .await?;
        Ok(())
    }
}
