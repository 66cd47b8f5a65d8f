use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Append-only proof that a given cycle was billed. A unique index on
/// (subscription_id, cycle_number) makes the insert the idempotency guard.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "billing_ledger")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub subscription_id: i64,
    pub cycle_number: i32,
    /// Amount charged for the cycle, in cents.
    pub amount: i64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
