use super::subscriptions::PeriodUnit;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// A billable plan. Subscriptions copy its pricing/schedule fields at
/// creation so later plan edits never touch live subscriptions.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "plans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    /// In cents.
    pub price_per_billing_cycle: i64,
    pub setup_fee: i64,
    pub trial_period: Option<i32>,
    pub trial_period_unit: PeriodUnit,
    pub term: i32,
    pub term_unit: PeriodUnit,
    /// 0 means unlimited.
    pub total_billing_cycles: i32,
    pub renews: bool,
    pub deleted: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
