use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "subscription_status")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Created, not yet picked up by the sweep.
    #[sea_orm(string_value = "new")]
    New,
    /// Scheduled to start later.
    #[sea_orm(string_value = "future")]
    Future,
    #[sea_orm(string_value = "in_trial")]
    InTrial,
    #[sea_orm(string_value = "active")]
    Active,
    /// Trial ended on a non-renewing subscription; awaiting a manual charge.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// A charge failed; frozen until the payment collaborator resolves it.
    #[sea_orm(string_value = "halted")]
    Halted,
    #[sea_orm(string_value = "canceled")]
    Canceled,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "paused")]
    Paused,
}

impl SubscriptionStatus {
    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubscriptionStatus::Canceled | SubscriptionStatus::Expired)
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionStatus::New => write!(f, "new"),
            SubscriptionStatus::Future => write!(f, "future"),
            SubscriptionStatus::InTrial => write!(f, "in_trial"),
            SubscriptionStatus::Active => write!(f, "active"),
            SubscriptionStatus::Pending => write!(f, "pending"),
            SubscriptionStatus::Halted => write!(f, "halted"),
            SubscriptionStatus::Canceled => write!(f, "canceled"),
            SubscriptionStatus::Expired => write!(f, "expired"),
            SubscriptionStatus::Paused => write!(f, "paused"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "period_unit")]
#[serde(rename_all = "snake_case")]
pub enum PeriodUnit {
    #[sea_orm(string_value = "days")]
    Days,
    #[sea_orm(string_value = "months")]
    Months,
}

impl std::fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeriodUnit::Days => write!(f, "days"),
            PeriodUnit::Months => write!(f, "months"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_id: i64,
    pub account_id: i64,
    pub plan_id: i64,
    pub status: SubscriptionStatus,
    /// Pricing snapshot taken from the plan at subscription time, in cents.
    pub price_per_billing_cycle: i64,
    pub setup_fee: i64,
    pub quantity: i32,
    pub starts_at: DateTime<Utc>,
    /// 0 means unlimited.
    pub total_billing_cycles: i32,
    /// Completed (billed) cycles; monotonically non-decreasing.
    pub current_billing_cycle: i32,
    pub renews: bool,
    pub trial_period: Option<i32>,
    pub trial_period_unit: PeriodUnit,
    pub term: i32,
    pub term_unit: PeriodUnit,
    pub activated_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub paused_at: Option<DateTime<Utc>>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
