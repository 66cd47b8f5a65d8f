use crate::entities::{PeriodUnit, SubscriptionStatus, subscription_entity as subscriptions};
use crate::models::{AccountResponse, PlanResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Pricing/schedule fields default to the plan's values; any field given
/// here overrides the plan for this subscription only.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    pub account_id: i64,
    pub plan_id: i64,
    pub starts_at: DateTime<Utc>,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub price_per_billing_cycle: Option<i64>,
    pub setup_fee: Option<i64>,
    pub trial_period: Option<i32>,
    pub trial_period_unit: Option<PeriodUnit>,
    pub term: Option<i32>,
    pub term_unit: Option<PeriodUnit>,
    pub total_billing_cycles: Option<i32>,
    pub renews: Option<bool>,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub status: Option<SubscriptionStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentSignalRequest {
    pub subscription_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: i64,
    pub owner_id: i64,
    pub account_id: i64,
    pub plan_id: i64,
    pub status: SubscriptionStatus,
    pub price_per_billing_cycle: i64,
    pub setup_fee: i64,
    pub quantity: i32,
    pub starts_at: DateTime<Utc>,
    pub total_billing_cycles: i32,
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
    /// Embedded via separate point lookups; absent when the referenced
    /// record has been deleted since.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanResponse>,
}

impl From<subscriptions::Model> for SubscriptionResponse {
    fn from(m: subscriptions::Model) -> Self {
        Self {
            id: m.id,
            owner_id: m.owner_id,
            account_id: m.account_id,
            plan_id: m.plan_id,
            status: m.status,
            price_per_billing_cycle: m.price_per_billing_cycle,
            setup_fee: m.setup_fee,
            quantity: m.quantity,
            starts_at: m.starts_at,
            total_billing_cycles: m.total_billing_cycles,
            current_billing_cycle: m.current_billing_cycle,
            renews: m.renews,
            trial_period: m.trial_period,
            trial_period_unit: m.trial_period_unit,
            term: m.term,
            term_unit: m.term_unit,
            activated_at: m.activated_at,
            cancelled_at: m.cancelled_at,
            paused_at: m.paused_at,
            current_period_start: m.current_period_start,
            current_period_end: m.current_period_end,
            created_at: m.created_at,
            updated_at: m.updated_at,
            account: None,
            plan: None,
        }
    }
}
