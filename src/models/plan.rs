use crate::entities::{PeriodUnit, plan_entity as plans};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePlanRequest {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    /// In cents.
    pub price_per_billing_cycle: i64,
    #[serde(default)]
    pub setup_fee: i64,
    pub trial_period: Option<i32>,
    pub trial_period_unit: Option<PeriodUnit>,
    pub term: i32,
    pub term_unit: Option<PeriodUnit>,
    /// 0 means unlimited.
    #[serde(default)]
    pub total_billing_cycles: i32,
    #[serde(default = "default_renews")]
    pub renews: bool,
}

fn default_renews() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePlanRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_per_billing_cycle: Option<i64>,
    pub setup_fee: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlanQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanResponse {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub price_per_billing_cycle: i64,
    pub setup_fee: i64,
    pub trial_period: Option<i32>,
    pub trial_period_unit: PeriodUnit,
    pub term: i32,
    pub term_unit: PeriodUnit,
    pub total_billing_cycles: i32,
    pub renews: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<plans::Model> for PlanResponse {
    fn from(m: plans::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            code: m.code,
            description: m.description,
            price_per_billing_cycle: m.price_per_billing_cycle,
            setup_fee: m.setup_fee,
            trial_period: m.trial_period,
            trial_period_unit: m.trial_period_unit,
            term: m.term,
            term_unit: m.term_unit,
            total_billing_cycles: m.total_billing_cycles,
            renews: m.renews,
            created_at: m.created_at,
        }
    }
}
