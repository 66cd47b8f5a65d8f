use crate::entities::billing_ledger_entity as billing_ledger;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionQuery {
    pub subscription_id: i64,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LedgerEntryResponse {
    pub id: i64,
    pub subscription_id: i64,
    pub cycle_number: i32,
    pub amount: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<billing_ledger::Model> for LedgerEntryResponse {
    fn from(m: billing_ledger::Model) -> Self {
        Self {
            id: m.id,
            subscription_id: m.subscription_id,
            cycle_number: m.cycle_number,
            amount: m.amount,
            created_at: m.created_at,
        }
    }
}
