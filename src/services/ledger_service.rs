use crate::entities::billing_ledger_entity as billing_ledger;
use crate::error::{AppError, AppResult};
use crate::models::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

/// Append-only billing ledger. The unique index on
/// (subscription_id, cycle_number) is the at-most-once-per-cycle guard:
/// the insert is an atomic check-and-insert, never check-then-insert.
#[derive(Clone)]
pub struct LedgerService {
    pool: DatabaseConnection,
}

impl LedgerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Record that `cycle_number` was billed. Fails with `DuplicateCycle`
    /// when an entry already exists (concurrent sweep, retry after a
    /// partial failure). Takes the caller's connection so the append can
    /// share a transaction with the snapshot update.
    pub async fn append<C: ConnectionTrait>(
        &self,
        conn: &C,
        subscription_id: i64,
        cycle_number: i32,
        amount: i64,
    ) -> AppResult<()> {
        let entry = billing_ledger::ActiveModel {
            subscription_id: Set(subscription_id),
            cycle_number: Set(cycle_number),
            amount: Set(amount),
            ..Default::default()
        };

        let result = billing_ledger::Entity::insert(entry)
            .on_conflict(
                OnConflict::columns([
                    billing_ledger::Column::SubscriptionId,
                    billing_ledger::Column::CycleNumber,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(conn)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotInserted) => Err(AppError::DuplicateCycle {
                subscription_id,
                cycle: cycle_number,
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists(&self, subscription_id: i64, cycle_number: i32) -> AppResult<bool> {
        let count = billing_ledger::Entity::find()
            .filter(billing_ledger::Column::SubscriptionId.eq(subscription_id))
            .filter(billing_ledger::Column::CycleNumber.eq(cycle_number))
            .count(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn get_entries(
        &self,
        subscription_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<LedgerEntryResponse>> {
        let filter = billing_ledger::Entity::find()
            .filter(billing_ledger::Column::SubscriptionId.eq(subscription_id));

        let total = filter.clone().count(&self.pool).await? as i64;
        let records = filter
            .order_by_desc(billing_ledger::Column::CycleNumber)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<LedgerEntryResponse> =
            records.into_iter().map(LedgerEntryResponse::from).collect();
        Ok(PaginatedResponse::new(items, params, total))
    }
}
