use crate::billing::{self, SubscriptionEvent, Transition};
use crate::entities::{SubscriptionStatus, subscription_entity as subscriptions};
use crate::error::{AppError, AppResult};
use crate::services::{LedgerService, subscription_service::engine_update};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};

#[derive(Debug, Default)]
pub struct SweepReport {
    pub scanned: usize,
    pub transitions: Vec<Transition>,
    pub failed: usize,
}

/// The renewal/expiration sweep. Parameterized by `now` so runs are
/// deterministic and testable; the background task in `tasks` feeds it
/// the wall clock on a configurable interval.
#[derive(Clone)]
pub struct SweepService {
    pool: DatabaseConnection,
    ledger_service: LedgerService,
}

impl SweepService {
    pub fn new(pool: DatabaseConnection) -> Self {
        let ledger_service = LedgerService::new(pool.clone());
        Self {
            pool,
            ledger_service,
        }
    }

    /// Evaluate every non-terminal subscription once. A failure on one
    /// subscription is logged and counted; the batch never stops early,
    /// and no lock is held across it.
    pub async fn run(&self, now: DateTime<Utc>) -> AppResult<SweepReport> {
        let candidates = subscriptions::Entity::find()
            .filter(subscriptions::Column::Status.is_not_in([
                SubscriptionStatus::Canceled,
                SubscriptionStatus::Expired,
            ]))
            .all(&self.pool)
            .await?;

        let mut report = SweepReport {
            scanned: candidates.len(),
            ..Default::default()
        };

        for candidate in candidates {
            match self.evaluate(candidate.id, now).await {
                Ok(Some(transition)) => report.transitions.push(transition),
                Ok(None) => {}
                Err(e) => {
                    log::error!("Sweep failed for subscription {}: {e:?}", candidate.id);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Apply at most one due transition to a subscription. The snapshot is
    /// re-read inside the transaction, so a racing worker or an external
    /// cancel observed there simply plans nothing (or gets rejected) and
    /// this evaluation becomes a no-op. The ledger append and the snapshot
    /// update commit together or not at all.
    pub async fn evaluate(
        &self,
        subscription_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Transition>> {
        let txn = self.pool.begin().await?;

        let Some(subscription) = subscriptions::Entity::find_by_id(subscription_id)
            .one(&txn)
            .await?
        else {
            return Ok(None);
        };

        let Some(event) = billing::plan_event(&subscription, now) else {
            return Ok(None);
        };

        let (next, transition) = billing::apply(&subscription, &event)?;

        if let SubscriptionEvent::Renew { cycle, .. } = event {
            let amount = subscription.price_per_billing_cycle * i64::from(subscription.quantity);
            match self
                .ledger_service
                .append(&txn, subscription.id, cycle, amount)
                .await
            {
                Ok(()) => {}
                Err(AppError::DuplicateCycle { .. }) => {
                    // Another worker already billed this cycle. The snapshot
                    // update below is deterministic from the stored fields,
                    // so re-applying it is safe.
                    log::debug!(
                        "Cycle {cycle} of subscription {} already billed; skipping ledger write",
                        subscription.id
                    );
                }
                Err(e) => return Err(e),
            }
        }

        engine_update(subscription, &next).update(&txn).await?;
        txn.commit().await?;

        log::info!(
            "Subscription {} transitioned {} -> {} on {}",
            transition.subscription_id,
            transition.from_status,
            transition.to_status,
            event.name()
        );
        Ok(Some(transition))
    }
}
