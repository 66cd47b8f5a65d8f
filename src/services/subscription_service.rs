use crate::billing::{self, SubscriptionEvent, Transition, validate_schedule};
use crate::entities::{
    SubscriptionStatus, account_entity as accounts, plan_entity as plans,
    subscription_entity as subscriptions,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

/// Copy the engine-owned fields of an applied transition into an update.
/// The state machine is the single writer of status, cycle and period
/// fields; everything else stays untouched.
pub(crate) fn engine_update(
    prev: subscriptions::Model,
    next: &subscriptions::Model,
) -> subscriptions::ActiveModel {
    let mut am = prev.into_active_model();
    am.status = Set(next.status);
    am.current_billing_cycle = Set(next.current_billing_cycle);
    am.activated_at = Set(next.activated_at);
    am.cancelled_at = Set(next.cancelled_at);
    am.paused_at = Set(next.paused_at);
    am.current_period_start = Set(next.current_period_start);
    am.current_period_end = Set(next.current_period_end);
    am.updated_at = Set(next.updated_at);
    am
}

#[derive(Clone)]
pub struct SubscriptionService {
    pool: DatabaseConnection,
}

impl SubscriptionService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn create_subscription(
        &self,
        owner_id: i64,
        request: CreateSubscriptionRequest,
    ) -> AppResult<SubscriptionResponse> {
        // The plan must be owned by the current user and not deleted.
        let plan = plans::Entity::find_by_id(request.plan_id)
            .filter(plans::Column::OwnerId.eq(owner_id))
            .filter(plans::Column::Deleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::ValidationError("The specified plan identifier is invalid".to_string())
            })?;

        // Same for the account.
        let account = accounts::Entity::find_by_id(request.account_id)
            .filter(accounts::Column::OwnerId.eq(owner_id))
            .filter(accounts::Column::Deleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::ValidationError("The specified account identifier is invalid".to_string())
            })?;

        // One live subscription per (account, plan) pair.
        let subscribed = subscriptions::Entity::find()
            .filter(subscriptions::Column::AccountId.eq(account.id))
            .filter(subscriptions::Column::PlanId.eq(plan.id))
            .filter(subscriptions::Column::Status.is_not_in([
                SubscriptionStatus::Canceled,
                SubscriptionStatus::Expired,
            ]))
            .count(&self.pool)
            .await?;
        if subscribed > 0 {
            return Err(AppError::ValidationError(
                "The specified plan is already subscribed".to_string(),
            ));
        }

        if request.quantity < 1 {
            return Err(AppError::ValidationError(
                "Quantity must be a positive integer".to_string(),
            ));
        }

        // Snapshot pricing/schedule from the plan, with request overrides.
        let price = request
            .price_per_billing_cycle
            .unwrap_or(plan.price_per_billing_cycle);
        let setup_fee = request.setup_fee.unwrap_or(plan.setup_fee);
        let trial_period = request.trial_period.or(plan.trial_period);
        let trial_period_unit = request.trial_period_unit.unwrap_or(plan.trial_period_unit);
        let term = request.term.unwrap_or(plan.term);
        let term_unit = request.term_unit.unwrap_or(plan.term_unit);
        let total_billing_cycles = request
            .total_billing_cycles
            .unwrap_or(plan.total_billing_cycles);
        let renews = request.renews.unwrap_or(plan.renews);

        // Malformed schedules are rejected here, once; the sweep assumes
        // stored subscriptions are well-formed.
        validate_schedule(term, trial_period, total_billing_cycles)?;
        if price < 0 || setup_fee < 0 {
            return Err(AppError::ValidationError(
                "Prices must not be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let subscription = subscriptions::ActiveModel {
            owner_id: Set(owner_id),
            account_id: Set(account.id),
            plan_id: Set(plan.id),
            status: Set(SubscriptionStatus::New),
            price_per_billing_cycle: Set(price),
            setup_fee: Set(setup_fee),
            quantity: Set(request.quantity),
            starts_at: Set(request.starts_at),
            total_billing_cycles: Set(total_billing_cycles),
            current_billing_cycle: Set(0),
            renews: Set(renews),
            trial_period: Set(trial_period),
            trial_period_unit: Set(trial_period_unit),
            term: Set(term),
            term_unit: Set(term_unit),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Created subscription {} (account {}, plan {})",
            subscription.id,
            account.id,
            plan.id
        );

        let mut response = SubscriptionResponse::from(subscription);
        response.account = Some(account.into());
        response.plan = Some(plan.into());
        Ok(response)
    }

    pub async fn get_subscriptions(
        &self,
        owner_id: i64,
        query: &SubscriptionQuery,
    ) -> AppResult<PaginatedResponse<SubscriptionResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);

        let mut filter =
            subscriptions::Entity::find().filter(subscriptions::Column::OwnerId.eq(owner_id));
        if let Some(status) = query.status {
            filter = filter.filter(subscriptions::Column::Status.eq(status));
        }

        let total = filter.clone().count(&self.pool).await? as i64;
        let records = filter
            .order_by_desc(subscriptions::Column::CreatedAt)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.pool)
            .await?;

        // The store cannot join across these collections; look the
        // referenced records up in two point queries instead.
        let account_ids: Vec<i64> = records.iter().map(|s| s.account_id).collect();
        let plan_ids: Vec<i64> = records.iter().map(|s| s.plan_id).collect();

        let account_by_id: HashMap<i64, accounts::Model> = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(account_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();
        let plan_by_id: HashMap<i64, plans::Model> = plans::Entity::find()
            .filter(plans::Column::Id.is_in(plan_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let items: Vec<SubscriptionResponse> = records
            .into_iter()
            .map(|s| {
                let account = account_by_id.get(&s.account_id).cloned();
                let plan = plan_by_id.get(&s.plan_id).cloned();
                let mut response = SubscriptionResponse::from(s);
                response.account = account.map(Into::into);
                response.plan = plan.map(Into::into);
                response
            })
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    pub async fn get_subscription(
        &self,
        owner_id: i64,
        subscription_id: i64,
    ) -> AppResult<SubscriptionResponse> {
        let subscription = self.find_owned(owner_id, subscription_id).await?;

        let account = accounts::Entity::find_by_id(subscription.account_id)
            .one(&self.pool)
            .await?;
        let plan = plans::Entity::find_by_id(subscription.plan_id)
            .one(&self.pool)
            .await?;

        let mut response = SubscriptionResponse::from(subscription);
        response.account = account.map(Into::into);
        response.plan = plan.map(Into::into);
        Ok(response)
    }

    /// Owner-initiated cancellation. Legal from any non-terminal status;
    /// a racing renewal loses because the sweep re-reads the snapshot
    /// inside its own transaction.
    pub async fn cancel(
        &self,
        owner_id: i64,
        subscription_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<Transition> {
        self.submit_owned(owner_id, subscription_id, SubscriptionEvent::Cancel { now })
            .await
    }

    pub async fn pause(
        &self,
        owner_id: i64,
        subscription_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<Transition> {
        self.submit_owned(owner_id, subscription_id, SubscriptionEvent::Pause { now })
            .await
    }

    pub async fn resume(
        &self,
        owner_id: i64,
        subscription_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<Transition> {
        self.submit_owned(owner_id, subscription_id, SubscriptionEvent::Resume { now })
            .await
    }

    /// Payment failure signaled by the payment collaborator.
    pub async fn halt(&self, subscription_id: i64, now: DateTime<Utc>) -> AppResult<Transition> {
        let txn = self.pool.begin().await?;
        let subscription = Self::find_in(&txn, subscription_id).await?;
        let transition =
            Self::apply_and_store(&txn, subscription, &SubscriptionEvent::Halt { now }).await?;
        txn.commit().await?;
        Ok(transition)
    }

    /// Payment recovered. The period is recomputed from the stored
    /// schedule; cycles missed while halted are billed by later sweep
    /// passes, one renewal each.
    pub async fn resolve(&self, subscription_id: i64, now: DateTime<Utc>) -> AppResult<Transition> {
        let txn = self.pool.begin().await?;
        let subscription = Self::find_in(&txn, subscription_id).await?;
        let (period_start, period_end) =
            billing::cycle::period_for_cycle(&subscription, subscription.current_billing_cycle);
        let event = SubscriptionEvent::Resolve {
            period_start,
            period_end,
            now,
        };
        let transition = Self::apply_and_store(&txn, subscription, &event).await?;
        txn.commit().await?;
        Ok(transition)
    }

    async fn submit_owned(
        &self,
        owner_id: i64,
        subscription_id: i64,
        event: SubscriptionEvent,
    ) -> AppResult<Transition> {
        let txn = self.pool.begin().await?;
        let subscription = subscriptions::Entity::find_by_id(subscription_id)
            .filter(subscriptions::Column::OwnerId.eq(owner_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(
                    "Cannot find a subscription with the specified identifier".to_string(),
                )
            })?;
        let transition = Self::apply_and_store(&txn, subscription, &event).await?;
        txn.commit().await?;
        Ok(transition)
    }

    async fn apply_and_store<C: ConnectionTrait>(
        conn: &C,
        subscription: subscriptions::Model,
        event: &SubscriptionEvent,
    ) -> AppResult<Transition> {
        let (next, transition) = billing::apply(&subscription, event)?;
        engine_update(subscription, &next).update(conn).await?;
        log::info!(
            "Subscription {} transitioned {} -> {} on {}",
            transition.subscription_id,
            transition.from_status,
            transition.to_status,
            event.name()
        );
        Ok(transition)
    }

    async fn find_in<C: ConnectionTrait>(
        conn: &C,
        subscription_id: i64,
    ) -> AppResult<subscriptions::Model> {
        subscriptions::Entity::find_by_id(subscription_id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(
                    "Cannot find a subscription with the specified identifier".to_string(),
                )
            })
    }

    /// Owner-scoped lookup used by the transactions surface.
    pub async fn find_owned(
        &self,
        owner_id: i64,
        subscription_id: i64,
    ) -> AppResult<subscriptions::Model> {
        subscriptions::Entity::find_by_id(subscription_id)
            .filter(subscriptions::Column::OwnerId.eq(owner_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(
                    "Cannot find a subscription with the specified identifier".to_string(),
                )
            })
    }
}
