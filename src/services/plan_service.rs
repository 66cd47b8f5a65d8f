use crate::billing::validate_schedule;
use crate::entities::{PeriodUnit, plan_entity as plans};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

#[derive(Clone)]
pub struct PlanService {
    pool: DatabaseConnection,
}

impl PlanService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn create_plan(
        &self,
        owner_id: i64,
        request: CreatePlanRequest,
    ) -> AppResult<PlanResponse> {
        validate_schedule(
            request.term,
            request.trial_period,
            request.total_billing_cycles,
        )?;
        if request.price_per_billing_cycle < 0 || request.setup_fee < 0 {
            return Err(AppError::ValidationError(
                "Prices must not be negative".to_string(),
            ));
        }

        let existing = plans::Entity::find()
            .filter(plans::Column::OwnerId.eq(owner_id))
            .filter(plans::Column::Code.eq(request.code.clone()))
            .filter(plans::Column::Deleted.eq(false))
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "A plan with this code already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let plan = plans::ActiveModel {
            owner_id: Set(owner_id),
            name: Set(request.name),
            code: Set(request.code),
            description: Set(request.description),
            price_per_billing_cycle: Set(request.price_per_billing_cycle),
            setup_fee: Set(request.setup_fee),
            trial_period: Set(request.trial_period),
            trial_period_unit: Set(request.trial_period_unit.unwrap_or(PeriodUnit::Days)),
            term: Set(request.term),
            term_unit: Set(request.term_unit.unwrap_or(PeriodUnit::Days)),
            total_billing_cycles: Set(request.total_billing_cycles),
            renews: Set(request.renews),
            deleted: Set(false),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(plan.into())
    }

    pub async fn get_plans(
        &self,
        owner_id: i64,
        query: &PlanQuery,
    ) -> AppResult<PaginatedResponse<PlanResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);

        let filter = plans::Entity::find()
            .filter(plans::Column::OwnerId.eq(owner_id))
            .filter(plans::Column::Deleted.eq(false));

        let total = filter.clone().count(&self.pool).await? as i64;
        let records = filter
            .order_by_desc(plans::Column::CreatedAt)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<PlanResponse> = records.into_iter().map(PlanResponse::from).collect();
        Ok(PaginatedResponse::new(items, &params, total))
    }

    pub async fn get_plan(&self, owner_id: i64, plan_id: i64) -> AppResult<PlanResponse> {
        let plan = self.find_owned(owner_id, plan_id).await?;
        Ok(plan.into())
    }

    /// Only descriptive/pricing fields are editable; live subscriptions
    /// carry their own snapshot and are unaffected.
    pub async fn update_plan(
        &self,
        owner_id: i64,
        plan_id: i64,
        request: UpdatePlanRequest,
    ) -> AppResult<PlanResponse> {
        let plan = self.find_owned(owner_id, plan_id).await?;

        let mut am = plan.into_active_model();
        if let Some(v) = request.name {
            am.name = Set(v);
        }
        if let Some(v) = request.description {
            am.description = Set(Some(v));
        }
        if let Some(v) = request.price_per_billing_cycle {
            if v < 0 {
                return Err(AppError::ValidationError(
                    "Prices must not be negative".to_string(),
                ));
            }
            am.price_per_billing_cycle = Set(v);
        }
        if let Some(v) = request.setup_fee {
            if v < 0 {
                return Err(AppError::ValidationError(
                    "Prices must not be negative".to_string(),
                ));
            }
            am.setup_fee = Set(v);
        }
        am.updated_at = Set(Some(Utc::now()));

        let plan = am.update(&self.pool).await?;
        Ok(plan.into())
    }

    pub async fn delete_plan(&self, owner_id: i64, plan_id: i64) -> AppResult<()> {
        let plan = self.find_owned(owner_id, plan_id).await?;
        let mut am = plan.into_active_model();
        am.deleted = Set(true);
        am.updated_at = Set(Some(Utc::now()));
        am.update(&self.pool).await?;
        Ok(())
    }

    async fn find_owned(&self, owner_id: i64, plan_id: i64) -> AppResult<plans::Model> {
        plans::Entity::find_by_id(plan_id)
            .filter(plans::Column::OwnerId.eq(owner_id))
            .filter(plans::Column::Deleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Cannot find a plan with the specified identifier".to_string())
            })
    }
}
