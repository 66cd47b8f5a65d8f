use crate::entities::{SubscriptionStatus, account_entity as accounts, subscription_entity as subscriptions};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

#[derive(Clone)]
pub struct AccountService {
    pool: DatabaseConnection,
}

impl AccountService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn create_account(
        &self,
        owner_id: i64,
        request: CreateAccountRequest,
    ) -> AppResult<AccountResponse> {
        if request.user_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Account username must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let account = accounts::ActiveModel {
            owner_id: Set(owner_id),
            user_name: Set(request.user_name),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            email_address: Set(request.email_address),
            phone_number: Set(request.phone_number),
            address_line1: Set(request.address_line1),
            address_line2: Set(request.address_line2),
            city: Set(request.city),
            state: Set(request.state),
            country: Set(request.country),
            zip_code: Set(request.zip_code),
            deleted: Set(false),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(account.into())
    }

    pub async fn get_accounts(
        &self,
        owner_id: i64,
        query: &AccountQuery,
    ) -> AppResult<PaginatedResponse<AccountResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);

        let filter = accounts::Entity::find()
            .filter(accounts::Column::OwnerId.eq(owner_id))
            .filter(accounts::Column::Deleted.eq(false));

        let total = filter.clone().count(&self.pool).await? as i64;
        let records = filter
            .order_by_desc(accounts::Column::CreatedAt)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<AccountResponse> = records.into_iter().map(AccountResponse::from).collect();
        Ok(PaginatedResponse::new(items, &params, total))
    }

    pub async fn get_account(&self, owner_id: i64, account_id: i64) -> AppResult<AccountResponse> {
        let account = self.find_owned(owner_id, account_id).await?;
        Ok(account.into())
    }

    pub async fn update_account(
        &self,
        owner_id: i64,
        account_id: i64,
        request: UpdateAccountRequest,
    ) -> AppResult<AccountResponse> {
        let account = self.find_owned(owner_id, account_id).await?;

        let mut am = account.into_active_model();
        if let Some(v) = request.first_name {
            am.first_name = Set(v);
        }
        if let Some(v) = request.last_name {
            am.last_name = Set(v);
        }
        if let Some(v) = request.email_address {
            am.email_address = Set(Some(v));
        }
        if let Some(v) = request.phone_number {
            am.phone_number = Set(Some(v));
        }
        if let Some(v) = request.address_line1 {
            am.address_line1 = Set(Some(v));
        }
        if let Some(v) = request.address_line2 {
            am.address_line2 = Set(Some(v));
        }
        if let Some(v) = request.city {
            am.city = Set(Some(v));
        }
        if let Some(v) = request.state {
            am.state = Set(Some(v));
        }
        if let Some(v) = request.country {
            am.country = Set(Some(v));
        }
        if let Some(v) = request.zip_code {
            am.zip_code = Set(Some(v));
        }
        am.updated_at = Set(Some(Utc::now()));

        let account = am.update(&self.pool).await?;
        Ok(account.into())
    }

    /// Soft delete. An account with live subscriptions cannot be removed.
    pub async fn delete_account(&self, owner_id: i64, account_id: i64) -> AppResult<()> {
        let account = self.find_owned(owner_id, account_id).await?;

        let live = subscriptions::Entity::find()
            .filter(subscriptions::Column::AccountId.eq(account_id))
            .filter(subscriptions::Column::Status.is_not_in([
                SubscriptionStatus::Canceled,
                SubscriptionStatus::Expired,
            ]))
            .count(&self.pool)
            .await?;
        if live > 0 {
            return Err(AppError::ValidationError(
                "The account still has live subscriptions".to_string(),
            ));
        }

        let mut am = account.into_active_model();
        am.deleted = Set(true);
        am.updated_at = Set(Some(Utc::now()));
        am.update(&self.pool).await?;
        Ok(())
    }

    async fn find_owned(&self, owner_id: i64, account_id: i64) -> AppResult<accounts::Model> {
        accounts::Entity::find_by_id(account_id)
            .filter(accounts::Column::OwnerId.eq(owner_id))
            .filter(accounts::Column::Deleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(
                    "Cannot find an account with the specified identifier".to_string(),
                )
            })
    }
}
