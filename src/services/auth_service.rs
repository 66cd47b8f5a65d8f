use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{
    JwtService, hash_password, validate_email, validate_password, validate_user_name,
    verify_password,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        validate_user_name(&request.user_name)?;
        validate_email(&request.email_address)?;
        validate_password(&request.password)?;

        let existing = users::Entity::find()
            .filter(users::Column::UserName.eq(request.user_name.clone()))
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "Username already taken".to_string(),
            ));
        }

        let existing = users::Entity::find()
            .filter(users::Column::EmailAddress.eq(request.email_address.clone()))
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "Email address already registered".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();
        let user = users::ActiveModel {
            user_name: Set(request.user_name),
            email_address: Set(request.email_address),
            password_hash: Set(password_hash),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Registered user {} ({})", user.id, user.user_name);
        self.issue_tokens(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let user = users::Entity::find()
            .filter(users::Column::UserName.eq(request.user_name.clone()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }

        self.issue_tokens(user)
    }

    pub async fn refresh(&self, request: RefreshRequest) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(&request.refresh_token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))?;

        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        self.issue_tokens(user)
    }

    pub async fn get_profile(&self, user_id: i64) -> AppResult<UserResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(user.into())
    }

    fn issue_tokens(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token = self.jwt_service.generate_access_token(user.id)?;
        let refresh_token = self.jwt_service.generate_refresh_token(user.id)?;
        Ok(AuthResponse {
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
            user: user.into(),
        })
    }
}
