use crate::handlers::user::get_user_id_from_request;
use crate::models::*;
use crate::services::AccountService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/accounts",
    tag = "account",
    request_body = CreateAccountRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account created", body = AccountResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_account(
    account_service: web::Data<AccountService>,
    req: HttpRequest,
    request: web::Json<CreateAccountRequest>,
) -> Result<HttpResponse> {
    let owner_id = get_user_id_from_request(&req).unwrap_or(0);
    match account_service
        .create_account(owner_id, request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": response}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/accounts",
    tag = "account",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Records per page")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Accounts owned by the current user"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_accounts(
    account_service: web::Data<AccountService>,
    req: HttpRequest,
    query: web::Query<AccountQuery>,
) -> Result<HttpResponse> {
    let owner_id = get_user_id_from_request(&req).unwrap_or(0);
    match account_service.get_accounts(owner_id, &query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": response}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/accounts/{id}",
    tag = "account",
    params(("id" = i64, Path, description = "Account identifier")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account details", body = AccountResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_account(
    account_service: web::Data<AccountService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let owner_id = get_user_id_from_request(&req).unwrap_or(0);
    match account_service
        .get_account(owner_id, path.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": response}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/accounts/{id}",
    tag = "account",
    params(("id" = i64, Path, description = "Account identifier")),
    request_body = UpdateAccountRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account updated", body = AccountResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_account(
    account_service: web::Data<AccountService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateAccountRequest>,
) -> Result<HttpResponse> {
    let owner_id = get_user_id_from_request(&req).unwrap_or(0);
    match account_service
        .update_account(owner_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": response}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/accounts/{id}",
    tag = "account",
    params(("id" = i64, Path, description = "Account identifier")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account deleted"),
        (status = 400, description = "Account still has live subscriptions"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_account(
    account_service: web::Data<AccountService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let owner_id = get_user_id_from_request(&req).unwrap_or(0);
    match account_service
        .delete_account(owner_id, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({"success": true}))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn account_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/accounts")
            .route("", web::post().to(create_account))
            .route("", web::get().to(get_accounts))
            .route("/{id}", web::get().to(get_account))
            .route("/{id}", web::put().to(update_account))
            .route("/{id}", web::delete().to(delete_account)),
    );
}
