use crate::handlers::user::get_user_id_from_request;
use crate::models::*;
use crate::services::PlanService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/plans",
    tag = "plan",
    request_body = CreatePlanRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Plan created", body = PlanResponse),
        (status = 400, description = "Invalid request or schedule"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_plan(
    plan_service: web::Data<PlanService>,
    req: HttpRequest,
    request: web::Json<CreatePlanRequest>,
) -> Result<HttpResponse> {
    let owner_id = get_user_id_from_request(&req).unwrap_or(0);
    match plan_service.create_plan(owner_id, request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": response}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/plans",
    tag = "plan",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Records per page")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Plans owned by the current user"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_plans(
    plan_service: web::Data<PlanService>,
    req: HttpRequest,
    query: web::Query<PlanQuery>,
) -> Result<HttpResponse> {
    let owner_id = get_user_id_from_request(&req).unwrap_or(0);
    match plan_service.get_plans(owner_id, &query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": response}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/plans/{id}",
    tag = "plan",
    params(("id" = i64, Path, description = "Plan identifier")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Plan details", body = PlanResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_plan(
    plan_service: web::Data<PlanService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let owner_id = get_user_id_from_request(&req).unwrap_or(0);
    match plan_service.get_plan(owner_id, path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": response}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/plans/{id}",
    tag = "plan",
    params(("id" = i64, Path, description = "Plan identifier")),
    request_body = UpdatePlanRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Plan updated", body = PlanResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_plan(
    plan_service: web::Data<PlanService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdatePlanRequest>,
) -> Result<HttpResponse> {
    let owner_id = get_user_id_from_request(&req).unwrap_or(0);
    match plan_service
        .update_plan(owner_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": response}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/plans/{id}",
    tag = "plan",
    params(("id" = i64, Path, description = "Plan identifier")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Plan deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_plan(
    plan_service: web::Data<PlanService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let owner_id = get_user_id_from_request(&req).unwrap_or(0);
    match plan_service.delete_plan(owner_id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({"success": true}))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn plan_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/plans")
            .route("", web::post().to(create_plan))
            .route("", web::get().to(get_plans))
            .route("/{id}", web::get().to(get_plan))
            .route("/{id}", web::put().to(update_plan))
            .route("/{id}", web::delete().to(delete_plan)),
    );
}
