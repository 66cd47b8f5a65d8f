use crate::billing::Transition;
use crate::handlers::user::get_user_id_from_request;
use crate::models::*;
use crate::services::SubscriptionService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "subscription",
    request_body = CreateSubscriptionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subscription created", body = SubscriptionResponse),
        (status = 400, description = "Invalid request or schedule"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_subscription(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    request: web::Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse> {
    let owner_id = get_user_id_from_request(&req).unwrap_or(0);
    match subscription_service
        .create_subscription(owner_id, request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": response}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "subscription",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Records per page"),
        ("status" = Option<String>, Query, description = "Filter by status")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subscriptions owned by the current user"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_subscriptions(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    query: web::Query<SubscriptionQuery>,
) -> Result<HttpResponse> {
    let owner_id = get_user_id_from_request(&req).unwrap_or(0);
    match subscription_service.get_subscriptions(owner_id, &query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": response}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/{id}",
    tag = "subscription",
    params(("id" = i64, Path, description = "Subscription identifier")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subscription details", body = SubscriptionResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_subscription(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let owner_id = get_user_id_from_request(&req).unwrap_or(0);
    match subscription_service
        .get_subscription(owner_id, path.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": response}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscriptions/{id}/cancel",
    tag = "subscription",
    params(("id" = i64, Path, description = "Subscription identifier")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subscription canceled", body = Transition),
        (status = 409, description = "Transition rejected"),
        (status = 404, description = "Not found")
    )
)]
pub async fn cancel_subscription(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let owner_id = get_user_id_from_request(&req).unwrap_or(0);
    match subscription_service
        .cancel(owner_id, path.into_inner(), Utc::now())
        .await
    {
        Ok(transition) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": transition}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscriptions/{id}/pause",
    tag = "subscription",
    params(("id" = i64, Path, description = "Subscription identifier")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subscription paused", body = Transition),
        (status = 409, description = "Transition rejected"),
        (status = 404, description = "Not found")
    )
)]
pub async fn pause_subscription(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let owner_id = get_user_id_from_request(&req).unwrap_or(0);
    match subscription_service
        .pause(owner_id, path.into_inner(), Utc::now())
        .await
    {
        Ok(transition) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": transition}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscriptions/{id}/resume",
    tag = "subscription",
    params(("id" = i64, Path, description = "Subscription identifier")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subscription resumed", body = Transition),
        (status = 409, description = "Transition rejected"),
        (status = 404, description = "Not found")
    )
)]
pub async fn resume_subscription(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let owner_id = get_user_id_from_request(&req).unwrap_or(0);
    match subscription_service
        .resume(owner_id, path.into_inner(), Utc::now())
        .await
    {
        Ok(transition) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": transition}))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("", web::post().to(create_subscription))
            .route("", web::get().to(get_subscriptions))
            .route("/{id}", web::get().to(get_subscription))
            .route("/{id}/cancel", web::post().to(cancel_subscription))
            .route("/{id}/pause", web::post().to(pause_subscription))
            .route("/{id}/resume", web::post().to(resume_subscription)),
    );
}
