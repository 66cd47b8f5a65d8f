use crate::billing::Transition;
use crate::models::PaymentSignalRequest;
use crate::services::SubscriptionService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

/// Charge-outcome signals from the payment collaborator. The core never
/// calls a payment gateway itself; it only consumes the fact of a failed
/// or recovered charge.
#[utoipa::path(
    post,
    path = "/webhook/payments/halt",
    tag = "webhook",
    request_body = PaymentSignalRequest,
    responses(
        (status = 200, description = "Subscription halted", body = Transition),
        (status = 409, description = "Transition rejected"),
        (status = 404, description = "Not found")
    )
)]
pub async fn payment_halt(
    subscription_service: web::Data<SubscriptionService>,
    request: web::Json<PaymentSignalRequest>,
) -> Result<HttpResponse> {
    match subscription_service
        .halt(request.subscription_id, Utc::now())
        .await
    {
        Ok(transition) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": transition}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/webhook/payments/resolve",
    tag = "webhook",
    request_body = PaymentSignalRequest,
    responses(
        (status = 200, description = "Subscription resolved", body = Transition),
        (status = 409, description = "Transition rejected"),
        (status = 404, description = "Not found")
    )
)]
pub async fn payment_resolve(
    subscription_service: web::Data<SubscriptionService>,
    request: web::Json<PaymentSignalRequest>,
) -> Result<HttpResponse> {
    match subscription_service
        .resolve(request.subscription_id, Utc::now())
        .await
    {
        Ok(transition) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": transition}))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/webhook/payments")
            .route("/halt", web::post().to(payment_halt))
            .route("/resolve", web::post().to(payment_resolve)),
    );
}
