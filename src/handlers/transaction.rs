use crate::handlers::user::get_user_id_from_request;
use crate::models::*;
use crate::services::{LedgerService, SubscriptionService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/transactions",
    tag = "transaction",
    params(
        ("subscription_id" = i64, Query, description = "Subscription identifier"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Records per page")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Billing ledger entries for the subscription"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_transactions(
    ledger_service: web::Data<LedgerService>,
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    query: web::Query<TransactionQuery>,
) -> Result<HttpResponse> {
    let owner_id = get_user_id_from_request(&req).unwrap_or(0);

    // Ledger entries are only visible through a subscription the caller owns.
    let subscription = match subscription_service
        .find_owned(owner_id, query.subscription_id)
        .await
    {
        Ok(subscription) => subscription,
        Err(e) => return Ok(e.error_response()),
    };

    let params = PaginationParams::new(query.page, query.page_size);
    match ledger_service.get_entries(subscription.id, &params).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": response}))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn transaction_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/transactions").route("", web::get().to(get_transactions)));
}
