use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::billing::Transition;
use crate::entities::{PeriodUnit, SubscriptionStatus};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::user::get_profile,
        handlers::account::create_account,
        handlers::account::get_accounts,
        handlers::account::get_account,
        handlers::account::update_account,
        handlers::account::delete_account,
        handlers::plan::create_plan,
        handlers::plan::get_plans,
        handlers::plan::get_plan,
        handlers::plan::update_plan,
        handlers::plan::delete_plan,
        handlers::subscription::create_subscription,
        handlers::subscription::get_subscriptions,
        handlers::subscription::get_subscription,
        handlers::subscription::cancel_subscription,
        handlers::subscription::pause_subscription,
        handlers::subscription::resume_subscription,
        handlers::transaction::get_transactions,
        handlers::webhook::payment_halt,
        handlers::webhook::payment_resolve,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            AuthResponse,
            UserResponse,
            CreateAccountRequest,
            UpdateAccountRequest,
            AccountResponse,
            CreatePlanRequest,
            UpdatePlanRequest,
            PlanResponse,
            CreateSubscriptionRequest,
            SubscriptionResponse,
            PaymentSignalRequest,
            LedgerEntryResponse,
            Transition,
            SubscriptionStatus,
            PeriodUnit,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "user", description = "User management API"),
        (name = "account", description = "Account management API"),
        (name = "plan", description = "Plan management API"),
        (name = "subscription", description = "Subscription lifecycle API"),
        (name = "transaction", description = "Billing ledger API"),
        (name = "webhook", description = "Payment collaborator signals"),
    ),
    info(
        title = "Subtrack Backend API",
        version = "1.0.0",
        description = "Recurring subscription management REST API documentation",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
