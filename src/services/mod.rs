pub mod account_service;
pub mod auth_service;
pub mod ledger_service;
pub mod plan_service;
pub mod subscription_service;
pub mod sweep_service;

pub use account_service::*;
pub use auth_service::*;
pub use ledger_service::*;
pub use plan_service::*;
pub use subscription_service::SubscriptionService;
pub use sweep_service::*;
