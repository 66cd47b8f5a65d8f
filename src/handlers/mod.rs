pub mod account;
pub mod auth;
pub mod plan;
pub mod subscription;
pub mod transaction;
pub mod user;
pub mod webhook;

pub use account::account_config;
pub use auth::auth_config;
pub use plan::plan_config;
pub use subscription::subscription_config;
pub use transaction::transaction_config;
pub use user::user_config;
pub use webhook::webhook_config;
