pub mod accounts;
pub mod billing_ledger;
pub mod plans;
pub mod subscriptions;
pub mod users;

pub use accounts as account_entity;
pub use billing_ledger as billing_ledger_entity;
pub use plans as plan_entity;
pub use subscriptions as subscription_entity;
pub use users as user_entity;

pub use subscriptions::{PeriodUnit, SubscriptionStatus};
