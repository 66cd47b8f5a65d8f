pub mod account;
pub mod ledger;
pub mod pagination;
pub mod plan;
pub mod subscription;
pub mod user;

pub use account::*;
pub use ledger::*;
pub use pagination::*;
pub use plan::*;
pub use subscription::*;
pub use user::*;
