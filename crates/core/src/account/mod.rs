//! Tenant-owned external service accounts.
//!
//! Each tenant holds any number of marketplace-shop and carrier-account
//! credential sets; one per kind is flagged as the default and picked up by
//! the workflows when no explicit account is given.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteAccountStore;
pub use store::{AccountError, AccountStore};
pub use types::{AccountKind, AccountUpdate, ExternalAccount, NewAccount};
