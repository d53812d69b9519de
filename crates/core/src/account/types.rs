//! External account types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which external party an account authenticates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Marketplace seller API (order listing).
    Marketplace,
    /// Shipping carrier API (label printing).
    Carrier,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Marketplace => "marketplace",
            AccountKind::Carrier => "carrier",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "marketplace" => Some(AccountKind::Marketplace),
            "carrier" => Some(AccountKind::Carrier),
            _ => None,
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tenant-owned credential set for one external service.
///
/// The credential pair is opaque to this module: for carrier accounts it is
/// an OAuth client id/secret, for marketplace accounts a client id/API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalAccount {
    pub id: i64,
    pub tenant_id: i64,
    pub kind: AccountKind,
    /// Display name, used in error messages shown to the tenant.
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    /// Warehouse filter for marketplace order listing (marketplace only).
    pub warehouse: Option<String>,
    pub is_default: bool,
}

/// Request to create a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub tenant_id: i64,
    pub kind: AccountKind,
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub warehouse: Option<String>,
}

/// Fields that can be edited on an existing account.
///
/// The default flag is managed separately via `set_default` so the
/// one-default-per-kind invariant has a single mutation path.
#[derive(Debug, Clone)]
pub struct AccountUpdate {
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub warehouse: Option<String>,
}
