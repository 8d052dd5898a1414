//! Accounts, access control and wallets.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::null_as_default;
use crate::types::{CurrencyCode, GroupId, PermissionId, Price, RoleId, UserId, WalletId};

/// A registered user as returned by the profile and user endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "ID", default)]
    pub id: UserId,
    #[serde(alias = "Username", default)]
    pub username: String,
    #[serde(alias = "Email", default)]
    pub email: String,
    #[serde(alias = "Phone", default)]
    pub phone: Option<String>,
    #[serde(alias = "Avatar", default)]
    pub avatar: Option<String>,
    #[serde(alias = "Roles", default, deserialize_with = "null_as_default")]
    pub roles: Vec<Role>,
    #[serde(alias = "Groups", default, deserialize_with = "null_as_default")]
    pub groups: Vec<Group>,
}

impl User {
    /// Role names in the order the backend listed them.
    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(|r| r.name.as_str())
    }
}

/// Named role assignable to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(alias = "ID", default)]
    pub id: RoleId,
    #[serde(alias = "Name", default)]
    pub name: String,
    #[serde(alias = "Description", default)]
    pub description: Option<String>,
    #[serde(
        alias = "Permissions",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub permissions: Vec<Permission>,
}

/// Pricing and visibility group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(alias = "ID", default)]
    pub id: GroupId,
    #[serde(alias = "Name", default)]
    pub name: String,
    #[serde(alias = "Description", default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    #[serde(alias = "ID", default)]
    pub id: PermissionId,
    #[serde(alias = "Name", default)]
    pub name: String,
    #[serde(alias = "Description", default)]
    pub description: Option<String>,
}

fn default_currency() -> String {
    CurrencyCode::default().code().to_owned()
}

/// A user's stored balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    #[serde(alias = "ID", default)]
    pub id: WalletId,
    #[serde(alias = "UserID", default)]
    pub user_id: Option<UserId>,
    #[serde(alias = "Balance", default)]
    pub balance: Decimal,
    /// ISO code as stored by the backend.
    #[serde(alias = "Currency", default = "default_currency")]
    pub currency: String,
    #[serde(alias = "UpdatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Wallet {
    /// Balance as a displayable price. Unknown codes fall back to rial.
    #[must_use]
    pub fn balance_price(&self) -> Price {
        let code = CurrencyCode::from_code(&self.currency).unwrap_or_default();
        Price::new(self.balance, code)
    }
}

// =============================================================================
// Request Payloads
// =============================================================================

/// Body of the user create and update endpoints.
///
/// Every field is optional so the same shape serves partial updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub role_ids: Vec<RoleId>,
}

/// Body for creating roles, permissions and groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NamedInput {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}
