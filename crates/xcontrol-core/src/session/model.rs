//! Session user domain model.

use serde::{Deserialize, Serialize};

/// Dashboard role, ordered by privilege (`Guest < User < Operator < Admin`).
#[derive(
    Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Guest,
    User,
    Operator,
    Admin,
}

impl UserRole {
    /// Maps an upstream role string onto a dashboard role.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Missing, empty or unrecognised values map to [`UserRole::Guest`].
    pub fn parse(input: Option<&str>) -> Self {
        let Some(input) = input else {
            return UserRole::Guest;
        };
        match input.trim().to_lowercase().as_str() {
            "admin" | "administrator" => UserRole::Admin,
            "operator" | "ops" => UserRole::Operator,
            "user" | "member" => UserRole::User,
            _ => UserRole::Guest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Guest => "guest",
            UserRole::User => "user",
            UserRole::Operator => "operator",
            UserRole::Admin => "admin",
        }
    }
}

/// Membership of the user in a tenant.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TenantMembership {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

/// TOTP state reported by the account service.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MfaStatus {
    pub totp_enabled: bool,
    /// Provisioned but not yet confirmed. Never true while enabled.
    pub totp_pending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totp_secret_issued_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totp_confirmed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totp_locked_until: Option<String>,
}

/// The normalized signed-in user.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub uuid: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub username: String,
    pub mfa_enabled: bool,
    pub mfa_pending: bool,
    pub mfa: MfaStatus,
    pub role: UserRole,
    pub groups: Vec<String>,
    pub permissions: Vec<String>,
    pub is_guest: bool,
    pub is_user: bool,
    pub is_operator: bool,
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenants: Option<Vec<TenantMembership>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(UserRole::parse(Some(" Administrator ")), UserRole::Admin);
        assert_eq!(UserRole::parse(Some("OPS")), UserRole::Operator);
        assert_eq!(UserRole::parse(Some("member")), UserRole::User);
        assert_eq!(UserRole::parse(Some("superuser")), UserRole::Guest);
        assert_eq!(UserRole::parse(Some("   ")), UserRole::Guest);
        assert_eq!(UserRole::parse(None), UserRole::Guest);
    }

    #[test]
    fn test_role_ordering() {
        assert!(UserRole::Guest < UserRole::User);
        assert!(UserRole::User < UserRole::Operator);
        assert!(UserRole::Operator < UserRole::Admin);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Operator).unwrap(), "\"operator\"");
        assert_eq!(UserRole::Admin.as_str(), "admin");
    }
}
