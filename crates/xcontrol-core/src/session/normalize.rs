//! Normalization of account-service user payloads.
//!
//! The account service is an external collaborator and its payloads are
//! loosely typed, so normalization works on `serde_json::Value` and treats a
//! field of the wrong type as absent.

use super::model::{MfaStatus, SessionUser, TenantMembership, UserRole};
use serde_json::{Map, Value};

fn trimmed_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value.and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .filter_map(|item| trimmed_string(Some(item)))
            .collect(),
        None => Vec::new(),
    }
}

fn flag(value: Option<&Value>) -> Option<bool> {
    value.and_then(Value::as_bool)
}

fn normalize_tenants(value: Option<&Value>) -> Option<Vec<TenantMembership>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|tenant| {
                let tenant = tenant.as_object()?;
                let id = trimmed_string(tenant.get("id"))?;
                let role = trimmed_string(tenant.get("role"))
                    .map(|role| UserRole::parse(Some(role.as_str())));
                Some(TenantMembership {
                    id,
                    name: trimmed_string(tenant.get("name")),
                    role,
                })
            })
            .collect(),
    )
}

fn normalize_mfa(raw: Option<&Map<String, Value>>, mfa_enabled: bool, mfa_pending: bool) -> MfaStatus {
    let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
        return MfaStatus {
            totp_enabled: mfa_enabled,
            totp_pending: mfa_pending,
            ..MfaStatus::default()
        };
    };

    let totp_enabled = flag(raw.get("totpEnabled")).unwrap_or(mfa_enabled);
    let totp_pending = flag(raw.get("totpPending")).unwrap_or(mfa_pending)
        && !totp_enabled
        && !mfa_enabled;

    MfaStatus {
        totp_enabled,
        totp_pending,
        totp_secret_issued_at: trimmed_string(raw.get("totpSecretIssuedAt")),
        totp_confirmed_at: trimmed_string(raw.get("totpConfirmedAt")),
        totp_locked_until: trimmed_string(raw.get("totpLockedUntil")),
    }
}

/// Normalizes a raw account-service user.
///
/// Returns `None` when the payload is not an object or carries no usable
/// identifier (`uuid`, falling back to `id`).
pub fn normalize_user(raw: &Value) -> Option<SessionUser> {
    let user = raw.as_object()?;

    let identifier =
        trimmed_string(user.get("uuid")).or_else(|| trimmed_string(user.get("id")))?;

    let raw_mfa = user.get("mfa").and_then(Value::as_object);
    let mfa_enabled = flag(user.get("mfaEnabled"))
        .or_else(|| raw_mfa.and_then(|mfa| flag(mfa.get("totpEnabled"))))
        .unwrap_or(false);
    let mfa_pending = flag(user.get("mfaPending"))
        .or_else(|| raw_mfa.and_then(|mfa| flag(mfa.get("totpPending"))))
        .unwrap_or(false)
        && !mfa_enabled;

    let role = UserRole::parse(user.get("role").and_then(Value::as_str));
    let email = user
        .get("email")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    let name = trimmed_string(user.get("name"));
    let username = trimmed_string(user.get("username"))
        .or_else(|| name.clone())
        .unwrap_or_else(|| email.clone());

    Some(SessionUser {
        id: identifier.clone(),
        uuid: identifier,
        email,
        name,
        username,
        mfa_enabled,
        mfa_pending,
        mfa: normalize_mfa(raw_mfa, mfa_enabled, mfa_pending),
        role,
        groups: string_list(user.get("groups")),
        permissions: string_list(user.get("permissions")),
        is_guest: role == UserRole::Guest,
        is_user: role == UserRole::User,
        is_operator: role == UserRole::Operator,
        is_admin: role == UserRole::Admin,
        tenant_id: trimmed_string(user.get("tenantId")),
        tenants: normalize_tenants(user.get("tenants")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifier_prefers_uuid() {
        let user = normalize_user(&json!({"id": "legacy", "uuid": " u-1 ", "email": "a@b.c"})).unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.uuid, "u-1");

        let user = normalize_user(&json!({"id": "legacy", "uuid": "  ", "email": "a@b.c"})).unwrap();
        assert_eq!(user.id, "legacy");

        assert!(normalize_user(&json!({"email": "a@b.c"})).is_none());
        assert!(normalize_user(&json!("not an object")).is_none());
    }

    #[test]
    fn test_invalid_role_becomes_guest() {
        for role in [json!("root"), json!(42), json!(null), json!("")] {
            let user = normalize_user(&json!({"id": "1", "email": "a@b.c", "role": role})).unwrap();
            assert_eq!(user.role, UserRole::Guest);
            assert!(user.is_guest);
            assert!(!user.is_admin);
        }
        let user = normalize_user(&json!({"id": "1", "email": "a@b.c"})).unwrap();
        assert_eq!(user.role, UserRole::Guest);
    }

    #[test]
    fn test_known_role_flags() {
        let user = normalize_user(&json!({"id": "1", "email": "a@b.c", "role": "Admin"})).unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert!(user.is_admin);
        assert!(!user.is_guest);
    }

    #[test]
    fn test_enabled_implies_not_pending() {
        let cases = [
            json!({"mfaEnabled": true, "mfaPending": true}),
            json!({"mfaEnabled": true, "mfa": {"totpPending": true}}),
            json!({"mfa": {"totpEnabled": true, "totpPending": true}}),
            json!({"mfaEnabled": true, "mfa": {"totpEnabled": false, "totpPending": true}}),
        ];
        for mut case in cases {
            case["id"] = json!("1");
            case["email"] = json!("a@b.c");
            let user = normalize_user(&case).unwrap();
            assert!(user.mfa_enabled, "case {case}");
            assert!(!user.mfa_pending, "case {case}");
            assert!(!user.mfa.totp_pending, "case {case}");
        }
    }

    #[test]
    fn test_pending_without_enabled() {
        let user = normalize_user(&json!({
            "id": "1",
            "email": "a@b.c",
            "mfa": {"totpPending": true, "totpSecretIssuedAt": "2024-01-01T00:00:00Z"}
        }))
        .unwrap();
        assert!(!user.mfa_enabled);
        assert!(user.mfa_pending);
        assert!(user.mfa.totp_pending);
        assert_eq!(user.mfa.totp_secret_issued_at.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_lists_and_names() {
        let user = normalize_user(&json!({
            "id": "1",
            "email": "ops@example.com",
            "name": "  Ada  ",
            "groups": [" admins ", "", 3, "dev"],
            "permissions": "not-a-list",
            "tenantId": " t-1 ",
            "tenants": [{"id": "t-1", "name": " Acme ", "role": "OPS"}, {"name": "no id"}, "junk"]
        }))
        .unwrap();
        assert_eq!(user.name.as_deref(), Some("Ada"));
        assert_eq!(user.username, "Ada");
        assert_eq!(user.groups, vec!["admins", "dev"]);
        assert!(user.permissions.is_empty());
        assert_eq!(user.tenant_id.as_deref(), Some("t-1"));

        let tenants = user.tenants.unwrap();
        assert_eq!(tenants.len(), 1);
        assert_eq!(tenants[0].name.as_deref(), Some("Acme"));
        assert_eq!(tenants[0].role, Some(UserRole::Operator));
    }

    #[test]
    fn test_username_falls_back_to_email() {
        let user = normalize_user(&json!({"id": "1", "email": "a@b.c"})).unwrap();
        assert_eq!(user.username, "a@b.c");
        assert!(user.tenants.is_none());
    }
}
