//! Session and MFA proxy.
//!
//! Translates between the dashboard's own cookies and bearer tokens of the
//! account service. Every upstream failure degrades to a well-formed JSON
//! response; nothing here returns an error to the HTTP layer.

use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use xcontrol_core::session::{
    derive_max_age_from_expires, normalize_user, AccountService, CookiePolicy, LoginRequest,
    MfaStatusQuery, SessionUser, TotpProvisionRequest, TotpVerifyRequest, MFA_COOKIE_NAME,
    SESSION_COOKIE_NAME, SESSION_DEFAULT_MAX_AGE,
};

pub const ERROR_INVALID_REQUEST: &str = "invalid_request";
pub const ERROR_MISSING_CREDENTIALS: &str = "missing_credentials";
pub const ERROR_AUTHENTICATION_FAILED: &str = "authentication_failed";
pub const ERROR_MFA_TOKEN_REQUIRED: &str = "mfa_token_required";
pub const ERROR_MFA_CODE_REQUIRED: &str = "mfa_code_required";
pub const ERROR_MFA_SETUP_FAILED: &str = "mfa_setup_failed";
pub const ERROR_MFA_VERIFICATION_FAILED: &str = "mfa_verification_failed";
pub const ERROR_MFA_DISABLE_FAILED: &str = "mfa_disable_failed";
pub const ERROR_SESSION_REQUIRED: &str = "session_required";
pub const ERROR_UNREACHABLE: &str = "account_service_unreachable";
pub const ERROR_METHOD_NOT_ALLOWED: &str = "method_not_allowed";

/// Maximum number of digits in a TOTP code.
const MFA_CODE_LENGTH: usize = 6;

/// Session lifetime floor for "remember me" logins (30 days).
pub const REMEMBER_MAX_AGE: i64 = 60 * 60 * 24 * 30;

/// A JSON response plus the cookies to set.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: Value,
    /// `Set-Cookie` header values, in order.
    pub set_cookies: Vec<String>,
    /// `Allow` header for 405 responses.
    pub allow: Option<&'static str>,
}

impl GatewayResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            set_cookies: Vec::new(),
            allow: None,
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn with_cookie(mut self, cookie: String) -> Self {
        self.set_cookies.push(cookie);
        self
    }

    /// `{success: false, error, needMfa?}`.
    fn failure(status: u16, error: &str, need_mfa: Option<bool>) -> Self {
        let mut body = json!({ "success": false, "error": error });
        if let Some(need_mfa) = need_mfa {
            body["needMfa"] = json!(need_mfa);
        }
        Self::new(status, body)
    }

    pub fn error_code(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

/// Trimmed, non-empty cookie value.
fn cookie<'a>(cookies: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    cookies
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn body_string(body: &Value, field: &str) -> Option<String> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// The MFA challenge token: a non-empty body `token`, else the challenge
/// cookie, trimmed. A blank body token does not fall back to the cookie.
fn challenge_token(payload: &Value, cookies: &HashMap<String, String>) -> Option<String> {
    payload
        .get("token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .or_else(|| cookies.get(MFA_COOKIE_NAME).map(String::as_str))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// A TOTP code from `field`, else `fallback`, normalized.
fn totp_code(payload: &Value, field: &str, fallback: &str) -> String {
    payload
        .get(field)
        .filter(|value| !value.is_null())
        .or_else(|| payload.get(fallback))
        .and_then(Value::as_str)
        .map(normalize_mfa_code)
        .unwrap_or_default()
}

/// Digits only, at most six.
pub fn normalize_mfa_code(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(MFA_CODE_LENGTH)
        .collect()
}

/// JavaScript-style truthiness for loosely typed flags.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    }
}

/// Upstream status for a failed call; a 2xx that still failed becomes 400.
fn failure_status(status: u16) -> u16 {
    if (200..300).contains(&status) || status == 0 {
        400
    } else {
        status
    }
}

pub struct AuthGateway {
    account: Arc<dyn AccountService>,
    cookies: CookiePolicy,
}

impl AuthGateway {
    pub fn new(account: Arc<dyn AccountService>, cookies: CookiePolicy) -> Self {
        Self { account, cookies }
    }

    pub fn cookie_policy(&self) -> CookiePolicy {
        self.cookies
    }

    /// The signed-in user, if the session cookie maps to one.
    pub async fn current_user(&self, cookies: &HashMap<String, String>) -> Option<SessionUser> {
        let token = cookie(cookies, SESSION_COOKIE_NAME)?;
        match self.account.fetch_session(token).await {
            Ok(response) if response.is_success() => {
                response.body.get("user").and_then(normalize_user)
            }
            Ok(response) => {
                tracing::debug!("Session lookup rejected with status {}", response.status);
                None
            }
            Err(e) => {
                tracing::warn!("Session lookup failed: {}", e);
                None
            }
        }
    }

    /// `POST /api/auth/login`.
    pub async fn login(&self, body: &[u8]) -> GatewayResponse {
        let payload: Value = match serde_json::from_slice(body) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Invalid login payload: {}", e);
                return GatewayResponse::failure(400, ERROR_INVALID_REQUEST, Some(false));
            }
        };

        let email = payload
            .get("email")
            .and_then(Value::as_str)
            .map(|email| email.trim().to_lowercase())
            .unwrap_or_default();
        let password = payload
            .get("password")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if email.is_empty() || password.is_empty() {
            return GatewayResponse::failure(400, ERROR_MISSING_CREDENTIALS, Some(false));
        }
        let remember = payload.get("remember").is_some_and(is_truthy);
        let code = totp_code(&payload, "totp", "code");

        let request = LoginRequest {
            email,
            password,
            totp_code: (!code.is_empty()).then_some(code),
        };
        let response = match self.account.login(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Account service login proxy failed: {}", e);
                return GatewayResponse::failure(502, ERROR_UNREACHABLE, Some(false))
                    .with_cookie(self.cookies.clear_session_cookie())
                    .with_cookie(self.cookies.clear_mfa_cookie());
            }
        };

        if response.is_success()
            && let Some(session_token) = response.string_field("token")
        {
            let mut max_age = derive_max_age_from_expires(
                response.string_field("expiresAt"),
                Utc::now(),
                SESSION_DEFAULT_MAX_AGE,
            );
            if remember {
                max_age = max_age.max(REMEMBER_MAX_AGE);
            }
            return GatewayResponse::ok(json!({
                "success": true,
                "error": null,
                "needMfa": false,
            }))
            .with_cookie(self.cookies.session_cookie(session_token, Some(max_age)))
            .with_cookie(self.cookies.clear_mfa_cookie());
        }

        let error = response
            .error_code()
            .unwrap_or(ERROR_AUTHENTICATION_FAILED)
            .to_string();
        let needs_mfa = response.body.get("needMfa").is_some_and(is_truthy)
            || error == "mfa_required"
            || error == "mfa_setup_required";
        if (matches!(response.status, 401 | 403) || needs_mfa)
            && let Some(mfa_token) = response.string_field("mfaToken")
        {
            tracing::debug!("Login requires MFA ({})", error);
            return GatewayResponse::failure(401, &error, Some(true))
                .with_cookie(self.cookies.mfa_cookie(mfa_token, None))
                .with_cookie(self.cookies.clear_session_cookie());
        }

        tracing::debug!("Login rejected: {} ({})", error, response.status);
        let status = if response.status == 0 { 401 } else { response.status };
        GatewayResponse::failure(status, &error, Some(false))
            .with_cookie(self.cookies.clear_session_cookie())
            .with_cookie(self.cookies.clear_mfa_cookie())
    }

    /// `DELETE /api/auth/login`: drops a pending challenge and the session.
    pub fn abandon_login(&self, cookies: &HashMap<String, String>) -> GatewayResponse {
        let mut response = GatewayResponse::ok(json!({
            "success": true,
            "error": null,
            "needMfa": false,
        }));
        if cookies.contains_key(MFA_COOKIE_NAME) {
            response = response.with_cookie(self.cookies.clear_mfa_cookie());
        }
        response.with_cookie(self.cookies.clear_session_cookie())
    }

    /// `GET /api/auth/session`.
    pub async fn session(&self, cookies: &HashMap<String, String>) -> GatewayResponse {
        if cookie(cookies, SESSION_COOKIE_NAME).is_none() {
            return GatewayResponse::ok(json!({ "user": null }));
        }
        match self.current_user(cookies).await {
            Some(user) => GatewayResponse::ok(json!({ "user": user })),
            None => GatewayResponse::ok(json!({ "user": null }))
                .with_cookie(self.cookies.clear_session_cookie()),
        }
    }

    /// `DELETE /api/auth/session`. Always succeeds locally.
    pub async fn logout(&self, cookies: &HashMap<String, String>) -> GatewayResponse {
        if let Some(token) = cookie(cookies, SESSION_COOKIE_NAME)
            && let Err(e) = self.account.delete_session(token).await
        {
            tracing::warn!("Upstream logout failed, clearing local session anyway: {}", e);
        }
        GatewayResponse::ok(json!({ "success": true }))
            .with_cookie(self.cookies.clear_session_cookie())
    }

    /// `POST /api/auth/mfa/setup`.
    pub async fn mfa_setup(&self, cookies: &HashMap<String, String>, body: &[u8]) -> GatewayResponse {
        let payload: Value = match serde_json::from_slice(body) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Invalid MFA setup payload: {}", e);
                return GatewayResponse::failure(400, ERROR_INVALID_REQUEST, Some(true));
            }
        };

        let session_token = cookie(cookies, SESSION_COOKIE_NAME);
        let cookie_token = cookie(cookies, MFA_COOKIE_NAME).map(str::to_string);
        let token = challenge_token(&payload, cookies);

        if token.is_none() && session_token.is_none() {
            return GatewayResponse::failure(400, ERROR_MFA_TOKEN_REQUIRED, Some(true));
        }

        let request = TotpProvisionRequest {
            token: token.clone(),
            issuer: body_string(&payload, "issuer"),
            account: body_string(&payload, "account"),
        };

        match self.account.provision_totp(session_token, &request).await {
            Ok(response) if response.is_success() => {
                let next_token = response
                    .string_field("mfaToken")
                    .map(str::to_string)
                    .or(token)
                    .or(cookie_token);
                let mut result = GatewayResponse::ok(json!({
                    "success": true,
                    "error": null,
                    "needMfa": true,
                    "data": response.body,
                }));
                if let Some(next_token) = next_token {
                    result = result.with_cookie(self.cookies.mfa_cookie(&next_token, None));
                }
                result
            }
            Ok(response) => {
                let error = response.error_code().unwrap_or(ERROR_MFA_SETUP_FAILED);
                tracing::debug!("MFA setup rejected: {} ({})", error, response.status);
                GatewayResponse::failure(failure_status(response.status), error, Some(true))
            }
            Err(e) => {
                tracing::error!("Account service MFA setup proxy failed: {}", e);
                GatewayResponse::failure(502, ERROR_UNREACHABLE, Some(true))
            }
        }
    }

    /// `POST /api/auth/mfa/verify`.
    pub async fn mfa_verify(&self, cookies: &HashMap<String, String>, body: &[u8]) -> GatewayResponse {
        let payload: Value = match serde_json::from_slice(body) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Invalid MFA verification payload: {}", e);
                return GatewayResponse::failure(400, ERROR_INVALID_REQUEST, Some(true));
            }
        };

        let token = challenge_token(&payload, cookies);
        let code = totp_code(&payload, "code", "totp");

        let Some(token) = token else {
            return GatewayResponse::failure(400, ERROR_MFA_TOKEN_REQUIRED, Some(true));
        };
        if code.is_empty() {
            return GatewayResponse::failure(400, ERROR_MFA_CODE_REQUIRED, Some(true));
        }

        let request = TotpVerifyRequest {
            token: token.clone(),
            code,
        };
        match self.account.verify_totp(&request).await {
            Ok(response) => {
                if response.is_success()
                    && let Some(session_token) = response.string_field("token")
                {
                    let max_age = derive_max_age_from_expires(
                        response.string_field("expiresAt"),
                        Utc::now(),
                        SESSION_DEFAULT_MAX_AGE,
                    );
                    let session_cookie = self.cookies.session_cookie(session_token, Some(max_age));
                    return GatewayResponse::ok(json!({
                        "success": true,
                        "error": null,
                        "needMfa": false,
                        "data": response.body,
                    }))
                    .with_cookie(session_cookie)
                    .with_cookie(self.cookies.clear_mfa_cookie());
                }

                let error = response
                    .error_code()
                    .unwrap_or(ERROR_MFA_VERIFICATION_FAILED)
                    .to_string();
                let challenge = response
                    .string_field("mfaToken")
                    .unwrap_or(&token)
                    .to_string();
                tracing::debug!("MFA verification rejected: {} ({})", error, response.status);
                GatewayResponse::new(
                    failure_status(response.status),
                    json!({
                        "success": false,
                        "error": error,
                        "needMfa": true,
                        "data": response.body,
                    }),
                )
                .with_cookie(self.cookies.mfa_cookie(&challenge, None))
                .with_cookie(self.cookies.clear_session_cookie())
            }
            Err(e) => {
                tracing::error!("Account service MFA verification proxy failed: {}", e);
                GatewayResponse::failure(502, ERROR_UNREACHABLE, Some(true))
                    .with_cookie(self.cookies.mfa_cookie(&token, None))
                    .with_cookie(self.cookies.clear_session_cookie())
            }
        }
    }

    /// `POST /api/auth/mfa/disable`.
    pub async fn mfa_disable(&self, cookies: &HashMap<String, String>) -> GatewayResponse {
        let Some(session_token) = cookie(cookies, SESSION_COOKIE_NAME) else {
            return GatewayResponse::failure(401, ERROR_SESSION_REQUIRED, None);
        };

        match self.account.disable_mfa(session_token).await {
            Ok(response) if response.is_success() => GatewayResponse::ok(json!({
                "success": true,
                "error": null,
                "data": response.body,
            })),
            Ok(response) => {
                let error = response.error_code().unwrap_or(ERROR_MFA_DISABLE_FAILED);
                if response.status == 401 {
                    return GatewayResponse::failure(401, error, None)
                        .with_cookie(self.cookies.clear_session_cookie());
                }
                GatewayResponse::failure(failure_status(response.status), error, None)
            }
            Err(e) => {
                tracing::error!("Account service MFA disable proxy failed: {}", e);
                GatewayResponse::failure(502, ERROR_UNREACHABLE, None)
            }
        }
    }

    /// `GET /api/auth/mfa/status`. The upstream status and body pass through.
    pub async fn mfa_status(
        &self,
        cookies: &HashMap<String, String>,
        query: &HashMap<String, String>,
    ) -> GatewayResponse {
        let session_token = cookie(cookies, SESSION_COOKIE_NAME);
        let token = query
            .get("token")
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .or_else(|| cookie(cookies, MFA_COOKIE_NAME))
            .map(str::to_string);
        let identifier = query
            .get("identifier")
            .or_else(|| query.get("email"))
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty());

        let status_query = MfaStatusQuery { token, identifier };
        match self.account.mfa_status(session_token, &status_query).await {
            Ok(response) => GatewayResponse::new(response.status, response.body),
            Err(e) => {
                tracing::error!("Account service MFA status proxy failed: {}", e);
                GatewayResponse::failure(502, ERROR_UNREACHABLE, None)
            }
        }
    }

    /// 405 for `GET` on a POST-only auth endpoint.
    pub fn method_not_allowed(need_mfa: Option<bool>) -> GatewayResponse {
        let mut response = GatewayResponse::failure(405, ERROR_METHOD_NOT_ALLOWED, need_mfa);
        response.allow = Some("POST");
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mfa_code() {
        assert_eq!(normalize_mfa_code("12 34-56 78"), "123456");
        assert_eq!(normalize_mfa_code("abc"), "");
        assert_eq!(normalize_mfa_code("０１2"), "2");
    }

    #[test]
    fn test_failure_status() {
        assert_eq!(failure_status(200), 400);
        assert_eq!(failure_status(429), 429);
        assert_eq!(failure_status(0), 400);
    }

    #[test]
    fn test_challenge_token_fallback() {
        let cookies: HashMap<String, String> =
            [(MFA_COOKIE_NAME.to_string(), " from-cookie ".to_string())].into();
        assert_eq!(
            challenge_token(&json!({}), &cookies).as_deref(),
            Some("from-cookie")
        );
        assert_eq!(
            challenge_token(&json!({"token": " body "}), &cookies).as_deref(),
            Some("body")
        );
        // A blank body token wins over the cookie and then trims to nothing.
        assert_eq!(challenge_token(&json!({"token": "   "}), &cookies), None);
        assert_eq!(challenge_token(&json!({"token": ""}), &cookies).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!(1)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&Value::Null));
    }

    #[test]
    fn test_method_not_allowed() {
        let response = AuthGateway::method_not_allowed(Some(true));
        assert_eq!(response.status, 405);
        assert_eq!(response.allow, Some("POST"));
        assert_eq!(response.body["needMfa"], json!(true));

        let response = AuthGateway::method_not_allowed(Some(false));
        assert_eq!(response.body["needMfa"], json!(false));

        let response = AuthGateway::method_not_allowed(None);
        assert!(response.body.get("needMfa").is_none());
        assert_eq!(response.error_code(), Some("method_not_allowed"));
    }
}
