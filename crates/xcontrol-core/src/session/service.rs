//! Account service interface.
//!
//! The account service owns sessions and MFA. The dashboard only forwards
//! requests to it, so the trait speaks in raw upstream responses.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status and JSON body returned by the account service.
///
/// Bodies that are not valid JSON are represented as an empty object.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// A string field of the body, trimmed, if present and non-empty.
    pub fn string_field(&self, name: &str) -> Option<&str> {
        self.body
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The upstream `error` code, if any.
    pub fn error_code(&self) -> Option<&str> {
        self.string_field("error")
    }
}

/// Body of a password login.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totp_code: Option<String>,
}

/// Body of a TOTP provisioning request.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TotpProvisionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

/// Body of a TOTP verification request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TotpVerifyRequest {
    pub token: String,
    pub code: String,
}

/// Query of an MFA status lookup.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct MfaStatusQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

/// Client of the external account service.
///
/// `Err` means the service could not be reached or timed out. Any HTTP
/// response, including 4xx/5xx, is returned as `Ok(UpstreamResponse)`.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// `GET /session` with the session token as bearer.
    async fn fetch_session(&self, session_token: &str) -> Result<UpstreamResponse>;

    /// `POST /login`.
    async fn login(&self, request: &LoginRequest) -> Result<UpstreamResponse>;

    /// `DELETE /session` with the session token as bearer.
    async fn delete_session(&self, session_token: &str) -> Result<()>;

    /// `POST /mfa/totp/provision`.
    async fn provision_totp(
        &self,
        session_token: Option<&str>,
        request: &TotpProvisionRequest,
    ) -> Result<UpstreamResponse>;

    /// `POST /mfa/totp/verify`.
    async fn verify_totp(&self, request: &TotpVerifyRequest) -> Result<UpstreamResponse>;

    /// `POST /mfa/disable` with the session token as bearer.
    async fn disable_mfa(&self, session_token: &str) -> Result<UpstreamResponse>;

    /// `GET /mfa/status`.
    async fn mfa_status(
        &self,
        session_token: Option<&str>,
        query: &MfaStatusQuery,
    ) -> Result<UpstreamResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upstream_response_helpers() {
        let response = UpstreamResponse::new(429, json!({"error": " rate_limited ", "retryAt": 5}));
        assert!(!response.is_success());
        assert_eq!(response.error_code(), Some("rate_limited"));
        assert_eq!(response.string_field("retryAt"), None);
        assert!(UpstreamResponse::new(204, json!({})).is_success());
    }

    #[test]
    fn test_login_request_wire_names() {
        let request = LoginRequest {
            email: "ada@svc.plus".into(),
            password: "secret".into(),
            totp_code: Some("123456".into()),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"email": "ada@svc.plus", "password": "secret", "totpCode": "123456"})
        );
    }

    #[test]
    fn test_provision_request_skips_empty_fields() {
        let request = TotpProvisionRequest {
            token: Some("t".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&request).unwrap(), json!({"token": "t"}));
    }
}
