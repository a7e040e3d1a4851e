//! HTTP client for the external account service.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::time::Duration;
use xcontrol_core::session::{
    AccountService, LoginRequest, MfaStatusQuery, TotpProvisionRequest, TotpVerifyRequest,
    UpstreamResponse,
};
use xcontrol_core::{Result, XControlError};

pub const SESSION_TIMEOUT: Duration = Duration::from_secs(5);
pub const MFA_TIMEOUT: Duration = Duration::from_secs(10);
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(10);

/// [`AccountService`] over HTTP, rooted at `<account url>/api/auth`.
///
/// No retries: a transport failure surfaces as `XControlError::Upstream`
/// without a status.
#[derive(Clone)]
pub struct HttpAccountService {
    client: Client,
    api_base_url: String,
}

impl HttpAccountService {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    fn with_bearer(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, label: &str, request: RequestBuilder) -> Result<UpstreamResponse> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("Account service {} request failed: {}", label, e);
            XControlError::unreachable(format!("{}: {}", label, e))
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            tracing::error!("Account service {} response unreadable: {}", label, e);
            XControlError::unreachable(format!("{}: {}", label, e))
        })?;
        let body = parse_body(&text);
        tracing::debug!("Account service {} -> {}", label, status);
        Ok(UpstreamResponse::new(status, body))
    }
}

/// Non-JSON bodies become an empty object.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return json!({});
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({}))
}

#[async_trait]
impl AccountService for HttpAccountService {
    async fn fetch_session(&self, session_token: &str) -> Result<UpstreamResponse> {
        let request = self
            .client
            .get(self.url("/session"))
            .header("Accept", "application/json")
            .timeout(SESSION_TIMEOUT);
        self.send("session", Self::with_bearer(request, Some(session_token)))
            .await
    }

    async fn login(&self, request: &LoginRequest) -> Result<UpstreamResponse> {
        let builder = self
            .client
            .post(self.url("/login"))
            .json(request)
            .timeout(LOGIN_TIMEOUT);
        self.send("login", builder).await
    }

    async fn delete_session(&self, session_token: &str) -> Result<()> {
        let request = self
            .client
            .delete(self.url("/session"))
            .header("Accept", "application/json")
            .timeout(SESSION_TIMEOUT);
        self.send("logout", Self::with_bearer(request, Some(session_token)))
            .await
            .map(|_| ())
    }

    async fn provision_totp(
        &self,
        session_token: Option<&str>,
        request: &TotpProvisionRequest,
    ) -> Result<UpstreamResponse> {
        let builder = self
            .client
            .post(self.url("/mfa/totp/provision"))
            .json(request)
            .timeout(MFA_TIMEOUT);
        self.send("mfa provision", Self::with_bearer(builder, session_token))
            .await
    }

    async fn verify_totp(&self, request: &TotpVerifyRequest) -> Result<UpstreamResponse> {
        let builder = self
            .client
            .post(self.url("/mfa/totp/verify"))
            .json(request)
            .timeout(MFA_TIMEOUT);
        self.send("mfa verify", builder).await
    }

    async fn disable_mfa(&self, session_token: &str) -> Result<UpstreamResponse> {
        let builder = self
            .client
            .post(self.url("/mfa/disable"))
            .timeout(MFA_TIMEOUT);
        self.send("mfa disable", Self::with_bearer(builder, Some(session_token)))
            .await
    }

    async fn mfa_status(
        &self,
        session_token: Option<&str>,
        query: &MfaStatusQuery,
    ) -> Result<UpstreamResponse> {
        let builder = self
            .client
            .get(self.url("/mfa/status"))
            .query(query)
            .header("Accept", "application/json")
            .timeout(MFA_TIMEOUT);
        self.send("mfa status", Self::with_bearer(builder, session_token))
            .await
    }
}
