//! Session and MFA challenge cookies.
//!
//! The dashboard keeps the account-service tokens in its own HttpOnly
//! cookies; browsers never talk to the account service directly.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub const SESSION_COOKIE_NAME: &str = "xc_session";
pub const MFA_COOKIE_NAME: &str = "xc_mfa_challenge";

/// 24 hours
pub const SESSION_DEFAULT_MAX_AGE: i64 = 60 * 60 * 24;
/// 10 minutes
pub const MFA_DEFAULT_MAX_AGE: i64 = 60 * 10;

/// Attributes shared by every cookie the gateway sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Builds a `Set-Cookie` header value.
    pub fn build(&self, name: &str, value: &str, max_age: i64) -> String {
        let mut parts = vec![
            format!("{}={}", name, value),
            "Path=/".to_string(),
            format!("Max-Age={}", max_age.max(0)),
            "HttpOnly".to_string(),
        ];
        if self.secure {
            parts.push("Secure".to_string());
        }
        parts.push("SameSite=Strict".to_string());
        parts.join("; ")
    }

    /// Session cookie; non-positive or missing max-age uses the 24h default.
    pub fn session_cookie(&self, token: &str, max_age: Option<i64>) -> String {
        let max_age = max_age.filter(|age| *age > 0).unwrap_or(SESSION_DEFAULT_MAX_AGE);
        self.build(SESSION_COOKIE_NAME, token, max_age)
    }

    pub fn clear_session_cookie(&self) -> String {
        self.build(SESSION_COOKIE_NAME, "", 0)
    }

    /// MFA challenge cookie; non-positive or missing max-age uses the 10 minute default.
    pub fn mfa_cookie(&self, token: &str, max_age: Option<i64>) -> String {
        let max_age = max_age.filter(|age| *age > 0).unwrap_or(MFA_DEFAULT_MAX_AGE);
        self.build(MFA_COOKIE_NAME, token, max_age)
    }

    pub fn clear_mfa_cookie(&self) -> String {
        self.build(MFA_COOKIE_NAME, "", 0)
    }
}

/// Parses a `Cookie` request header (`a=1; b=2`).
///
/// Pairs without a name are dropped; a repeated name keeps the last value.
pub fn parse_cookie_header(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| {
            let pair = pair.trim();
            let (name, value) = pair.split_once('=')?;
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Seconds until `expires_at`, or `fallback` when it is missing, unparseable or past.
pub fn derive_max_age_from_expires(
    expires_at: Option<&str>,
    now: DateTime<Utc>,
    fallback: i64,
) -> i64 {
    let Some(expires_at) = expires_at.map(str::trim).filter(|s| !s.is_empty()) else {
        return fallback;
    };
    match DateTime::parse_from_rfc3339(expires_at) {
        Ok(expiry) => {
            let remaining = expiry.with_timezone(&Utc).signed_duration_since(now).num_seconds();
            if remaining > 0 { remaining } else { fallback }
        }
        Err(_) => fallback,
    }
}

/// Interprets common boolean spellings (`1/true/yes/on`, `0/false/no/off`).
pub fn parse_bool_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = CookiePolicy::new(true).session_cookie("tok", None);
        assert_eq!(
            cookie,
            "xc_session=tok; Path=/; Max-Age=86400; HttpOnly; Secure; SameSite=Strict"
        );

        let cookie = CookiePolicy::new(false).mfa_cookie("m", Some(-5));
        assert_eq!(cookie, "xc_mfa_challenge=m; Path=/; Max-Age=600; HttpOnly; SameSite=Strict");
    }

    #[test]
    fn test_clear_cookies_expire_immediately() {
        let policy = CookiePolicy::default();
        assert!(policy.clear_session_cookie().starts_with("xc_session=; Path=/; Max-Age=0"));
        assert!(policy.clear_mfa_cookie().starts_with("xc_mfa_challenge=; Path=/; Max-Age=0"));
    }

    #[test]
    fn test_parse_cookie_header() {
        let cookies = parse_cookie_header("xc_session=abc; theme=dark; =orphan; broken; token=a=b");
        assert_eq!(cookies.get("xc_session").map(String::as_str), Some("abc"));
        assert_eq!(cookies.get("theme").map(String::as_str), Some("dark"));
        assert_eq!(cookies.get("token").map(String::as_str), Some("a=b"));
        assert_eq!(cookies.len(), 3);
    }

    #[test]
    fn test_derive_max_age() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            derive_max_age_from_expires(Some("2024-01-01T01:00:00Z"), now, 10),
            3600
        );
        assert_eq!(derive_max_age_from_expires(Some("2023-12-31T00:00:00Z"), now, 10), 10);
        assert_eq!(derive_max_age_from_expires(Some("tomorrow"), now, 10), 10);
        assert_eq!(derive_max_age_from_expires(None, now, 10), 10);
    }

    #[test]
    fn test_parse_bool_flag() {
        assert_eq!(parse_bool_flag(" YES "), Some(true));
        assert_eq!(parse_bool_flag("off"), Some(false));
        assert_eq!(parse_bool_flag("maybe"), None);
    }
}
