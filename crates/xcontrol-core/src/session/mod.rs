//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Normalized user model (`SessionUser`, `UserRole`, `MfaStatus`)
//! - `normalize`: Conversion of loosely typed account-service payloads
//! - `cookie`: Session/MFA cookie construction and parsing
//! - `service`: `AccountService` trait for the external account service

mod cookie;
mod model;
mod normalize;
mod service;

pub use cookie::{
    derive_max_age_from_expires, parse_bool_flag, parse_cookie_header, CookiePolicy,
    MFA_COOKIE_NAME, MFA_DEFAULT_MAX_AGE, SESSION_COOKIE_NAME, SESSION_DEFAULT_MAX_AGE,
};
pub use model::{MfaStatus, SessionUser, TenantMembership, UserRole};
pub use normalize::normalize_user;
pub use service::{
    AccountService, LoginRequest, MfaStatusQuery, TotpProvisionRequest, TotpVerifyRequest,
    UpstreamResponse,
};
