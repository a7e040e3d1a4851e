//! Request routing.
//!
//! ```text
//! /healthz
//! /api/auth/login              POST | DELETE
//! /api/auth/session            GET | DELETE
//! /api/auth/mfa/setup          POST
//! /api/auth/mfa/verify         POST
//! /api/auth/mfa/disable        POST
//! /api/auth/mfa/status         GET
//! /api/downloads               GET   raw download index
//! /api/download[/<path>]       GET   download home or listing page
//! /api/docs                    GET
//! /api/templates[?category=]   GET
//! /api/cms[?page=&bypassAppShell=]
//! /api/panel/<extension>[/<slug>]
//! ```
//!
//! Read-only routes answer `GET` and `HEAD`. Unknown paths are 404 for any method.

use crate::response::{self, HttpResponse};
use bytes::Bytes;
use hyper::header::COOKIE;
use hyper::{Method, Request, StatusCode};
use serde_json::json;
use std::collections::HashMap;
use xcontrol_application::{AppServices, AuthGateway};
use xcontrol_core::cms::HOME_PAGE;
use xcontrol_core::extension::AccessDecision;
use xcontrol_core::session::{parse_bool_flag, parse_cookie_header};

const DOWNLOAD_MODULE: &str = "/download";
const READ_ONLY_METHODS: &str = "GET, HEAD";

/// Parsed request line and headers shared by every handler.
struct RequestContext {
    cookies: HashMap<String, String>,
    query: HashMap<String, String>,
}

pub async fn route(services: &AppServices, request: Request<Bytes>) -> HttpResponse {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    tracing::debug!("{} {}", method, path);

    let context = RequestContext {
        cookies: request
            .headers()
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|header| parse_cookie_header(header).into_iter())
            .collect(),
        query: parse_query(request.uri().query()),
    };
    let body = request.into_body();

    let normalized = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    let read_only = matches!(method, Method::GET | Method::HEAD);

    match normalized {
        "/api/auth/login" => match method {
            Method::POST => response::from_gateway(services.auth.login(&body).await),
            Method::DELETE => response::from_gateway(services.auth.abandon_login(&context.cookies)),
            _ => response::from_gateway(AuthGateway::method_not_allowed(Some(false))),
        },
        "/api/auth/session" => match method {
            Method::GET => response::from_gateway(services.auth.session(&context.cookies).await),
            Method::DELETE => response::from_gateway(services.auth.logout(&context.cookies).await),
            _ => response::method_not_allowed("GET, DELETE"),
        },
        "/api/auth/mfa/setup" => match method {
            Method::POST => {
                response::from_gateway(services.auth.mfa_setup(&context.cookies, &body).await)
            }
            _ => response::from_gateway(AuthGateway::method_not_allowed(Some(true))),
        },
        "/api/auth/mfa/verify" => match method {
            Method::POST => {
                response::from_gateway(services.auth.mfa_verify(&context.cookies, &body).await)
            }
            _ => response::from_gateway(AuthGateway::method_not_allowed(Some(true))),
        },
        "/api/auth/mfa/disable" => match method {
            Method::POST => response::from_gateway(services.auth.mfa_disable(&context.cookies).await),
            _ => response::from_gateway(AuthGateway::method_not_allowed(None)),
        },
        "/api/auth/mfa/status" => match method {
            Method::GET => response::from_gateway(
                services
                    .auth
                    .mfa_status(&context.cookies, &context.query)
                    .await,
            ),
            _ => response::method_not_allowed("GET"),
        },
        "/healthz" | "/api/downloads" | "/api/download" | "/api/docs" | "/api/templates"
        | "/api/cms"
            if !read_only =>
        {
            response::method_not_allowed(READ_ONLY_METHODS)
        }
        "/healthz" => response::ok(&json!({ "status": "ok" })),
        "/api/downloads" => response::ok(&services.manifests.downloads_index().await),
        "/api/download" => download_home(services).await,
        "/api/docs" => response::ok(&services.manifests.docs_index().await),
        "/api/templates" => {
            let category = context.query.get("category").map(String::as_str);
            response::ok(&services.manifests.templates(category).await)
        }
        "/api/cms" => cms_overview(services, &context),
        other => {
            if let Some(rest) = other.strip_prefix("/api/download/") {
                if !read_only {
                    return response::method_not_allowed(READ_ONLY_METHODS);
                }
                download_listing(services, rest).await
            } else if let Some(rest) = other.strip_prefix("/api/panel/") {
                if !read_only {
                    return response::method_not_allowed(READ_ONLY_METHODS);
                }
                panel(services, &context, rest).await
            } else {
                response::not_found()
            }
        }
    }
}

async fn download_home(services: &AppServices) -> HttpResponse {
    if !services.is_module_enabled(DOWNLOAD_MODULE) {
        tracing::debug!("Download module disabled");
        return response::not_found();
    }
    match services.downloads.home().await {
        Ok(home) => response::ok(&home),
        Err(e) => {
            tracing::error!("Failed to build download home: {}", e);
            response::internal_error()
        }
    }
}

async fn download_listing(services: &AppServices, raw_path: &str) -> HttpResponse {
    if !services.is_module_enabled(DOWNLOAD_MODULE) {
        return response::not_found();
    }
    let decoded = match urlencoding::decode(raw_path) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => return response::not_found(),
    };
    match services.downloads.listing(&decoded).await {
        Ok(Some(page)) => response::ok(&page),
        Ok(None) => response::not_found(),
        Err(e) => {
            tracing::error!("Failed to load download listing '{}': {}", decoded, e);
            response::internal_error()
        }
    }
}

fn cms_overview(services: &AppServices, context: &RequestContext) -> HttpResponse {
    let page = context
        .query
        .get("page")
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .unwrap_or(HOME_PAGE);
    let bypass_app_shell = context
        .query
        .get("bypassAppShell")
        .and_then(|value| parse_bool_flag(value))
        .unwrap_or(false);
    response::ok(&services.cms.overview(page, bypass_app_shell))
}

/// Route resolution plus the navigation visible to the current user.
async fn panel(services: &AppServices, context: &RequestContext, rest: &str) -> HttpResponse {
    let (extension, slug) = rest.split_once('/').unwrap_or((rest, ""));
    let user = services.auth.current_user(&context.cookies).await;

    let Some(route) = services.user_center.resolve(extension, slug, user.as_ref()) else {
        return response::not_found();
    };
    let navigation = services
        .user_center
        .navigation(extension, user.as_ref())
        .unwrap_or_default();
    let status = match route.access {
        AccessDecision::Allowed => StatusCode::OK,
        AccessDecision::LoginRequired => StatusCode::UNAUTHORIZED,
        AccessDecision::Forbidden { .. } => StatusCode::FORBIDDEN,
    };
    response::json_response(
        status,
        &json!({
            "found": true,
            "route": route,
            "navigation": navigation,
        }),
    )
}

/// Decodes `a=1&b=two%20words`. A repeated key keeps the first value.
fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.unwrap_or_default().split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let decode = |raw: &str| {
            let raw = raw.replace('+', " ");
            urlencoding::decode(&raw)
                .map(|decoded| decoded.into_owned())
                .unwrap_or(raw)
        };
        params.entry(decode(key)).or_insert_with(|| decode(value));
    }
    params
}
