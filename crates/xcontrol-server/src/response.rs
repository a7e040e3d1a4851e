//! JSON response construction.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, ALLOW, CACHE_CONTROL, CONTENT_TYPE, SET_COOKIE};
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::json;
use xcontrol_application::GatewayResponse;

pub type HttpResponse = Response<Full<Bytes>>;

pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> HttpResponse {
    let payload = match serde_json::to_vec(body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Failed to serialize response body: {}", e);
            return internal_error();
        }
    };
    let mut response = Response::new(Full::new(Bytes::from(payload)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

pub fn ok<T: Serialize + ?Sized>(body: &T) -> HttpResponse {
    json_response(StatusCode::OK, body)
}

/// `404 {found: false}`.
pub fn not_found() -> HttpResponse {
    json_response(StatusCode::NOT_FOUND, &json!({ "found": false }))
}

pub fn internal_error() -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::from_static(
        br#"{"error":"internal_error"}"#,
    )));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// 405 with an `Allow` header.
pub fn method_not_allowed(allow: &'static str) -> HttpResponse {
    let mut response = json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &json!({ "success": false, "error": "method_not_allowed" }),
    );
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static(allow));
    response
}

/// Auth responses carry cookies and must never be cached.
pub fn from_gateway(gateway: GatewayResponse) -> HttpResponse {
    let status = StatusCode::from_u16(gateway.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = json_response(status, &gateway.body);
    let headers = response.headers_mut();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    for cookie in &gateway.set_cookies {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("Dropping invalid Set-Cookie value: {}", e),
        }
    }
    if let Some(allow) = gateway.allow {
        headers.insert(ALLOW, HeaderValue::from_static(allow));
    }
    response
}
