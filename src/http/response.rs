//! HTTP response building module
//!
//! Every response of the service is JSON: either the external command's
//! output passed through untouched, or an `{"error": "..."}` object.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Build a JSON response around an already serialized body
pub fn build_json_response(
    status: StatusCode,
    body: Bytes,
    server_name: &str,
) -> Response<Full<Bytes>> {
    let content_length = body.len();
    Response::builder()
        .status(status)
        .header("Content-Type", JSON_CONTENT_TYPE)
        .header("Content-Length", content_length)
        .header("Server", server_name)
        .body(Full::new(body.clone()))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(body))
        })
}

/// Build a dispatcher-generated `{"error": message}` response
pub fn build_error_response(
    status: StatusCode,
    message: &str,
    server_name: &str,
) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": message }).to_string();
    build_json_response(status, Bytes::from(body), server_name)
}

/// Build 404 Not Found response
pub fn build_404_response(server_name: &str) -> Response<Full<Bytes>> {
    build_error_response(StatusCode::NOT_FOUND, "Not Found", server_name)
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
