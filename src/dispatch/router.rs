//! Request dispatch
//!
//! Entry point for HTTP request processing. Every declared (method, path)
//! pair is registered once at startup; a request walks
//! body parse -> validate -> translate -> invoke -> respond.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{invoker, translator, validator};
use crate::config::{AppState, Config};
use crate::error::InvokeError;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::schema::{RouteSpec, SchemaStore};

/// Result of dispatching one request, with what the access log needs
pub struct Dispatched {
    pub response: Response<Full<Bytes>>,
    /// Matched route name, `None` when nothing was registered for the request
    pub endpoint: Option<String>,
    /// Exit code of the external command when it ran to completion
    pub exit_code: Option<i32>,
}

impl Dispatched {
    fn unmatched(response: Response<Full<Bytes>>) -> Self {
        Self {
            response,
            endpoint: None,
            exit_code: None,
        }
    }

    fn matched(spec: &RouteSpec, response: Response<Full<Bytes>>, exit_code: Option<i32>) -> Self {
        Self {
            response,
            endpoint: Some(spec.name.clone()),
            exit_code,
        }
    }
}

/// Immutable handler table built from the schema store
pub struct Dispatcher {
    handlers: HashMap<Method, HashMap<String, Arc<RouteSpec>>>,
    command: String,
    timeout: Option<Duration>,
    fill_defaults: bool,
    max_body_size: u64,
    server_name: String,
}

impl Dispatcher {
    /// Register one handler per declared (method, path) pair
    pub fn new(store: &SchemaStore, config: &Config) -> Self {
        let mut handlers: HashMap<Method, HashMap<String, Arc<RouteSpec>>> = HashMap::new();
        for spec in store.routes() {
            logger::log_route_registered(spec);
            handlers
                .entry(spec.method.clone())
                .or_default()
                .insert(spec.path.clone(), Arc::new(spec.clone()));
        }

        let timeout = match config.service.command_timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Self {
            handlers,
            command: store.command().to_string(),
            timeout,
            fill_defaults: config.service.fill_defaults,
            max_body_size: config.http.max_body_size,
            server_name: config.http.server_name.clone(),
        }
    }

    /// Number of registered (method, path) handlers
    pub fn handler_count(&self) -> usize {
        self.handlers.values().map(HashMap::len).sum()
    }

    pub fn lookup(&self, method: &Method, path: &str) -> Option<&Arc<RouteSpec>> {
        self.handlers.get(method)?.get(path)
    }

    /// Run one request through the pipeline
    pub async fn dispatch<B>(&self, req: Request<B>) -> Dispatched
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = req.method().clone();
        let Some(spec) = self.lookup(&method, req.uri().path()).cloned() else {
            return Dispatched::unmatched(http::build_404_response(&self.server_name));
        };

        let body = if carries_body(&method) {
            if let Some(resp) = self.check_body_size(&req) {
                return Dispatched::matched(&spec, resp, None);
            }
            let body = match self.read_body(req.into_body()).await {
                Ok(body) => body,
                Err(resp) => return Dispatched::matched(&spec, resp, None),
            };
            if let Err(e) = validator::validate(&spec.schema, &body) {
                logger::log_debug(&format!("Rejected {method} {}: {e}", spec.path));
                let resp =
                    http::build_error_response(StatusCode::BAD_REQUEST, &e.to_string(), &self.server_name);
                return Dispatched::matched(&spec, resp, None);
            }
            body
        } else {
            Map::new()
        };

        let body = if self.fill_defaults {
            spec.schema.fill_defaults(&body)
        } else {
            body
        };

        let args = translator::translate(&spec, &method, &body);
        logger::log_invoke(&self.command, &args);

        match invoker::invoke(&self.command, &args, self.timeout).await {
            Ok(result) => {
                let status = if result.success {
                    StatusCode::OK
                } else {
                    StatusCode::BAD_REQUEST
                };
                let resp = http::build_json_response(status, result.output, &self.server_name);
                Dispatched::matched(&spec, resp, result.exit_code)
            }
            Err(e) => {
                logger::log_error(&e.to_string());
                let status = match e {
                    InvokeError::Launch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                    InvokeError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                };
                let resp = http::build_error_response(status, &e.to_string(), &self.server_name);
                Dispatched::matched(&spec, resp, None)
            }
        }
    }

    /// Reject early when Content-Length already exceeds the limit
    fn check_body_size<B>(&self, req: &Request<B>) -> Option<Response<Full<Bytes>>> {
        let content_length = req.headers().get(hyper::header::CONTENT_LENGTH)?;
        let size = content_length.to_str().ok()?.parse::<u64>().ok()?;
        if size > self.max_body_size {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {})",
                self.max_body_size
            ));
            return Some(self.payload_too_large());
        }
        None
    }

    /// Collect the body under the size limit and parse it as a JSON object
    async fn read_body<B>(&self, body: B) -> Result<Map<String, Value>, Response<Full<Bytes>>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let limit = usize::try_from(self.max_body_size).unwrap_or(usize::MAX);
        let bytes = match Limited::new(body, limit).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.is::<LengthLimitError>() => return Err(self.payload_too_large()),
            Err(e) => {
                return Err(http::build_error_response(
                    StatusCode::BAD_REQUEST,
                    &e.to_string(),
                    &self.server_name,
                ))
            }
        };

        serde_json::from_slice::<Map<String, Value>>(&bytes).map_err(|e| {
            http::build_error_response(StatusCode::BAD_REQUEST, &e.to_string(), &self.server_name)
        })
    }

    fn payload_too_large(&self) -> Response<Full<Bytes>> {
        http::build_error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            &format!("request body exceeds {} bytes", self.max_body_size),
            &self.server_name,
        )
    }
}

/// Verbs whose requests carry a JSON body
fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let logging = &state.config.logging;

    let entry = logging.access_log.then(|| {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = version_label(req.version()).to_string();
        entry.referer = header_value(&req, hyper::header::REFERER);
        entry.user_agent = header_value(&req, hyper::header::USER_AGENT);
        entry
    });

    let dispatched = state.dispatcher.dispatch(req).await;

    if let Some(mut entry) = entry {
        entry.status = dispatched.response.status().as_u16();
        entry.body_bytes = dispatched
            .response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.endpoint = dispatched.endpoint;
        entry.exit_status = dispatched.exit_code;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &logging.access_log_format);
    }

    Ok(dispatched.response)
}

fn header_value<B>(req: &Request<B>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
