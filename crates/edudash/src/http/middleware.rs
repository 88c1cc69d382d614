use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{info, Instrument};

use super::AppState;
use crate::config::CorsConfig;
use crate::logging::ACCESS_LOG_TARGET;

fn allowed_origin(headers: &HeaderMap, cors: &CorsConfig) -> Option<HeaderValue> {
    let origin = headers.get(header::ORIGIN)?.to_str().ok()?;
    if cors.is_origin_allowed(origin) {
        HeaderValue::from_str(origin).ok()
    } else {
        None
    }
}

fn join_header(values: &[String]) -> Option<HeaderValue> {
    HeaderValue::from_str(&values.join(",")).ok()
}

pub(crate) async fn cors_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let cors = &state.cors;
    let origin = allowed_origin(req.headers(), cors);

    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        if let Some(origin) = origin {
            let headers = resp.headers_mut();
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
            if let Some(methods) = join_header(&cors.allowed_methods) {
                headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, methods);
            }
            if let Some(allowed) = join_header(&cors.allowed_headers) {
                headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, allowed);
            }
            if cors.allow_credentials {
                headers.insert(
                    header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                    HeaderValue::from_static("true"),
                );
            }
            headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        }
        return resp;
    }

    let mut resp = next.run(req).await;
    if let Some(origin) = origin {
        let headers = resp.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        if cors.allow_credentials {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    }
    resp
}

pub(crate) async fn request_tracing_middleware(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let span = tracing::info_span!("http.request", method = %method, path = %path);

    let started = Instant::now();
    let resp = next.run(req).instrument(span.clone()).await;

    span.in_scope(|| {
        info!(
            target: ACCESS_LOG_TARGET,
            status = resp.status().as_u16(),
            latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "request completed"
        );
    });
    resp
}
