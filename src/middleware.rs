//! axum middleware that applies the key transformation at the HTTP boundary.
//!
//! [`snakify_request`] rewrites JSON request bodies to snake_case before a
//! handler sees them; [`camelize_response`] rewrites JSON response bodies to
//! camelCase before they are sent. Both fail open: a body that cannot be
//! converted is forwarded as it was.

use axum::body::{to_bytes, Body, Bytes, HttpBody};
use axum::extract::{Request, State};
use axum::http::{self, header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::{from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};

use crate::transformer::{transform_inbound, transform_outbound};

/// Settings shared by both middleware functions.
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Bodies larger than this are never buffered for conversion.
    pub max_body_bytes: usize,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Install both integration points on a router.
///
/// Requests are converted before routing; responses on the way out.
pub fn with_key_casing<S>(router: Router<S>, config: TransformConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(from_fn_with_state(config.clone(), camelize_response))
        .layer(from_fn_with_state(config, snakify_request))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

fn should_transform(headers: &HeaderMap, config: &TransformConfig) -> bool {
    is_json(headers)
        && declared_length(headers).map_or(true, |len| len <= config.max_body_bytes)
}

/// Lower and upper size bounds reported by the body itself, independent of
/// headers. The upper bound is `None` for a stream of unknown size.
fn known_size(body: &Body) -> (u64, Option<u64>) {
    let hint = body.size_hint();
    (hint.lower(), hint.upper())
}

fn exceeds_limit(lower: u64, config: &TransformConfig) -> bool {
    lower > config.max_body_bytes as u64
}

fn replace_body_length(headers: &mut HeaderMap, body: &Bytes) {
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Inbound integration point: camelCase request body to snake_case.
///
/// Bodies known to be over `max_body_bytes` are forwarded untouched. A
/// stream of unknown size that turns out to exceed the limit has already
/// been partly consumed and is refused with `413 Payload Too Large`.
pub async fn snakify_request(
    State(config): State<TransformConfig>,
    request: Request,
    next: Next,
) -> Response {
    if !should_transform(request.headers(), &config) {
        return next.run(request).await;
    }

    let (lower, upper) = known_size(request.body());
    if exceeds_limit(lower, &config) {
        tracing::debug!(size = lower, "Request body over transform limit, forwarding unchanged");
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let bytes = match to_bytes(body, config.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let unbounded = upper.map_or(true, |upper| exceeds_limit(upper, &config));
            tracing::error!(
                method = %parts.method,
                uri = %parts.uri,
                error = %e,
                "Request body could not be read for key transformation"
            );
            return if unbounded {
                error_body(StatusCode::PAYLOAD_TOO_LARGE, "Request body exceeds the transform limit")
            } else {
                error_body(StatusCode::BAD_REQUEST, "Request body could not be read")
            };
        }
    };

    if bytes.is_empty() {
        return next.run(http::Request::from_parts(parts, Body::from(bytes))).await;
    }

    let converted = transform_inbound(&bytes).into_inner();
    replace_body_length(&mut parts.headers, &converted);

    next.run(http::Request::from_parts(parts, Body::from(converted))).await
}

/// Outbound integration point: snake_case response body to camelCase.
///
/// Only bodies with a known size within `max_body_bytes` are buffered;
/// larger or streaming bodies are sent as they are.
pub async fn camelize_response(
    State(config): State<TransformConfig>,
    request: Request,
    next: Next,
) -> Response {
    let uri = request.uri().clone();
    let response = next.run(request).await;

    if !should_transform(response.headers(), &config) {
        return response;
    }

    match known_size(response.body()) {
        (_, Some(upper)) if !exceeds_limit(upper, &config) => {}
        (lower, upper) => {
            tracing::debug!(
                uri = %uri,
                lower,
                upper = ?upper,
                "Response body over transform limit or unbounded, forwarding unchanged"
            );
            return response;
        }
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, config.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(
                uri = %uri,
                status = %parts.status,
                error = %e,
                "Response body could not be read for key transformation"
            );
            return error_body(StatusCode::INTERNAL_SERVER_ERROR, "Response body could not be read");
        }
    };

    if bytes.is_empty() {
        return http::Response::from_parts(parts, Body::from(bytes));
    }

    let converted = transform_outbound(&bytes).into_inner();
    replace_body_length(&mut parts.headers, &converted);

    http::Response::from_parts(parts, Body::from(converted))
}
