use axum::{
    body::Body,
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Request id extension, readable by tracing spans and handlers.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

// Middleware that ensures each request has an X-Request-Id and mirrors it on the response.
// Error bodies rendered while the request runs carry the same id.
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    // Preserve a printable incoming id; otherwise generate one
    let id = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));

    let header_value = HeaderValue::from_str(&id).ok();
    let mut res = carebase_core::with_request_id(id, next.run(req)).await;

    if let Some(value) = header_value {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    res
}
