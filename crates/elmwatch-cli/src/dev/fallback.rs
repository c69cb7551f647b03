//! History API fallback for single-page applications.
//!
//! Client-side routers use real paths (`/users/42`) that have no file behind
//! them. Browser navigations to such paths are rewritten to `/index.html` so
//! the application boots and routes itself. Rewriting applies only when
//!
//! - the method is GET or HEAD,
//! - an `Accept` header is present, does not start with `application/json`,
//!   and contains `text/html` or `*/*`,
//! - the last path segment has no `.` (so `/main.js` stays a 404 when missing).

use axum::{
    extract::Request,
    http::{HeaderMap, Method, Uri, header},
    middleware::Next,
    response::Response,
};

/// Document served for rewritten navigations.
pub const INDEX_PATH: &str = "/index.html";

const HTML_ACCEPT: [&str; 2] = ["text/html", "*/*"];

/// Decide whether a request should be rewritten to the index document.
pub fn rewrite_target(method: &Method, headers: &HeaderMap, path: &str) -> Option<&'static str> {
    if method != Method::GET && method != Method::HEAD {
        return None;
    }

    let accept = headers.get(header::ACCEPT)?.to_str().ok()?;
    if accept.starts_with("application/json") {
        return None;
    }
    if !HTML_ACCEPT.iter().any(|html| accept.contains(html)) {
        return None;
    }

    if path.rfind('.') > path.rfind('/') {
        return None;
    }

    Some(INDEX_PATH)
}

/// Middleware rewriting HTML navigations to [`INDEX_PATH`].
pub async fn history_fallback(mut req: Request, next: Next) -> Response {
    if let Some(target) = rewrite_target(req.method(), req.headers(), req.uri().path()) {
        tracing::debug!("history fallback: {} -> {}", req.uri().path(), target);
        *req.uri_mut() = Uri::from_static(target);
    }

    next.run(req).await
}
