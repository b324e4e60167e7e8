//! Request ID middleware.
//!
//! Reuses an upstream `x-request-id` when it looks sane, otherwise mints a
//! UUID v4. The ID ends up in the request span, the Sentry scope and the
//! response headers, so a shopper-facing error can be matched to its logs.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Upstream IDs longer than this are replaced.
const MAX_UPSTREAM_ID_LEN: usize = 128;

/// Middleware that tags every request with an ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = upstream_request_id(request.headers().get(REQUEST_ID_HEADER))
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn upstream_request_id(header: Option<&HeaderValue>) -> Option<String> {
    let value = header?.to_str().ok()?.trim();
    let usable = !value.is_empty()
        && value.len() <= MAX_UPSTREAM_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    usable.then(|| value.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_id_is_reused() {
        let header = HeaderValue::from_static("abc-123");
        assert_eq!(upstream_request_id(Some(&header)).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_odd_upstream_ids_are_replaced() {
        assert!(upstream_request_id(None).is_none());
        assert!(upstream_request_id(Some(&HeaderValue::from_static(""))).is_none());
        assert!(upstream_request_id(Some(&HeaderValue::from_static("a b"))).is_none());

        let long = "x".repeat(MAX_UPSTREAM_ID_LEN + 1);
        let header = HeaderValue::from_str(&long).unwrap();
        assert!(upstream_request_id(Some(&header)).is_none());
    }
}
