use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Reuse the caller's `x-request-id` or mint a v4 UUID, run the request inside a
/// span carrying it, and echo it on the response.
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let header = HeaderName::from_static(REQUEST_ID_HEADER);

    let request_id = request
        .headers()
        .get(&header)
        .cloned()
        .unwrap_or_else(|| {
            // A hyphenated UUID is always a valid header value.
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        });
    request.headers_mut().insert(header.clone(), request_id.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id.to_str().unwrap_or("invalid"),
        method = %request.method(),
        uri = %request.uri(),
    );

    let mut response = next.run(request).instrument(span).await;
    response.headers_mut().insert(header, request_id);
    response
}
