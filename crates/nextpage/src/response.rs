// File: src/response.rs
// Purpose: Response builders and outcome normalization for the dispatch layer

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use crate::handler::CallOutcome;

/// An HTML response with an explicit status code.
pub fn html(status: StatusCode, body: impl Into<String>) -> Response {
    (status, Html(body.into())).into_response()
}

/// 204 No Content.
pub fn empty() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// 303 See Other with a Location header.
pub fn redirect(location: &str) -> Response {
    let mut response = StatusCode::SEE_OTHER.into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}

/// 405 Method Not Allowed.
pub fn method_not_allowed() -> Response {
    StatusCode::METHOD_NOT_ALLOWED.into_response()
}

/// A minimal HTML error page.
pub fn error_page(status: StatusCode, title: &str, message: &str) -> Response {
    let body = format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{title}</title></head>
<body>
  <h1>{status} {title}</h1>
  <p>{message}</p>
  <a href="/">Go Home</a>
</body>
</html>"#,
        status = status.as_u16(),
        title = title,
        message = message
    );
    html(status, body)
}

pub fn not_found(message: &str) -> Response {
    error_page(StatusCode::NOT_FOUND, "Page Not Found", message)
}

/// Normalizes a handler's outcome into an HTTP response:
/// nothing → 204, a body string → 200, a redirect target → 303, an
/// already-built response → passed through unchanged.
pub fn normalize_outcome(outcome: CallOutcome) -> Response {
    match outcome {
        CallOutcome::None => empty(),
        CallOutcome::Body(body) => html(StatusCode::OK, body),
        CallOutcome::Value(value) => html(StatusCode::OK, value.to_string()),
        CallOutcome::Redirect(location) => redirect(&location),
        CallOutcome::Response(response) => response,
    }
}
