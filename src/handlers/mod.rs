//! Terminal request handlers.

mod health;
mod metrics;
mod reset;
mod static_files;

pub use health::healthz;
pub use metrics::{Metrics, MetricsFormat};
pub use reset::Reset;
pub use static_files::FileServer;

use http::{header::CONTENT_TYPE, HeaderValue, Response, StatusCode};

use crate::Body;

pub(crate) const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub(crate) const TEXT_HTML: &str = "text/html; charset=utf-8";

pub(crate) fn with_content_type(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Body>,
) -> Response<Body> {
    let mut res = Response::new(body.into());
    *res.status_mut() = status;
    res.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    res
}

pub(crate) fn text(status: StatusCode, body: impl Into<Body>) -> Response<Body> {
    with_content_type(status, TEXT_PLAIN, body)
}

pub(crate) fn not_found() -> Response<Body> {
    text(StatusCode::NOT_FOUND, "404 page not found\n")
}
