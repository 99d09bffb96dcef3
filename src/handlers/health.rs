use http::{Request, Response, StatusCode};

use super::text;
use crate::Body;

/// Liveness check. Always answers `200 OK`.
pub fn healthz(_req: Request<Body>) -> Response<Body> {
    text(StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use http::header::CONTENT_TYPE;

    use super::*;

    #[test]
    fn answers_ok() {
        let res = healthz(Request::new(Body::empty()));

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(res.into_body().into_bytes().unwrap(), b"OK");
    }
}
