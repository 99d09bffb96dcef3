use http::{
    header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    },
    HeaderMap, HeaderValue, Method, Request, Response, StatusCode,
};

use super::Layer;
use crate::{Body, Handler};

const ALLOW_METHODS: &str = "GET, POST, OPTIONS, PUT, DELETE";

/// Permissive CORS: any origin, any header, the common methods.
///
/// Preflight (`OPTIONS`) requests are answered directly and never reach the
/// wrapped handler.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cors;

impl Cors {
    pub fn permissive() -> Self {
        Cors
    }
}

impl<H: Handler> Layer<H> for Cors {
    type Handler = CorsHandler<H>;

    fn layer(&self, inner: H) -> Self::Handler {
        CorsHandler { inner }
    }
}

#[derive(Clone, Debug)]
pub struct CorsHandler<H> {
    inner: H,
}

impl<H: Handler> Handler for CorsHandler<H> {
    fn handle(&self, req: Request<Body>) -> Response<Body> {
        let mut res = if req.method() == Method::OPTIONS {
            let mut res = Response::new(Body::empty());
            *res.status_mut() = StatusCode::OK;
            res
        } else {
            self.inner.handle(req)
        };

        insert_headers(res.headers_mut());
        res
    }
}

/// Writes the permissive CORS headers, replacing any already present.
///
/// Also used for responses produced before a request reaches the handler.
pub(crate) fn insert_headers(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use super::*;
    use crate::HandlerExt;

    fn assert_cors_headers(res: &Response<Body>) {
        assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            res.headers()[ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, OPTIONS, PUT, DELETE"
        );
        assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_HEADERS], "*");
    }

    #[test]
    fn decorates_downstream_responses() {
        let handler = (|_req: Request<Body>| {
            let mut res = Response::new(Body::from("teapot"));
            *res.status_mut() = StatusCode::IM_A_TEAPOT;
            res
        })
        .with(Cors::permissive());

        let res = handler.handle(Request::new(Body::empty()));

        assert_eq!(res.status(), StatusCode::IM_A_TEAPOT);
        assert_cors_headers(&res);
        assert_eq!(res.into_body().into_bytes().unwrap(), b"teapot");
    }

    #[test]
    fn short_circuits_preflight_requests() {
        let called = Arc::new(AtomicBool::new(false));
        let handler = {
            let called = Arc::clone(&called);
            (move |_req: Request<Body>| {
                called.store(true, Ordering::SeqCst);
                Response::new(Body::from("should not be here"))
            })
            .with(Cors::permissive())
        };

        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/reset")
            .body(Body::empty())
            .unwrap();
        let res = handler.handle(req);

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.body().is_empty());
        assert_cors_headers(&res);
        assert!(!called.load(Ordering::SeqCst));
    }
}
