use std::time::Instant;

use http::{Request, Response};

use super::Layer;
use crate::{Body, Handler};

/// Emits one `info` event per request with its method, path, status and
/// latency. Events from inner handlers are recorded inside a `request` span.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl<H: Handler> Layer<H> for Trace {
    type Handler = TraceHandler<H>;

    fn layer(&self, inner: H) -> Self::Handler {
        TraceHandler { inner }
    }
}

#[derive(Clone, Debug)]
pub struct TraceHandler<H> {
    inner: H,
}

impl<H: Handler> Handler for TraceHandler<H> {
    fn handle(&self, req: Request<Body>) -> Response<Body> {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();

        let span = tracing::info_span!("request", %method, %path);
        let _enter = span.enter();

        let start = Instant::now();
        let res = self.inner.handle(req);

        tracing::info!(
            status = res.status().as_u16(),
            elapsed = ?start.elapsed(),
            "served"
        );

        res
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::HandlerExt;

    #[test]
    fn passes_responses_through() {
        let handler = (|_req: Request<Body>| {
            let mut res = Response::new(Body::from("created"));
            *res.status_mut() = StatusCode::CREATED;
            res
        })
        .with(Trace);

        let res = handler.handle(Request::new(Body::empty()));

        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.into_body().into_bytes().unwrap(), b"created");
    }
}
