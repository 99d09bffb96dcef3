use http::{Request, Response};

use super::Layer;
use crate::{Body, Handler, ServerState};

/// Records a hit for every request before the wrapped handler runs.
///
/// The hit is counted whatever the outcome, so requests for missing files
/// still show up in the metrics.
#[derive(Clone, Debug)]
pub struct CountHits {
    state: ServerState,
}

impl CountHits {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }
}

impl<H: Handler> Layer<H> for CountHits {
    type Handler = CountHitsHandler<H>;

    fn layer(&self, inner: H) -> Self::Handler {
        CountHitsHandler {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CountHitsHandler<H> {
    inner: H,
    state: ServerState,
}

impl<H: Handler> Handler for CountHitsHandler<H> {
    fn handle(&self, req: Request<Body>) -> Response<Body> {
        self.state.increment();
        self.inner.handle(req)
    }
}
