use http::{Request, Response, StatusCode};

use super::text;
use crate::{Body, Handler, ServerState};

/// Zeroes the hit counter, whatever the request method.
#[derive(Clone, Debug)]
pub struct Reset {
    state: ServerState,
}

impl Reset {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }
}

impl Handler for Reset {
    fn handle(&self, _req: Request<Body>) -> Response<Body> {
        self.state.reset();
        text(StatusCode::OK, "OK")
    }
}
