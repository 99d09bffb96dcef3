use http::{Request, Response, Uri};

use super::Layer;
use crate::{handlers, Body, Handler};

/// Removes a fixed prefix from the request path before the wrapped handler
/// sees it. Requests outside the prefix get a 404.
#[derive(Clone, Debug)]
pub struct StripPrefix {
    prefix: String,
}

impl StripPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl<H: Handler> Layer<H> for StripPrefix {
    type Handler = StripPrefixHandler<H>;

    fn layer(&self, inner: H) -> Self::Handler {
        StripPrefixHandler {
            inner,
            prefix: self.prefix.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StripPrefixHandler<H> {
    inner: H,
    prefix: String,
}

impl<H> StripPrefixHandler<H> {
    fn strip(&self, uri: &Uri) -> Option<Uri> {
        let rest = uri.path().strip_prefix(self.prefix.as_str())?;

        let mut path_and_query = String::with_capacity(rest.len() + 1);
        if !rest.starts_with('/') {
            path_and_query.push('/');
        }
        path_and_query.push_str(rest);
        if let Some(query) = uri.query() {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }

        Uri::try_from(path_and_query).ok()
    }
}

impl<H: Handler> Handler for StripPrefixHandler<H> {
    fn handle(&self, mut req: Request<Body>) -> Response<Body> {
        match self.strip(req.uri()) {
            Some(uri) => {
                *req.uri_mut() = uri;
                self.inner.handle(req)
            }
            None => handlers::not_found(),
        }
    }
}
