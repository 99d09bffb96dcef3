//! Method + path dispatch with nested routers.
//!
//! Patterns are either exact (`/healthz`) or catch-all (`/app/*`, matching
//! every path below `/app/`). On each request the router tries, in order:
//! exact routes, mounted routers (longest prefix first), catch-all routes
//! (longest prefix first). A path that matches a pattern registered for other
//! methods only is answered with `405 Method Not Allowed`.

use std::sync::Arc;

use headers::HeaderMapExt;
use http::{Method, Request, Response, StatusCode};

use crate::{handlers, Body, Handler};

/// Part of the path still to be matched, set by a parent router when it
/// hands a request to a mounted one. The request URI itself is left intact.
#[derive(Clone, Debug)]
struct RoutePath(String);

enum Pattern {
    Exact(String),
    CatchAll(String),
}

impl Pattern {
    fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix('*') {
            Some(prefix) if prefix.ends_with('/') => Pattern::CatchAll(prefix.to_owned()),
            _ => Pattern::Exact(pattern.to_owned()),
        }
    }
}

struct Route {
    pattern: Pattern,
    method: Option<Method>,
    handler: Arc<dyn Handler>,
}

impl Route {
    fn allows(&self, method: &Method) -> bool {
        match &self.method {
            None => true,
            Some(allowed) => allowed == method || (allowed == Method::GET && method == Method::HEAD),
        }
    }
}

struct Mount {
    prefix: String,
    router: Router,
}

impl Mount {
    fn strip<'p>(&self, path: &'p str) -> Option<&'p str> {
        match path.strip_prefix(self.prefix.as_str())? {
            "" => Some("/"),
            rest if rest.starts_with('/') => Some(rest),
            _ => None,
        }
    }
}

#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
    mounts: Vec<Mount>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes every method on `pattern` to `handler`.
    pub fn route(self, pattern: &str, handler: impl Handler) -> Self {
        self.add(pattern, None, handler)
    }

    /// Routes `GET` (and `HEAD`) on `pattern` to `handler`.
    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.add(pattern, Some(Method::GET), handler)
    }

    pub fn method(self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        self.add(pattern, Some(method), handler)
    }

    /// Dispatches `prefix` and everything below `prefix/` to `router`, which
    /// matches against the remainder of the path.
    pub fn mount(mut self, prefix: &str, router: Router) -> Self {
        self.mounts.push(Mount {
            prefix: prefix.trim_end_matches('/').to_owned(),
            router,
        });
        self
    }

    fn add(mut self, pattern: &str, method: Option<Method>, handler: impl Handler) -> Self {
        self.routes.push(Route {
            pattern: Pattern::parse(pattern),
            method,
            handler: Arc::new(handler),
        });
        self
    }

    fn call<'r>(candidates: impl Iterator<Item = &'r Route>, req: Request<Body>) -> Response<Body> {
        let candidates: Vec<&Route> = candidates.collect();

        match candidates.iter().find(|route| route.allows(req.method())) {
            Some(route) => route.handler.handle(req),
            None => {
                let mut res = Response::new(Body::empty());
                *res.status_mut() = StatusCode::METHOD_NOT_ALLOWED;
                res.headers_mut().typed_insert(
                    candidates
                        .iter()
                        .filter_map(|route| route.method.clone())
                        .collect::<headers::Allow>(),
                );
                res
            }
        }
    }
}

impl Handler for Router {
    fn handle(&self, mut req: Request<Body>) -> Response<Body> {
        let path = match req.extensions().get::<RoutePath>() {
            Some(RoutePath(path)) => path.clone(),
            None => req.uri().path().to_owned(),
        };

        let mut exact = self
            .routes
            .iter()
            .filter(|route| matches!(&route.pattern, Pattern::Exact(p) if *p == path))
            .peekable();
        if exact.peek().is_some() {
            return Self::call(exact, req);
        }

        let mount = self
            .mounts
            .iter()
            .filter_map(|mount| mount.strip(&path).map(|rest| (mount, rest)))
            .max_by_key(|(mount, _)| mount.prefix.len());
        if let Some((mount, rest)) = mount {
            req.extensions_mut().insert(RoutePath(rest.to_owned()));
            return mount.router.handle(req);
        }

        let longest = self
            .routes
            .iter()
            .filter_map(|route| match &route.pattern {
                Pattern::CatchAll(prefix) if path.starts_with(prefix.as_str()) => {
                    Some(prefix.len())
                }
                _ => None,
            })
            .max();
        if let Some(len) = longest {
            let catch_all = self.routes.iter().filter(|route| {
                matches!(&route.pattern, Pattern::CatchAll(p) if p.len() == len && path.starts_with(p.as_str()))
            });
            return Self::call(catch_all, req);
        }

        handlers::not_found()
    }
}
