//! Route table and middleware stack of the server.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::{
    handlers::{healthz, FileServer, Metrics, Reset},
    middleware::{Cors, CorsHandler, CountHits, StripPrefix, Trace, TraceHandler},
    HandlerExt, Router, ServerState,
};

/// URL prefix the static files are served under.
pub const FILES_PREFIX: &str = "/app";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    /// `/healthz`, `/metrics` (plain text) and `/reset` at the top level.
    Flat,
    /// `/api/healthz`, `/api/reset` and `/admin/metrics` (HTML page).
    #[default]
    Nested,
}

/// Builds the complete handler: request tracing, then CORS, then the router.
///
/// Requests under [`FILES_PREFIX`] are counted in `state` before the file
/// lookup happens.
pub fn app(
    state: ServerState,
    root: impl Into<PathBuf>,
    layout: Layout,
) -> TraceHandler<CorsHandler<Router>> {
    let files = FileServer::new(root)
        .with(CountHits::new(state.clone()))
        .with(StripPrefix::new(FILES_PREFIX));

    let router = Router::new()
        .route(FILES_PREFIX, files.clone())
        .route(&format!("{FILES_PREFIX}/*"), files)
        .get("/healthz", healthz);

    let router = match layout {
        Layout::Flat => router
            .get("/metrics", Metrics::plain(state.clone()))
            .route("/reset", Reset::new(state)),
        Layout::Nested => {
            let api = Router::new()
                .route("/reset", Reset::new(state.clone()))
                .get("/healthz", healthz);
            let admin = Router::new().get("/metrics", Metrics::html(state));

            router.mount("/api", api).mount("/admin", admin)
        }
    };

    router.with(Cors::permissive()).with(Trace)
}
