//! Handler-wrapping layers.
//!
//! A [`Layer`] turns one [`Handler`] into another. Layers are composed at
//! startup with [`HandlerExt::with`], innermost first:
//!
//! ```
//! # use chirpy::{handlers::FileServer, middleware::{CountHits, StripPrefix}, HandlerExt, ServerState};
//! let state = ServerState::new();
//! let files = FileServer::new(".")
//!     .with(CountHits::new(state.clone()))
//!     .with(StripPrefix::new("/app"));
//! ```

mod cors;
mod hits;
mod strip_prefix;
mod trace;

pub use cors::{Cors, CorsHandler};
pub(crate) use cors::insert_headers as insert_cors_headers;
pub use hits::{CountHits, CountHitsHandler};
pub use strip_prefix::{StripPrefix, StripPrefixHandler};
pub use trace::{Trace, TraceHandler};

use crate::Handler;

pub trait Layer<H> {
    type Handler: Handler;

    fn layer(&self, inner: H) -> Self::Handler;
}

pub trait HandlerExt: Handler + Sized {
    /// Wraps `self` in `layer`, so the layer runs before `self` on every
    /// request.
    fn with<L: Layer<Self>>(self, layer: L) -> L::Handler {
        layer.layer(self)
    }
}

impl<H: Handler> HandlerExt for H {}
