#![doc = include_str!("../README.md")]

pub mod app;
pub mod body;
pub mod config;
mod connection;
pub mod handlers;
pub mod middleware;
mod request;
mod response;
pub mod router;
pub mod server;
pub mod state;

use std::io::{self, BufReader, BufWriter, Write};

pub use app::{app, Layout};
pub use body::Body;
pub use connection::Connection;
use headers::{HeaderMapExt, HeaderValue};
pub use http::{header, Method, Request, Response, StatusCode, Uri, Version};
pub use middleware::{HandlerExt, Layer};
pub use request::ParseError;
pub use router::Router;
pub use server::Server;
pub use state::ServerState;

/// Maps [`Request`]s to [`Response`]s.
///
/// Handlers are infallible: anything that goes wrong while serving a request
/// is expressed as a status code. Plain functions and closures already
/// implement this trait.
///
/// ```
/// # use chirpy::{Body, Handler, Request, Response};
/// fn hello(_req: Request<Body>) -> Response<Body> {
///     Response::new(Body::from("hello"))
/// }
///
/// let res = hello.handle(Request::new(Body::empty()));
/// assert_eq!(res.body().len(), 5);
/// ```
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, request: Request<Body>) -> Response<Body>;
}

impl<F> Handler for F
where
    F: Fn(Request<Body>) -> Response<Body>,
    F: Send + Sync + 'static,
{
    fn handle(&self, request: Request<Body>) -> Response<Body> {
        self(request)
    }
}

pub(crate) fn serve<H: Handler + ?Sized>(conn: Connection, handler: &H) -> io::Result<()> {
    let mut reader = BufReader::new(conn.try_clone()?);
    let mut writer = BufWriter::new(conn);

    loop {
        match request::parse_request(&mut reader) {
            Ok(req) => {
                let asks_for_close = req
                    .headers()
                    .typed_get::<headers::Connection>()
                    .filter(|conn| conn.contains("close"))
                    .is_some();

                let asks_for_keep_alive = req
                    .headers()
                    .typed_get::<headers::Connection>()
                    .filter(|conn| conn.contains("keep-alive"))
                    .is_some();

                let version = req.version();

                let demands_close = match version {
                    Version::HTTP_09 => true,
                    Version::HTTP_10 => !asks_for_keep_alive,
                    _ => asks_for_close,
                };

                let head_only = req.method() == Method::HEAD;

                let mut res = handler.handle(req);

                *res.version_mut() = version;

                if demands_close {
                    res.headers_mut()
                        .insert(header::CONNECTION, HeaderValue::from_static("close"));
                } else if version == Version::HTTP_10 {
                    res.headers_mut()
                        .insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
                }

                response::write_response(res, &mut writer, head_only)?;
                writer.flush()?;

                if demands_close {
                    break;
                }
            }
            Err(ParseError::ConnectionClosed) => break,
            Err(ParseError::Io(err))
                if matches!(
                    err.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                tracing::debug!("closing idle connection");
                break;
            }
            Err(err) => {
                let status = match err {
                    ParseError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
                    _ => StatusCode::BAD_REQUEST,
                };

                let mut res = Response::new(Body::from(status.to_string()));
                *res.status_mut() = status;
                middleware::insert_cors_headers(res.headers_mut());
                res.headers_mut()
                    .insert(header::CONNECTION, HeaderValue::from_static("close"));

                response::write_response(res, &mut writer, false)?;
                writer.flush()?;

                return Err(io::Error::new(io::ErrorKind::InvalidData, err));
            }
        }
    }

    Ok(())
}
