use std::io::{self, Write};

use headers::HeaderMapExt;
use http::Response;

use crate::body::Body;

/// Serializes `res` as an HTTP/1.x message.
///
/// `Content-Length` always reflects the body, even when `head_only` drops the
/// payload itself.
pub(crate) fn write_response(
    res: Response<Body>,
    stream: &mut impl Write,
    head_only: bool,
) -> io::Result<()> {
    let (mut parts, body) = res.into_parts();

    parts
        .headers
        .typed_insert(headers::ContentLength(body.len()));

    stream.write_all(format!("{:?} {}\r\n", parts.version, parts.status).as_bytes())?;

    for (name, val) in parts.headers.iter() {
        stream.write_all(&[format!("{name}: ").as_bytes(), val.as_bytes(), b"\r\n"].concat())?;
    }

    stream.write_all(b"\r\n")?;

    if !head_only && !body.is_empty() {
        io::copy(&mut body.into_reader(), stream)?;
    }

    Ok(())
}
