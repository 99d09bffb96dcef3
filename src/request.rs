use std::io::{self, BufRead, Read};

use headers::HeaderMapExt;
use http::{Method, Request, Version};
use thiserror::Error;

use crate::body::Body;

const MAX_HEADERS: usize = 64;

/// Largest request body buffered in memory, chunked or not.
pub(crate) const MAX_BODY: u64 = 1024 * 1024;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("connection closed")]
    ConnectionClosed,
    #[error("io error")]
    Io(#[from] io::Error),
    #[error("invalid request")]
    Invalid(#[from] httparse::Error),
    #[error("incomplete request")]
    IncompleteRequest,
    #[error("unsupported http version: {0}")]
    UnsupportedHttpVersion(u8),
    #[error("invalid Transfer-Encoding header")]
    InvalidTransferEncoding,
    #[error("invalid header")]
    InvalidHeader(#[from] headers::Error),
    #[error("invalid chunk size")]
    InvalidChunkSize,
    #[error("request body exceeds {MAX_BODY} bytes")]
    BodyTooLarge,
    #[error("failed to parse http request")]
    Unknown,
}

/// Reads one request off the stream, body included.
///
/// Bodies are fully buffered so the stream is positioned at the start of the
/// next pipelined request when this returns.
pub(crate) fn parse_request(stream: &mut impl BufRead) -> Result<Request<Body>, ParseError> {
    let mut buf = Vec::with_capacity(800);

    loop {
        if stream.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        match buf.as_slice() {
            [.., b'\r', b'\n', b'\r', b'\n'] => break,
            [.., b'\n', b'\n'] => break,
            // Stray line breaks between pipelined requests
            [b'\r', b'\n'] | [b'\n'] => buf.clear(),
            _ => continue,
        }
    }

    if buf.is_empty() {
        return Err(ParseError::ConnectionClosed);
    }

    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);
    if req.parse(&buf)?.is_partial() {
        return Err(ParseError::IncompleteRequest);
    }

    let method = req
        .method
        .map(|method| method.as_bytes())
        .ok_or(ParseError::IncompleteRequest)?;

    let path = req.path.ok_or(ParseError::IncompleteRequest)?;

    let version = match req.version.ok_or(ParseError::IncompleteRequest)? {
        0 => Version::HTTP_10,
        1 => Version::HTTP_11,
        version => return Err(ParseError::UnsupportedHttpVersion(version)),
    };

    let request = Request::builder()
        .method(Method::from_bytes(method).map_err(|_| ParseError::IncompleteRequest)?)
        .uri(path)
        .version(version);

    let request = req
        .headers
        .iter()
        .map(|header| (header.name, header.value))
        .fold(request, |req, (name, value)| req.header(name, value));

    let headers = request.headers_ref().ok_or(ParseError::Unknown)?;

    let body = if let Some(encoding) = headers.typed_try_get::<headers::TransferEncoding>()? {
        if !encoding.is_chunked() {
            // https://datatracker.ietf.org/doc/html/rfc2616#section-3.6
            return Err(ParseError::InvalidTransferEncoding);
        }
        Body::from(read_chunked(stream)?)
    } else if let Some(len) = headers.typed_try_get::<headers::ContentLength>()? {
        if len.0 > MAX_BODY {
            return Err(ParseError::BodyTooLarge);
        }
        let mut buf = vec![0_u8; len.0 as usize];
        stream.read_exact(&mut buf)?;
        Body::from(buf)
    } else {
        Body::empty()
    };

    request.body(body).map_err(|_| ParseError::Unknown)
}

fn read_chunked(stream: &mut impl BufRead) -> Result<Vec<u8>, ParseError> {
    let mut body = Vec::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        if stream.read_until(b'\n', &mut line)? == 0 {
            return Err(ParseError::IncompleteRequest);
        }

        match httparse::parse_chunk_size(&line) {
            Ok(httparse::Status::Complete((_pos, 0))) => break,
            Ok(httparse::Status::Complete((_pos, size))) => {
                let start = body.len();
                let end = (start as u64)
                    .checked_add(size)
                    .filter(|end| *end <= MAX_BODY)
                    .ok_or(ParseError::BodyTooLarge)?;
                body.resize(end as usize, 0);
                stream.read_exact(&mut body[start..])?;
                line.clear();
                stream.read_until(b'\n', &mut line)?;
            }
            Ok(httparse::Status::Partial) => return Err(ParseError::IncompleteRequest),
            Err(_) => return Err(ParseError::InvalidChunkSize),
        }
    }

    // Trailers are read and discarded
    loop {
        line.clear();
        if stream.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.as_slice() == b"\r\n" || line.as_slice() == b"\n" {
            break;
        }
    }

    Ok(body)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn parse_request_without_body() {
        let mut req = Cursor::new("GET /app/index.html HTTP/1.1\r\nHost: chirpy.dev\r\n\r\n");

        let req = parse_request(&mut req).unwrap();

        assert_eq!(Version::HTTP_11, req.version());
        assert_eq!("/app/index.html", req.uri().path());
        assert_eq!(
            Some("chirpy.dev"),
            req.headers()
                .get(http::header::HOST)
                .and_then(|v| v.to_str().ok())
        );
        assert!(req.body().is_empty());
    }

    #[test]
    fn parse_request_keeps_query() {
        let mut req = Cursor::new("GET /admin/metrics?fresh=1 HTTP/1.0\r\n\r\n");

        let req = parse_request(&mut req).unwrap();

        assert_eq!(Version::HTTP_10, req.version());
        assert_eq!("/admin/metrics", req.uri().path());
        assert_eq!(Some("fresh=1"), req.uri().query());
    }

    #[test]
    fn parse_request_with_content_length_body() {
        let mut req = Cursor::new(
            "POST /api/reset HTTP/1.1\r\nHost: chirpy.dev\r\nContent-Length: 6\r\n\r\nreset! ignored",
        );

        let req = parse_request(&mut req).unwrap();

        assert_eq!(req.into_body().into_bytes().unwrap(), b"reset!");
    }

    #[test]
    fn parse_request_with_chunked_body() {
        let mut req = Cursor::new("POST /api/reset HTTP/1.1\r\nHost: chirpy.dev\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nlol\r\n3\r\nwut\r\n0\r\n\r\n");

        let req = parse_request(&mut req).unwrap();

        assert_eq!(req.into_body().into_bytes().unwrap(), b"lolwut");
    }

    #[test]
    fn parse_request_with_chunked_body_and_extensions() {
        let mut req = Cursor::new("POST /api/reset HTTP/1.1\r\nHost: chirpy.dev\r\nTransfer-Encoding: chunked\r\n\r\n3;extension\r\nlol\r\n3\r\nwut\r\n0\r\n\r\n");

        let req = parse_request(&mut req).unwrap();

        assert_eq!(req.into_body().into_bytes().unwrap(), b"lolwut");
    }

    #[test]
    fn parse_pipelined_requests() {
        let mut stream = Cursor::new(
            "POST /api/reset HTTP/1.1\r\nContent-Length: 2\r\n\r\nokGET /api/healthz HTTP/1.1\r\n\r\n",
        );

        let first = parse_request(&mut stream).unwrap();
        assert_eq!("/api/reset", first.uri().path());

        let second = parse_request(&mut stream).unwrap();
        assert_eq!("/api/healthz", second.uri().path());

        assert!(matches!(
            parse_request(&mut stream),
            Err(ParseError::ConnectionClosed)
        ));
    }

    #[test]
    fn rejects_non_chunked_transfer_encoding() {
        let mut req = Cursor::new(
            "POST /api/reset HTTP/1.1\r\nTransfer-Encoding: gzip\r\n\r\n",
        );

        assert!(matches!(
            parse_request(&mut req),
            Err(ParseError::InvalidTransferEncoding)
        ));
    }

    #[test]
    fn rejects_oversized_content_length() {
        for len in [MAX_BODY + 1, u64::MAX] {
            let mut req = Cursor::new(format!(
                "POST /api/reset HTTP/1.1\r\nContent-Length: {len}\r\n\r\nok"
            ));

            assert!(matches!(
                parse_request(&mut req),
                Err(ParseError::BodyTooLarge)
            ));
        }
    }

    #[test]
    fn accepts_body_at_the_limit() {
        let head = format!("POST /api/reset HTTP/1.1\r\nContent-Length: {MAX_BODY}\r\n\r\n");
        let body = vec![b'a'; MAX_BODY as usize];
        let mut req = Cursor::new([head.as_bytes(), &body[..]].concat());

        let req = parse_request(&mut req).unwrap();

        assert_eq!(req.body().len(), MAX_BODY);
    }

    #[test]
    fn rejects_oversized_chunks() {
        let mut req = Cursor::new("POST /api/reset HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\nFFFFFFFF\r\nlol\r\n0\r\n\r\n");

        assert!(matches!(
            parse_request(&mut req),
            Err(ParseError::BodyTooLarge)
        ));

        let mut req = Cursor::new("POST /api/reset HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\nFFFFFFFFFFFFFFFF\r\nlol\r\n0\r\n\r\n");

        assert!(matches!(
            parse_request(&mut req),
            Err(ParseError::BodyTooLarge | ParseError::InvalidChunkSize)
        ));
    }

    #[test]
    fn rejects_chunked_bodies_growing_past_the_limit() {
        let chunk = "a".repeat(512 * 1024);
        let mut req = Cursor::new(format!(
            "POST /api/reset HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n80000\r\n{chunk}\r\n80000\r\n{chunk}\r\n1\r\na\r\n0\r\n\r\n"
        ));

        assert!(matches!(
            parse_request(&mut req),
            Err(ParseError::BodyTooLarge)
        ));
    }

    #[test]
    fn fails_to_parse_incomplete_request() {
        let mut req = Cursor::new("POST /lol");

        assert!(matches!(
            parse_request(&mut req),
            Err(ParseError::IncompleteRequest)
        ));
    }

    #[test]
    fn empty_stream_means_closed_connection() {
        let mut req = Cursor::new("");

        assert!(matches!(
            parse_request(&mut req),
            Err(ParseError::ConnectionClosed)
        ));
    }
}
