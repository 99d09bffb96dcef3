//! Static file serving from a directory on disk.

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use http::{header::LOCATION, HeaderValue, Request, Response, StatusCode};

use super::{not_found, text, with_content_type, TEXT_HTML};
use crate::{Body, Handler};

const INDEX: &str = "index.html";

/// Serves the files below `root`.
///
/// Directories are answered with their `index.html` when present and with a
/// listing otherwise. A directory requested without its trailing slash is
/// redirected, so relative links inside it resolve.
#[derive(Clone, Debug)]
pub struct FileServer {
    root: PathBuf,
}

impl FileServer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn serve_file(&self, path: &Path) -> Response<Body> {
        let body = match File::open(path).and_then(Body::try_from) {
            Ok(body) => body,
            Err(err) => return io_error(&err),
        };

        with_content_type(StatusCode::OK, mime_type(path), body)
    }

    fn list_directory(&self, dir: &Path) -> Response<Body> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => return io_error(&err),
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| {
                let mut name = entry.file_name().to_string_lossy().into_owned();
                if entry.file_type().map(|ty| ty.is_dir()).unwrap_or(false) {
                    name.push('/');
                }
                name
            })
            .collect();
        names.sort();

        let mut html = String::from(
            "<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n",
        );
        for name in &names {
            html.push_str(&format!(
                "<a href=\"{}\">{}</a>\n",
                escape_html(&encode_path(name)),
                escape_html(name)
            ));
        }
        html.push_str("</pre>\n");

        with_content_type(StatusCode::OK, TEXT_HTML, html)
    }
}

impl Handler for FileServer {
    fn handle(&self, req: Request<Body>) -> Response<Body> {
        let path = req.uri().path();

        let relative = match sanitize_path(path) {
            Some(relative) => relative,
            None => return not_found(),
        };

        let full_path = self.root.join(relative);

        let meta = match fs::metadata(&full_path) {
            Ok(meta) => meta,
            Err(err) => return io_error(&err),
        };

        if !meta.is_dir() {
            return self.serve_file(&full_path);
        }

        if !path.ends_with('/') {
            let base = path
                .rsplit('/')
                .next()
                .and_then(percent_decode)
                .unwrap_or_default();
            return redirect(&format!("{base}/"));
        }

        let index = full_path.join(INDEX);
        match fs::metadata(&index) {
            Ok(meta) if meta.is_file() => self.serve_file(&index),
            _ => self.list_directory(&full_path),
        }
    }
}

fn redirect(location: &str) -> Response<Body> {
    let mut res = Response::new(Body::empty());
    *res.status_mut() = StatusCode::MOVED_PERMANENTLY;
    match HeaderValue::from_str(&encode_path(location)) {
        Ok(location) => {
            res.headers_mut().insert(LOCATION, location);
            res
        }
        Err(_) => not_found(),
    }
}

fn io_error(err: &io::Error) -> Response<Body> {
    match err.kind() {
        io::ErrorKind::NotFound => not_found(),
        io::ErrorKind::PermissionDenied => text(StatusCode::FORBIDDEN, "403 Forbidden\n"),
        _ => {
            tracing::warn!(%err, "failed to read static content");
            text(
                StatusCode::INTERNAL_SERVER_ERROR,
                "500 Internal Server Error\n",
            )
        }
    }
}

/// Decodes the request path into a path relative to the served root.
///
/// Returns `None` for paths that try to leave the root or that are not valid
/// percent-encoded UTF-8.
fn sanitize_path(path: &str) -> Option<PathBuf> {
    let decoded = percent_decode(path)?;

    let mut relative = PathBuf::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            segment if segment.contains('\\') || segment.contains('\0') => return None,
            segment => relative.push(segment),
        }
    }

    Some(relative)
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            let hex = std::str::from_utf8(hex).ok()?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(decoded).ok()
}

fn encode_path(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'a'..=b'z'
            | b'A'..=b'Z'
            | b'0'..=b'9'
            | b'-'
            | b'.'
            | b'_'
            | b'~'
            | b'/'
            | b'!'
            | b'$'
            | b'&'
            | b'\''
            | b'('
            | b')'
            | b'*'
            | b'+'
            | b','
            | b';'
            | b'='
            | b':'
            | b'@' => encoded.push(byte as char),
            byte => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            ch => escaped.push(ch),
        }
    }
    escaped
}

fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match ext.to_lowercase().as_str() {
        // Text
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "xml" => "text/xml; charset=utf-8",
        "txt" => "text/plain; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "avif" => "image/avif",

        // Audio/Video
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        "pdf" => "application/pdf",
        "wasm" => "application/wasm",
        "zip" => "application/zip",

        _ => "application/octet-stream",
    }
}
