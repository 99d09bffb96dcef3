use std::{
    fmt,
    fs::File,
    io::{self, Cursor, Read},
};

/// Payload of a request or response.
///
/// Request bodies are always buffered by the parser. Response bodies can also
/// stream from a reader of known length, which is how files are served without
/// loading them into memory.
#[derive(Default)]
pub struct Body(BodyInner);

#[derive(Default)]
enum BodyInner {
    #[default]
    Empty,
    Buffered(Vec<u8>),
    Reader(Box<dyn Read>, u64),
}

impl Body {
    pub fn empty() -> Self {
        Body(BodyInner::Empty)
    }

    pub fn from_reader(reader: impl Read + 'static, length: u64) -> Self {
        Body(BodyInner::Reader(Box::new(reader), length))
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        match &self.0 {
            BodyInner::Empty => 0,
            BodyInner::Buffered(bytes) => bytes.len() as u64,
            BodyInner::Reader(_, len) => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_bytes(self) -> io::Result<Vec<u8>> {
        match self.0 {
            BodyInner::Empty => Ok(Vec::new()),
            BodyInner::Buffered(bytes) => Ok(bytes),
            BodyInner::Reader(stream, len) => {
                let mut buf = Vec::with_capacity(len as usize);
                stream.take(len).read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }

    pub fn into_reader(self) -> impl Read {
        match self.0 {
            BodyInner::Empty => BodyReader::Buffered(Cursor::new(Vec::new())),
            BodyInner::Buffered(bytes) => BodyReader::Buffered(Cursor::new(bytes)),
            BodyInner::Reader(stream, len) => BodyReader::Reader(stream.take(len)),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            BodyInner::Empty => f.write_str("Body::Empty"),
            BodyInner::Buffered(bytes) => write!(f, "Body::Buffered({} bytes)", bytes.len()),
            BodyInner::Reader(_, len) => write!(f, "Body::Reader({len} bytes)"),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(body: Vec<u8>) -> Self {
        Body(BodyInner::Buffered(body))
    }
}

impl From<&[u8]> for Body {
    fn from(body: &[u8]) -> Self {
        body.to_vec().into()
    }
}

impl From<&str> for Body {
    fn from(body: &str) -> Self {
        body.as_bytes().to_vec().into()
    }
}

impl From<String> for Body {
    fn from(body: String) -> Self {
        body.into_bytes().into()
    }
}

impl TryFrom<File> for Body {
    type Error = io::Error;

    fn try_from(file: File) -> Result<Self, Self::Error> {
        match file.metadata() {
            Ok(meta) if meta.is_file() => Ok(Body::from_reader(file, meta.len())),
            Ok(_) => Err(io::Error::new(io::ErrorKind::Other, "not a file")),
            Err(err) => Err(err),
        }
    }
}

enum BodyReader {
    Buffered(Cursor<Vec<u8>>),
    Reader(io::Take<Box<dyn Read>>),
}

impl Read for BodyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            BodyReader::Buffered(cursor) => cursor.read(buf),
            BodyReader::Reader(reader) => reader.read(buf),
        }
    }
}
