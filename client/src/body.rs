//! Request body encoding.
use crate::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use md5::{Digest, Md5};
use reqwest::Body;
use serde::Serialize;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::codec::{BytesCodec, FramedRead};

/// Media type of structured request and response documents.
pub const CONTENT_TYPE_XML: &str = "application/xml";

/// A value that can be serialized to the service's XML wire format.  This is implemented for
/// every [`serde::Serialize`] type; the root element is named after the type (or its
/// `#[serde(rename)]`).
pub trait XmlDocument: Sync {
    fn to_xml(&self) -> std::result::Result<String, quick_xml::SeError>;
}

impl<T: Serialize + Sync> XmlDocument for T {
    fn to_xml(&self) -> std::result::Result<String, quick_xml::SeError> {
        quick_xml::se::to_string(self)
    }
}

/// An opaque payload, sent without any transformation.
pub enum RawBody {
    /// In-memory data of known length
    Bytes(Bytes),
    /// Streamed data of unknown length.  Declare a `Content-Length` header to send it
    /// without chunked encoding.
    Reader(Box<dyn AsyncRead + Send + Sync + Unpin + 'static>),
}

impl RawBody {
    pub fn reader<R: AsyncRead + Send + Sync + Unpin + 'static>(reader: R) -> Self {
        RawBody::Reader(Box::new(reader))
    }
}

impl fmt::Debug for RawBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawBody::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            RawBody::Reader(_) => f.write_str("Reader"),
        }
    }
}

impl From<Bytes> for RawBody {
    fn from(b: Bytes) -> Self {
        RawBody::Bytes(b)
    }
}

impl From<Vec<u8>> for RawBody {
    fn from(b: Vec<u8>) -> Self {
        RawBody::Bytes(b.into())
    }
}

impl From<&'static [u8]> for RawBody {
    fn from(b: &'static [u8]) -> Self {
        RawBody::Bytes(Bytes::from_static(b))
    }
}

impl From<tokio::fs::File> for RawBody {
    fn from(f: tokio::fs::File) -> Self {
        RawBody::reader(f)
    }
}

/// The body of a request.
#[derive(Default)]
pub enum RequestBody<'a> {
    /// No body at all
    #[default]
    Empty,
    /// Uploaded content, passed through untouched
    Raw(RawBody),
    /// A structured document, serialized to XML
    Document(&'a dyn XmlDocument),
}

impl fmt::Debug for RequestBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("Empty"),
            RequestBody::Raw(raw) => f.debug_tuple("Raw").field(raw).finish(),
            RequestBody::Document(_) => f.write_str("Document"),
        }
    }
}

/// The wire form of a [`RequestBody`].
#[derive(Debug)]
pub struct EncodedBody {
    pub(crate) body: EncodedPayload,
    /// Content type to send if the caller did not set one
    pub content_type: Option<&'static str>,
    /// base64-encoded MD5 of the serialized document, for `Content-MD5`
    pub content_md5: Option<String>,
}

pub(crate) enum EncodedPayload {
    None,
    Bytes(Bytes),
    Reader(Box<dyn AsyncRead + Send + Sync + Unpin + 'static>),
}

impl fmt::Debug for EncodedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodedPayload::None => f.write_str("None"),
            EncodedPayload::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            EncodedPayload::Reader(_) => f.write_str("Reader"),
        }
    }
}

impl EncodedBody {
    /// The body bytes, if the body is held in memory.
    pub fn bytes(&self) -> Option<&Bytes> {
        match &self.body {
            EncodedPayload::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// Encode a request body.
///
/// Raw bodies are passed through with no content type or digest.  Documents are serialized,
/// typed as XML and digested.  An empty body is still typed as XML, which the service
/// expects for bodiless calls such as ACL reads.
pub fn encode_body(body: RequestBody<'_>) -> Result<EncodedBody> {
    match body {
        RequestBody::Empty => Ok(EncodedBody {
            body: EncodedPayload::None,
            content_type: Some(CONTENT_TYPE_XML),
            content_md5: None,
        }),
        RequestBody::Raw(RawBody::Bytes(b)) => Ok(EncodedBody {
            body: EncodedPayload::Bytes(b),
            content_type: None,
            content_md5: None,
        }),
        RequestBody::Raw(RawBody::Reader(reader)) => Ok(EncodedBody {
            body: EncodedPayload::Reader(reader),
            content_type: None,
            content_md5: None,
        }),
        RequestBody::Document(doc) => {
            let xml = doc.to_xml().map_err(Error::Serialize)?;
            let bytes = Bytes::from(xml);
            let content_md5 = content_md5(&bytes);
            Ok(EncodedBody {
                body: EncodedPayload::Bytes(bytes),
                content_type: Some(CONTENT_TYPE_XML),
                content_md5: Some(content_md5),
            })
        }
    }
}

/// base64-encoded MD5 digest of `data`.
pub fn content_md5(data: &[u8]) -> String {
    STANDARD.encode(Md5::digest(data))
}

impl EncodedPayload {
    /// Size of the payload, if known without reading it.
    pub(crate) fn len(&self) -> Option<u64> {
        match self {
            EncodedPayload::None => Some(0),
            EncodedPayload::Bytes(b) => Some(b.len() as u64),
            EncodedPayload::Reader(_) => None,
        }
    }

    /// Convert into a reqwest body.  A streamed payload with a declared length is wrapped so
    /// that exactly that many bytes are sent.
    pub(crate) fn into_body(self, declared_len: Option<u64>) -> Option<Body> {
        match self {
            EncodedPayload::None => None,
            EncodedPayload::Bytes(b) => Some(b.into()),
            EncodedPayload::Reader(reader) => Some(match declared_len {
                Some(len) => stream_body(ExactLengthReader::new(reader, len)),
                None => stream_body(reader),
            }),
        }
    }
}

fn stream_body<R: AsyncRead + Send + Sync + Unpin + 'static>(reader: R) -> Body {
    Body::wrap_stream(FramedRead::new(reader, BytesCodec::new()))
}

/// Wrapper for an AsyncRead that fails if the inner reader produces more or fewer than
/// `remaining` bytes.
struct ExactLengthReader<R> {
    inner: R,
    remaining: u64,
}

impl<R> ExactLengthReader<R> {
    fn new(inner: R, len: u64) -> Self {
        Self {
            inner,
            remaining: len,
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ExactLengthReader<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let before = buf.filled().len();
        let res = Pin::new(&mut self.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = res {
            let read = (buf.filled().len() - before) as u64;
            if read == 0 && self.remaining > 0 {
                return Poll::Ready(Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("body ended {} bytes short of Content-Length", self.remaining),
                )));
            }
            if read > self.remaining {
                // an error must not be returned alongside data
                buf.set_filled(before);
                return Poll::Ready(Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "body is longer than Content-Length",
                )));
            }
            self.remaining -= read;
        }
        res
    }
}
