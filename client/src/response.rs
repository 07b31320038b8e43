use crate::{Error, Result};
use bytes::{Bytes, BytesMut};
use reqwest::header::{HeaderMap, HeaderName};
use reqwest::StatusCode;
use std::borrow::Cow;
use tokio_util::sync::CancellationToken;

pub(crate) const X_COS_REQUEST_ID: &str = "x-cos-request-id";
pub(crate) const X_COS_TRACE_ID: &str = "x-cos-trace-id";
const X_COS_OBJECT_TYPE: &str = "x-cos-object-type";
const X_COS_STORAGE_CLASS: &str = "x-cos-storage-class";
const X_COS_VERSION_ID: &str = "x-cos-version-id";
const X_COS_SERVER_SIDE_ENCRYPTION: &str = "x-cos-server-side-encryption";

/// Prefix of user-defined object metadata headers.
pub const X_COS_META_PREFIX: &str = "x-cos-meta-";

/// An API response.  This wraps the underlying [`reqwest::Response`] and adds accessors for the
/// service's protocol headers.  Accessors return an empty string for absent headers.
#[derive(Debug)]
pub struct Response {
    inner: reqwest::Response,
}

impl Response {
    pub fn new(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Value of the named header, or `""` if it is absent.  Bytes that are not valid UTF-8
    /// are replaced with U+FFFD.
    pub fn header(&self, name: &str) -> Cow<'_, str> {
        match self.inner.headers().get(name) {
            Some(v) => String::from_utf8_lossy(v.as_bytes()),
            None => Cow::Borrowed(""),
        }
    }

    /// ID generated by the service for every request.
    pub fn request_id(&self) -> Cow<'_, str> {
        self.header(X_COS_REQUEST_ID)
    }

    /// ID generated by the service for every failed request.
    pub fn trace_id(&self) -> Cow<'_, str> {
        self.header(X_COS_TRACE_ID)
    }

    /// Whether the object may be appended to: `normal` or `appendable`.
    pub fn object_type(&self) -> Cow<'_, str> {
        self.header(X_COS_OBJECT_TYPE)
    }

    /// Storage class of the object, e.g. `STANDARD` or `STANDARD_IA`.
    pub fn storage_class(&self) -> Cow<'_, str> {
        self.header(X_COS_STORAGE_CLASS)
    }

    pub fn version_id(&self) -> Cow<'_, str> {
        self.header(X_COS_VERSION_ID)
    }

    /// Algorithm used for service-managed encryption of the object (`AES256`), if any.
    pub fn server_side_encryption(&self) -> Cow<'_, str> {
        self.header(X_COS_SERVER_SIDE_ENCRYPTION)
    }

    /// User-defined metadata: the headers whose names start with `x-cos-meta-`.
    pub fn meta_headers(&self) -> HeaderMap {
        let mut meta = HeaderMap::new();
        for (name, value) in self.inner.headers() {
            if is_meta_header(name) {
                meta.append(name.clone(), value.clone());
            }
        }
        meta
    }

    /// Read the next chunk of the body.  Returns `None` once the body is exhausted.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        Ok(self.inner.chunk().await?)
    }

    /// Read the remainder of the body, aborting if `ctx` is cancelled.
    pub async fn bytes(&mut self, ctx: &CancellationToken) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        loop {
            let chunk = tokio::select! {
                biased;
                _ = ctx.cancelled() => return Err(Error::Cancelled),
                chunk = self.chunk() => chunk?,
            };
            match chunk {
                Some(chunk) => buf.extend_from_slice(&chunk),
                None => return Ok(buf.freeze()),
            }
        }
    }

    /// Read and discard the rest of the body so the connection can be reused.  Failures are
    /// ignored.
    pub(crate) async fn drain(&mut self, ctx: &CancellationToken) {
        loop {
            let chunk = tokio::select! {
                biased;
                _ = ctx.cancelled() => return,
                chunk = self.inner.chunk() => chunk,
            };
            match chunk {
                Ok(Some(_)) => continue,
                Ok(None) => return,
                Err(err) => {
                    tracing::debug!(error = %err, "failed to drain response body");
                    return;
                }
            }
        }
    }

    /// Consume the wrapper, returning the underlying response.  The caller is responsible for
    /// reading the rest of the body.
    pub fn into_inner(self) -> reqwest::Response {
        self.inner
    }
}

impl From<reqwest::Response> for Response {
    fn from(inner: reqwest::Response) -> Self {
        Self::new(inner)
    }
}

// header names are always lower-case
fn is_meta_header(name: &HeaderName) -> bool {
    name.as_str().starts_with(X_COS_META_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(headers: &[(&str, &str)], body: &'static str) -> Response {
        let mut builder = http::Response::builder().status(200);
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        Response::new(builder.body(body).unwrap().into())
    }

    #[test]
    fn fixed_accessors() {
        let resp = response(
            &[
                ("X-Cos-Request-Id", "NWQ1ZjY4MTBfMjZiMjU4NjRfOWI1N180NDBiYTY="),
                ("x-cos-trace-id", "trace"),
                ("x-cos-object-type", "appendable"),
                ("X-COS-STORAGE-CLASS", "STANDARD_IA"),
                ("x-cos-version-id", "MTg0NDUxNTc1NjIzMTQ1MDAwODg"),
                ("x-cos-server-side-encryption", "AES256"),
            ],
            "",
        );
        assert_eq!(resp.request_id(), "NWQ1ZjY4MTBfMjZiMjU4NjRfOWI1N180NDBiYTY=");
        assert_eq!(resp.trace_id(), "trace");
        assert_eq!(resp.object_type(), "appendable");
        assert_eq!(resp.storage_class(), "STANDARD_IA");
        assert_eq!(resp.version_id(), "MTg0NDUxNTc1NjIzMTQ1MDAwODg");
        assert_eq!(resp.server_side_encryption(), "AES256");
    }

    #[test]
    fn absent_headers_are_empty() {
        let resp = response(&[], "");
        assert_eq!(resp.request_id(), "");
        assert_eq!(resp.trace_id(), "");
        assert_eq!(resp.object_type(), "");
        assert_eq!(resp.storage_class(), "");
        assert_eq!(resp.version_id(), "");
        assert_eq!(resp.server_side_encryption(), "");
        assert!(resp.meta_headers().is_empty());
    }

    #[test]
    fn non_utf8_header_is_not_empty() {
        let resp = Response::new(
            http::Response::builder()
                .header(
                    "x-cos-request-id",
                    reqwest::header::HeaderValue::from_bytes(b"caf\xe9-1").unwrap(),
                )
                .body("")
                .unwrap()
                .into(),
        );
        assert_eq!(resp.request_id(), "caf\u{fffd}-1");
    }

    #[test]
    fn meta_headers_only() {
        let resp = response(
            &[
                ("X-Cos-Meta-Author", "alice"),
                ("x-cos-meta-tag", "a"),
                ("x-cos-meta-tag", "b"),
                ("x-cos-request-id", "id"),
                ("x-cos-storage-class", "STANDARD"),
                ("x-cos-metadata-directive", "Copy"),
                ("content-type", "text/plain"),
            ],
            "",
        );
        let meta = resp.meta_headers();
        assert_eq!(meta.len(), 3);
        assert_eq!(meta.get("x-cos-meta-author").unwrap(), "alice");
        let tags: Vec<_> = meta.get_all("X-Cos-Meta-Tag").iter().collect();
        assert_eq!(tags, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn read_body() -> Result<()> {
        let mut resp = response(&[], "hello, world");
        let body = resp.bytes(&CancellationToken::new()).await?;
        assert_eq!(body.as_ref(), b"hello, world");
        assert_eq!(resp.chunk().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn read_body_cancelled() {
        let mut resp = response(&[], "hello, world");
        let ctx = CancellationToken::new();
        ctx.cancel();
        let err = resp.bytes(&ctx).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
