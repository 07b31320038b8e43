//! The transport boundary: sending an assembled request.
use crate::{Error, Operation, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A Sender executes an assembled request and returns the raw response.
///
/// Implementations are responsible for anything the deployment requires beyond the request
/// as assembled, such as signing.  A `Sender` must not treat HTTP error statuses as failures;
/// that is the job of the [`ResponseParser`](crate::ResponseParser).
#[async_trait]
pub trait Sender: Send + Sync {
    async fn send(
        &self,
        ctx: &CancellationToken,
        operation: Operation,
        req: reqwest::Request,
    ) -> Result<reqwest::Response>;
}

/// The default Sender, backed by a [`reqwest::Client`].  Redirects are not followed.
#[derive(Debug, Clone)]
pub struct DefaultSender {
    client: reqwest::Client,
}

impl DefaultSender {
    /// Create a sender that gives up connecting after `connect_timeout`.  A request as a whole,
    /// including streaming its body in either direction, is only limited if `timeout` is given.
    pub fn new(connect_timeout: Duration, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(connect_timeout);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Use an existing reqwest client, with whatever configuration it carries.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Sender for DefaultSender {
    async fn send(
        &self,
        ctx: &CancellationToken,
        _operation: Operation,
        req: reqwest::Request,
    ) -> Result<reqwest::Response> {
        // dropping the in-flight future on cancellation closes its connection
        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(Error::Cancelled),
            res = self.client.execute(req) => Ok(res?),
        }
    }
}

/// A Sender that logs requests and responses at debug level before delegating to another
/// Sender.  Logging a response body buffers it in memory.
#[derive(Debug, Clone, Default)]
pub struct DebugSender<S> {
    inner: S,
    pub request_header: bool,
    pub request_body: bool,
    pub response_header: bool,
    pub response_body: bool,
}

impl<S: Sender> DebugSender<S> {
    /// Wrap `inner`, logging everything.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            request_header: true,
            request_body: true,
            response_header: true,
            response_body: true,
        }
    }
}

#[async_trait]
impl<S: Sender> Sender for DebugSender<S> {
    async fn send(
        &self,
        ctx: &CancellationToken,
        operation: Operation,
        req: reqwest::Request,
    ) -> Result<reqwest::Response> {
        tracing::debug!(%operation, method = %req.method(), url = %req.url(), "request");
        if self.request_header {
            log_headers("request header", req.headers());
        }
        if self.request_body {
            match req.body().map(|b| b.as_bytes()) {
                Some(Some(bytes)) => log_body("request body", bytes),
                Some(None) => tracing::debug!(%operation, "request body: <stream>"),
                None => {}
            }
        }

        let resp = self.inner.send(ctx, operation, req).await?;
        tracing::debug!(%operation, status = %resp.status(), "response");
        if self.response_header {
            log_headers("response header", resp.headers());
        }
        if !self.response_body {
            return Ok(resp);
        }

        // buffer the body so it can be logged, then rebuild the response around it
        let status = resp.status();
        let version = resp.version();
        let headers = resp.headers().clone();
        let body = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(Error::Cancelled),
            body = resp.bytes() => body?,
        };
        log_body("response body", &body);

        let mut rebuilt = http::Response::new(body);
        *rebuilt.status_mut() = status;
        *rebuilt.version_mut() = version;
        *rebuilt.headers_mut() = headers;
        Ok(rebuilt.into())
    }
}

fn log_headers(what: &str, headers: &HeaderMap) {
    for (name, value) in headers {
        tracing::debug!("{}: {}: {}", what, name, String::from_utf8_lossy(value.as_bytes()));
    }
}

fn log_body(what: &str, body: &[u8]) {
    tracing::debug!("{}: {}", what, String::from_utf8_lossy(body));
}
