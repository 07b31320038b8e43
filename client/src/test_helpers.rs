//! Utilities for testing the request pipeline without a network.
use crate::{Operation, Result, Sender};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, Url};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Event logger, used to log events from various places and then assert on them.
#[derive(Default, Clone)]
pub(crate) struct Logger {
    logged: Arc<Mutex<Vec<String>>>,
}

impl Logger {
    pub(crate) fn log<S: Into<String>>(&self, message: S) {
        self.logged.lock().unwrap().push(message.into())
    }

    pub(crate) fn assert(&self, expected: Vec<String>) {
        assert_eq!(*self.logged.lock().unwrap(), expected);
    }
}

/// A request as seen by a [`FakeSender`].
#[derive(Debug, Clone)]
pub(crate) struct SentRequest {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: HeaderMap,
    /// `None` if there was no body; `Some(None)` for a streamed body
    pub(crate) body: Option<Option<Bytes>>,
}

impl SentRequest {
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|v| v.to_str().unwrap())
    }

    pub(crate) fn body_bytes(&self) -> &[u8] {
        match &self.body {
            Some(Some(b)) => b,
            Some(None) => panic!("streamed body"),
            None => b"",
        }
    }
}

/// Fake implementation of the transport, recording each request and answering with a fixed
/// response.
#[derive(Clone)]
pub(crate) struct FakeSender {
    logger: Logger,
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
    requests: Arc<Mutex<Vec<SentRequest>>>,
}

impl FakeSender {
    pub(crate) fn new(
        logger: Logger,
        status: u16,
        headers: &[(&str, &str)],
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            logger,
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.into(),
            requests: Arc::default(),
        }
    }

    /// Requests sent so far.
    pub(crate) fn requests(&self) -> Vec<SentRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> SentRequest {
        self.requests().pop().expect("no requests sent")
    }
}

#[async_trait]
impl Sender for FakeSender {
    async fn send(
        &self,
        _ctx: &CancellationToken,
        operation: Operation,
        req: reqwest::Request,
    ) -> Result<reqwest::Response> {
        self.logger.log(format!(
            "send {} {} {}",
            operation,
            req.method(),
            req.url()
        ));
        self.requests.lock().unwrap().push(SentRequest {
            method: req.method().clone(),
            url: req.url().clone(),
            headers: req.headers().clone(),
            body: req
                .body()
                .map(|b| b.as_bytes().map(Bytes::copy_from_slice)),
        });

        let mut builder = http::Response::builder().status(self.status);
        for (k, v) in &self.headers {
            builder = builder.header(k, v);
        }
        Ok(builder.body(self.body.clone()).unwrap().into())
    }
}
