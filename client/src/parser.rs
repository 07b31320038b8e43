//! The decoder boundary: turning a raw response into a typed result or an API error.
use crate::response::{X_COS_REQUEST_ID, X_COS_TRACE_ID};
use crate::{Error, ErrorResponse, Operation, Response, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

/// A value that can be populated from an XML response body.  This is implemented for every
/// [`serde::de::DeserializeOwned`] type; decoding replaces the whole value.
pub trait XmlTarget: Send {
    fn decode_xml(&mut self, body: &[u8]) -> std::result::Result<(), quick_xml::DeError>;
}

impl<T: DeserializeOwned + Send> XmlTarget for T {
    fn decode_xml(&mut self, body: &[u8]) -> std::result::Result<(), quick_xml::DeError> {
        *self = quick_xml::de::from_reader(body)?;
        Ok(())
    }
}

/// A ResponseParser checks the status of a response and decodes its body into the target.
///
/// It is the only component that decides whether a status is a service-reported failure
/// ([`Error::Api`]), and it must report undecodable successful bodies as [`Error::Decode`].
/// Implementations should leave any body they do not need unread; the client drains it.
#[async_trait]
pub trait ResponseParser: Send + Sync {
    async fn parse_response(
        &self,
        ctx: &CancellationToken,
        operation: Operation,
        resp: &mut Response,
        result: Option<&mut dyn XmlTarget>,
    ) -> Result<()>;
}

/// The default ResponseParser, decoding XML bodies.  Success and redirection statuses are
/// treated as OK; anything else is an [`Error::Api`].
#[derive(Debug, Clone, Default)]
pub struct DefaultResponseParser;

#[async_trait]
impl ResponseParser for DefaultResponseParser {
    async fn parse_response(
        &self,
        ctx: &CancellationToken,
        operation: Operation,
        resp: &mut Response,
        result: Option<&mut dyn XmlTarget>,
    ) -> Result<()> {
        check_response(ctx, operation, resp).await?;

        let result = match result {
            Some(result) => result,
            None => return Ok(()),
        };
        let body = resp.bytes(ctx).await?;
        // an empty body leaves the result as-is
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        result.decode_xml(&body).map_err(Error::Decode)
    }
}

/// Check the response status, returning an [`Error::Api`] built from the error document if the
/// request failed.
pub async fn check_response(
    ctx: &CancellationToken,
    operation: Operation,
    resp: &mut Response,
) -> Result<()> {
    let status = resp.status();
    if status.is_success() || status.is_redirection() {
        return Ok(());
    }

    let body = resp.bytes(ctx).await?;
    let is_xml = body.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'<');
    let mut err: ErrorResponse = if is_xml {
        quick_xml::de::from_reader(body.as_ref()).unwrap_or_else(|e| {
            tracing::debug!(%operation, error = %e, "unparseable error response");
            ErrorResponse::default()
        })
    } else {
        ErrorResponse {
            message: String::from_utf8_lossy(&body).trim().to_owned(),
            ..Default::default()
        }
    };
    err.status = status.as_u16();
    if err.code.is_empty() {
        err.code = status.canonical_reason().unwrap_or_default().to_owned();
    }
    if err.request_id.is_empty() {
        err.request_id = resp.header(X_COS_REQUEST_ID).into_owned();
    }
    if err.trace_id.is_empty() {
        err.trace_id = resp.header(X_COS_TRACE_ID).into_owned();
    }
    tracing::debug!(%operation, status = err.status, code = %err.code, request_id = %err.request_id, "api error");
    Err(err.into())
}
