use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;

/// Result type for all operations in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by the client.
///
/// Variants fall into the classes the request pipeline distinguishes: construction errors
/// (`InvalidUrl`, `InvalidHeader`, `MissingBucketUrl`, `ContentLengthMismatch`) and
/// serialization errors (`Serialize`) are raised before anything is sent; `Transport`, `Io`
/// and `Cancelled` mean no usable response exists; `Api` is a failure reported by the
/// service; `Decode` is a successful response whose body does not match the expected shape.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid header {name:?}")]
    InvalidHeader { name: String },

    #[error("no bucket URL configured for a bucket-scoped request")]
    MissingBucketUrl,

    #[error("Content-Length header declares {declared} bytes but the body has {actual}")]
    ContentLengthMismatch { declared: u64, actual: u64 },

    #[error("failed to serialize request document")]
    Serialize(#[source] quick_xml::SeError),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error(transparent)]
    Api(Box<ErrorResponse>),

    #[error("failed to decode response body")]
    Decode(#[source] quick_xml::DeError),
}

impl Error {
    /// If this error was caused by an HTTP response, return its status code.  Transport errors
    /// created from a response (see [`reqwest::Response::error_for_status`]) are included.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Error::Api(resp) => StatusCode::from_u16(resp.status).ok(),
            Error::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// The service-reported error, if this is a protocol error.
    pub fn api_error(&self) -> Option<&ErrorResponse> {
        match self {
            Error::Api(resp) => Some(resp),
            _ => None,
        }
    }
}

impl From<ErrorResponse> for Error {
    fn from(resp: ErrorResponse) -> Self {
        Error::Api(Box::new(resp))
    }
}

/// Error document returned by the service for failed requests.
///
/// ```xml
/// <Error>
///   <Code>NoSuchBucket</Code>
///   <Message>The specified bucket does not exist.</Message>
///   <Resource>examplebucket-1250000000.cos.ap-beijing.myqcloud.com</Resource>
///   <RequestId>NTk0MTdiMzRfMjQ4OGY4MGFfMTAxNzFfMmIzZjZh****</RequestId>
///   <TraceId>OGVmYzZiMmQzYjA2OWNhODk0NTRkMTBiOWVmMDAxODc0OWRkZjk0ZDM1NmI1M2E2MTRlY2MzZDhmNmI5MWI1OTBjYjhjNzc****</TraceId>
/// </Error>
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename = "Error")]
pub struct ErrorResponse {
    /// HTTP status of the response
    #[serde(skip)]
    pub status: u16,
    #[serde(rename = "Code", default)]
    pub code: String,
    #[serde(rename = "Message", default)]
    pub message: String,
    #[serde(rename = "Resource", default)]
    pub resource: String,
    #[serde(rename = "RequestId", default)]
    pub request_id: String,
    #[serde(rename = "TraceId", default)]
    pub trace_id: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} (RequestId: {}, TraceId: {})",
            self.status, self.code, self.message, self.request_id, self.trace_id
        )
    }
}

impl std::error::Error for ErrorResponse {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_of_api_error() {
        let err = Error::from(ErrorResponse {
            status: 404,
            code: "NoSuchBucket".into(),
            ..Default::default()
        });
        assert_eq!(err.status_code(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.api_error().unwrap().code, "NoSuchBucket");
    }

    #[test]
    fn status_code_of_local_error() {
        let err = Error::ContentLengthMismatch {
            declared: 10,
            actual: 3,
        };
        assert_eq!(err.status_code(), None);
        assert!(err.api_error().is_none());
    }

    #[test]
    fn display_api_error() {
        let resp = ErrorResponse {
            status: 403,
            code: "AccessDenied".into(),
            message: "Access Denied.".into(),
            request_id: "req-1".into(),
            trace_id: "trace-1".into(),
            ..Default::default()
        };
        assert_eq!(
            Error::from(resp).to_string(),
            "403 AccessDenied: Access Denied. (RequestId: req-1, TraceId: trace-1)"
        );
    }
}
