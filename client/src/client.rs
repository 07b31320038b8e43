use crate::body::{encode_body, RequestBody};
use crate::options::{add_header_options, add_url_options, HeaderOptions, QueryOptions};
use crate::parser::{DefaultResponseParser, ResponseParser, XmlTarget};
use crate::sender::{DefaultSender, Sender};
use crate::{BucketService, Error, ObjectService, Operation, Response, Result, ServiceService};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, Url};
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent sent with every request unless configured otherwise.
pub const DEFAULT_USER_AGENT: &str = concat!("cos-rs/", env!("CARGO_PKG_VERSION"));

/// Base URL of the service API, used for account-level calls such as listing buckets.
pub const DEFAULT_SERVICE_URL: &str = "https://service.cos.myqcloud.com";

const CONTENT_MD5: &str = "Content-MD5";

/// The base URLs for API calls.  Both are absolute URLs without a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    /// Base for bucket and object calls, e.g. `https://test-1250000000.cos.ap-beijing.myqcloud.com`
    bucket_url: Option<Url>,
    /// Base for service calls, e.g. `https://service.cos.myqcloud.com`
    service_url: Url,
}

impl BaseUrl {
    /// Create a BaseUrl for the given bucket URL, with the default service URL.
    pub fn new(bucket_url: &str) -> Result<Self> {
        Ok(Self {
            bucket_url: Some(Url::parse(bucket_url)?),
            ..Self::default()
        })
    }

    /// Replace the service URL.
    pub fn with_service_url(mut self, service_url: &str) -> Result<Self> {
        self.service_url = Url::parse(service_url)?;
        Ok(self)
    }

    /// Build the URL of a bucket from its parts:
    /// `{scheme}://{bucket}-{app_id}.cos.{region}.myqcloud.com`.
    pub fn make_bucket_url(bucket: &str, app_id: &str, region: &str, secure: bool) -> Result<Url> {
        let scheme = if secure { "https" } else { "http" };
        Ok(Url::parse(&format!(
            "{}://{}-{}.cos.{}.myqcloud.com",
            scheme, bucket, app_id, region
        ))?)
    }

    pub fn bucket_url(&self) -> Option<&Url> {
        self.bucket_url.as_ref()
    }

    pub fn service_url(&self) -> &Url {
        &self.service_url
    }

    fn endpoint(&self, endpoint: Endpoint) -> Result<&Url> {
        match endpoint {
            Endpoint::Bucket => self.bucket_url.as_ref().ok_or(Error::MissingBucketUrl),
            Endpoint::Service => Ok(&self.service_url),
        }
    }
}

impl Default for BaseUrl {
    /// A BaseUrl with only the default service URL.
    fn default() -> Self {
        Self {
            bucket_url: None,
            service_url: Url::parse(DEFAULT_SERVICE_URL).expect("default service URL is valid"),
        }
    }
}

impl From<Url> for BaseUrl {
    fn from(bucket_url: Url) -> Self {
        Self {
            bucket_url: Some(bucket_url),
            ..Self::default()
        }
    }
}

/// Selects which base URL a request is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Bucket,
    Service,
}

/// ClientBuilder implements the builder pattern for building a Client, allowing
/// optional configuration of the transport, response parsing, user agent, and timeouts.
#[derive(Clone)]
pub struct ClientBuilder {
    base_url: BaseUrl,
    user_agent: String,
    connect_timeout: Duration,
    timeout: Option<Duration>,
    sender: Option<Arc<dyn Sender>>,
    response_parser: Option<Arc<dyn ResponseParser>>,
}

impl ClientBuilder {
    /// Create a new ClientBuilder for the given base URLs.
    pub fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            connect_timeout: Duration::from_secs(30),
            timeout: None,
            sender: None,
            response_parser: None,
        }
    }

    /// Create a new ClientBuilder from environment variables:
    ///
    /// * `COS_BUCKET_URL` (optional)
    /// * `COS_SERVICE_URL` (optional, defaults to [`DEFAULT_SERVICE_URL`])
    pub fn from_env() -> Result<Self> {
        let mut base_url = match env::var("COS_BUCKET_URL") {
            Ok(u) if !u.is_empty() => BaseUrl::new(&u)?,
            _ => BaseUrl::default(),
        };
        if let Ok(u) = env::var("COS_SERVICE_URL") {
            if !u.is_empty() {
                base_url = base_url.with_service_url(&u)?;
            }
        }
        Ok(Self::new(base_url))
    }

    /// Set the User-Agent header sent with requests that do not set one themselves.  An
    /// empty string disables it.
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set how long the default sender waits to establish a connection.  The default is
    /// 30 seconds.  This has no effect if a sender is supplied.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Limit each HTTP request made by the default sender, from sending it until the response
    /// body is read, to `timeout`.  There is no such limit by default, since object uploads and
    /// downloads can take arbitrarily long.  This has no effect if a sender is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use the given sender to execute requests, instead of [`DefaultSender`].
    pub fn sender<S: Sender + 'static>(mut self, sender: S) -> Self {
        self.sender = Some(Arc::new(sender));
        self
    }

    /// Use the given parser for responses, instead of [`DefaultResponseParser`].
    pub fn response_parser<P: ResponseParser + 'static>(mut self, parser: P) -> Self {
        self.response_parser = Some(Arc::new(parser));
        self
    }

    /// Build the resulting client, consuming the builder
    pub fn build(self) -> Result<Client> {
        Client::new(self)
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("connect_timeout", &self.connect_timeout)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl From<BaseUrl> for ClientBuilder {
    fn from(base_url: BaseUrl) -> Self {
        Self::new(base_url)
    }
}

/// Describes a single API call: where it goes, what it carries, and where the response body
/// should be decoded.  Consumed by [`Client::send`].
pub struct SendOptions<'a> {
    pub operation: Operation,
    pub endpoint: Endpoint,
    /// Path and query relative to the endpoint, e.g. `/?acl`
    pub uri: String,
    pub method: Method,
    pub body: RequestBody<'a>,
    pub opt_query: Option<&'a dyn QueryOptions>,
    pub opt_header: Option<&'a dyn HeaderOptions>,
    /// Decode a successful response body into this value
    pub result: Option<&'a mut dyn XmlTarget>,
    /// Leave the response body for the caller instead of draining it
    pub disable_close_body: bool,
}

impl<'a> SendOptions<'a> {
    /// A bodiless request to the bucket endpoint.
    pub fn new<S: Into<String>>(operation: Operation, method: Method, uri: S) -> Self {
        Self {
            operation,
            endpoint: Endpoint::Bucket,
            uri: uri.into(),
            method,
            body: RequestBody::Empty,
            opt_query: None,
            opt_header: None,
            result: None,
            disable_close_body: false,
        }
    }

    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn body(mut self, body: RequestBody<'a>) -> Self {
        self.body = body;
        self
    }

    pub fn query(mut self, opt: &'a dyn QueryOptions) -> Self {
        self.opt_query = Some(opt);
        self
    }

    pub fn header(mut self, opt: &'a dyn HeaderOptions) -> Self {
        self.opt_header = Some(opt);
        self
    }

    pub fn result(mut self, result: &'a mut dyn XmlTarget) -> Self {
        self.result = Some(result);
        self
    }

    /// Hand the response body to the caller, who becomes responsible for reading it.
    pub fn keep_body(mut self) -> Self {
        self.disable_close_body = true;
        self
    }
}

impl fmt::Debug for SendOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendOptions")
            .field("operation", &self.operation)
            .field("endpoint", &self.endpoint)
            .field("uri", &self.uri)
            .field("method", &self.method)
            .field("body", &self.body)
            .field("disable_close_body", &self.disable_close_body)
            .finish_non_exhaustive()
    }
}

/// Client is the entry point into all the functionality in this package.  It holds the base
/// URLs and the injected transport and response parser.  Once built it is immutable, and
/// cheap to clone.
#[derive(Clone)]
pub struct Client {
    base_url: BaseUrl,
    user_agent: String,
    sender: Arc<dyn Sender>,
    response_parser: Arc<dyn ResponseParser>,
}

impl Client {
    /// Create a new client (public interface is via
    /// [`ClientBuilder::build`](crate::ClientBuilder::build))
    fn new(b: ClientBuilder) -> Result<Client> {
        let sender = match b.sender {
            Some(sender) => sender,
            None => Arc::new(DefaultSender::new(b.connect_timeout, b.timeout)?),
        };
        let response_parser = b
            .response_parser
            .unwrap_or_else(|| Arc::new(DefaultResponseParser));
        Ok(Client {
            base_url: b.base_url,
            user_agent: b.user_agent,
            sender,
            response_parser,
        })
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Service-level API calls
    pub fn service(&self) -> ServiceService<'_> {
        ServiceService::new(self)
    }

    /// Bucket API calls
    pub fn bucket(&self) -> BucketService<'_> {
        BucketService::new(self)
    }

    /// Object API calls
    pub fn object(&self) -> ObjectService<'_> {
        ObjectService::new(self)
    }

    /// Make an API call.  The resource-specific methods are generally more convenient, but this
    /// method can be used to make any call directly.
    ///
    /// Unless [`SendOptions::keep_body`] was used, the response body has been fully read when
    /// this returns, whether or not the call succeeded.
    pub async fn send(&self, ctx: &CancellationToken, mut opt: SendOptions<'_>) -> Result<Response> {
        let req = self.new_request(&mut opt)?;
        let SendOptions {
            operation,
            result,
            disable_close_body,
            ..
        } = opt;
        self.do_api(ctx, operation, req, result, !disable_close_body)
            .await
    }

    /// Assemble the request described by `opt`, without sending it.  The body is taken out of
    /// `opt`.
    pub fn new_request(&self, opt: &mut SendOptions<'_>) -> Result<reqwest::Request> {
        let base = self.base_url.endpoint(opt.endpoint)?;
        // the relative part may replace path, query and fragment but never the origin
        let resolved = base.join(&opt.uri)?;
        let mut url = base.clone();
        url.set_path(resolved.path());
        url.set_query(raw_query(&opt.uri));
        url.set_fragment(resolved.fragment());
        add_url_options(&mut url, opt.opt_query);

        let encoded = encode_body(std::mem::take(&mut opt.body))?;

        let mut headers = HeaderMap::new();
        add_header_options(&mut headers, opt.opt_header)?;

        let declared_len = declared_content_length(&headers)?;
        let body_len = encoded.body.len();
        match (declared_len, body_len) {
            (Some(declared), Some(actual)) if declared != actual => {
                return Err(Error::ContentLengthMismatch { declared, actual });
            }
            // say so explicitly when there is no body; not all methods imply it
            (None, Some(0)) => {
                headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
            }
            _ => {}
        }

        if let Some(md5) = encoded.content_md5 {
            let value = HeaderValue::from_str(&md5).map_err(|_| Error::InvalidHeader {
                name: CONTENT_MD5.to_owned(),
            })?;
            headers.insert(CONTENT_MD5, value);
        }
        if !self.user_agent.is_empty() && !headers.contains_key(USER_AGENT) {
            let value = HeaderValue::from_str(&self.user_agent).map_err(|_| {
                Error::InvalidHeader {
                    name: USER_AGENT.to_string(),
                }
            })?;
            headers.insert(USER_AGENT, value);
        }
        if let Some(content_type) = encoded.content_type {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
        }

        let mut req = reqwest::Request::new(opt.method.clone(), url);
        *req.headers_mut() = headers;
        *req.body_mut() = encoded.body.into_body(declared_len);
        Ok(req)
    }

    async fn do_api(
        &self,
        ctx: &CancellationToken,
        operation: Operation,
        req: reqwest::Request,
        result: Option<&mut dyn XmlTarget>,
        close_body: bool,
    ) -> Result<Response> {
        tracing::debug!(%operation, method = %req.method(), url = %req.url(), "sending request");
        let mut resp = Response::new(self.sender.send(ctx, operation, req).await?);
        tracing::debug!(
            %operation,
            status = %resp.status(),
            request_id = %resp.request_id(),
            "received response"
        );

        let parsed = self
            .response_parser
            .parse_response(ctx, operation, &mut resp, result)
            .await;

        // read the rest of the body to let the transport reuse the connection
        if close_body {
            resp.drain(ctx).await;
        }
        parsed.map(|()| resp)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

/// The query of `uri` as written, between the first `?` and any `#`.
fn raw_query(uri: &str) -> Option<&str> {
    let uri = uri.split_once('#').map_or(uri, |(before, _)| before);
    uri.split_once('?').map(|(_, query)| query)
}

fn declared_content_length(headers: &HeaderMap) -> Result<Option<u64>> {
    let value = match headers.get(CONTENT_LENGTH) {
        Some(v) => v,
        None => return Ok(None),
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .map(Some)
        .ok_or_else(|| Error::InvalidHeader {
            name: CONTENT_LENGTH.to_string(),
        })
}
