/*!
# COS Object Storage Client for Rust

This client is a wrapper around `reqwest` that turns declarative option values and request
bodies into calls to the COS REST/XML API, and decodes the XML responses into typed results.

# Usage

## Setup

Before calling an API end-point, you'll need to build a client, using the
[`ClientBuilder`](crate::ClientBuilder) type.  A client needs a [`BaseUrl`](crate::BaseUrl):
the URL of the bucket to operate on (if any) and the URL of the service endpoint, which has a
sensible default.

The client does not sign requests.  Deployments requiring authentication should supply a
[`Sender`](crate::Sender) that signs each request before sending it.

```
# use httptest::{matchers::*, responders::*, Expectation, Server};
# use anyhow::Result;
# #[tokio::main]
# async fn main() -> Result<()> {
# let server = Server::run();
# server.expect(
#    Expectation::matching(all_of![
#        request::method_path("GET", "/"),
#        request::query(url_decoded(contains(("location", "")))),
#    ])
#   .respond_with(
#       status_code(200)
#       .append_header("x-cos-request-id", "NWQ1ZjY4MTBf")
#       .body("<LocationConstraint>ap-beijing</LocationConstraint>"))
# );
# let bucket_url = server.url_str("");
use cos::{BaseUrl, ClientBuilder};
use tokio_util::sync::CancellationToken;

let client = ClientBuilder::new(BaseUrl::new(&bucket_url)?).build()?;
let ctx = CancellationToken::new();
let (location, resp) = client.bucket().get_location(&ctx).await?;
assert_eq!(location.location, "ap-beijing");
assert_eq!(resp.request_id(), "NWQ1ZjY4MTBf");
Ok(())
# }
```

## Calling API Methods

API methods are grouped by the resource they act on: [`Client::service`],
[`Client::bucket`] and [`Client::object`].  Each takes a [`CancellationToken`]; cancelling it
aborts the call, including any in-flight network operation, with [`Error::Cancelled`].

Methods returning a decoded document return it along with the [`Response`], whose accessors
expose protocol headers such as [`Response::request_id`] and [`Response::meta_headers`].

Any other call can be made with [`Client::send`], describing it with [`SendOptions`]:

```
# use httptest::{matchers::*, responders::*, Expectation, Server};
# use anyhow::Result;
# #[tokio::main]
# async fn main() -> Result<()> {
# let server = Server::run();
# server.expect(
#    Expectation::matching(all_of![
#        request::method_path("GET", "/"),
#        request::query(url_decoded(all_of![
#            contains(("uploads", "")),
#            contains(("prefix", "logs/")),
#        ])),
#    ])
#   .respond_with(status_code(200).body("<ListMultipartUploadsResult><Bucket>test</Bucket></ListMultipartUploadsResult>"))
# );
# let bucket_url = server.url_str("");
use cos::{BaseUrl, ClientBuilder, Operation, OptionField, QueryOptions, SendOptions};
use reqwest::Method;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

struct ListUploads {
    prefix: String,
}

impl QueryOptions for ListUploads {
    fn query_fields(&self) -> Vec<OptionField> {
        vec![OptionField::omit_empty("prefix", &self.prefix)]
    }
}

#[derive(Debug, Default, Deserialize)]
struct ListMultipartUploadsResult {
    #[serde(rename = "Bucket")]
    bucket: String,
}

let client = ClientBuilder::new(BaseUrl::new(&bucket_url)?).build()?;
let opt = ListUploads { prefix: "logs/".into() };
let mut res = ListMultipartUploadsResult::default();
client
    .send(
        &CancellationToken::new(),
        SendOptions::new(Operation::Custom("Bucket.ListMultipartUploads"), Method::GET, "/?uploads")
            .query(&opt)
            .result(&mut res),
    )
    .await?;
assert_eq!(res.bucket, "test");
Ok(())
# }
```

Query options are always appended after the query already present in the path, since the
service routes on the first query parameter.

## Request Bodies

A [`RequestBody`] is either empty, a [`RawBody`] sent exactly as supplied (in memory, or
streamed from an [`AsyncRead`](tokio::io::AsyncRead)), or a document serialized to XML with a
`Content-MD5` header.  A streamed body with a declared `Content-Length` is checked against that
length as it is sent.

## Errors

All failures are represented by [`Error`].  Responses with an error status are
[`Error::Api`], carrying the service's [`ErrorResponse`]; successful responses whose body does
not match the expected document are [`Error::Decode`].

## Logging

The crate logs with `tracing` at debug level.  Wrap a sender in [`DebugSender`] to also log
request and response headers and bodies.
*/

mod acl;
mod body;
mod bucket;
mod client;
mod error;
mod object;
mod operation;
mod options;
mod parser;
mod response;
mod sender;
mod service;
mod util;

#[cfg(test)]
mod test_helpers;

pub use acl::{
    AccessControlList, AclGrant, AclGrantee, AclHeaderOptions, AclXml, Owner,
    OBJECT_TYPE_APPENDABLE, OBJECT_TYPE_NORMAL, PERMISSION_FULL_CONTROL, PERMISSION_READ,
    PERMISSION_WRITE, SERVER_SIDE_ENCRYPTION_AES256, STORAGE_CLASS_ARCHIVE,
    STORAGE_CLASS_STANDARD, STORAGE_CLASS_STANDARD_IA,
};
pub use body::{content_md5, encode_body, EncodedBody, RawBody, RequestBody, XmlDocument, CONTENT_TYPE_XML};
pub use bucket::{
    BucketGetAclResult, BucketGetLifecycleResult, BucketGetLocationResult, BucketPutAclOptions,
    BucketPutLifecycleOptions, BucketService, LifecycleAbortIncompleteMultipartUpload,
    LifecycleConfiguration, LifecycleExpiration, LifecycleFilter, LifecycleRule,
    LifecycleTransition,
};
pub use client::{
    BaseUrl, Client, ClientBuilder, Endpoint, SendOptions, DEFAULT_SERVICE_URL,
    DEFAULT_USER_AGENT, VERSION,
};
pub use error::{Error, ErrorResponse, Result};
pub use object::{ObjectGetOptions, ObjectHeadOptions, ObjectPutOptions, ObjectService};
pub use operation::Operation;
pub use options::{add_header_options, add_url_options, encode_query, HeaderOptions, OptionField, QueryOptions};
pub use parser::{check_response, DefaultResponseParser, ResponseParser, XmlTarget};
pub use response::{Response, X_COS_META_PREFIX};
pub use sender::{DebugSender, DefaultSender, Sender};
pub use service::{ServiceBucket, ServiceBuckets, ServiceGetResult, ServiceService};
pub use tokio_util::sync::CancellationToken;
