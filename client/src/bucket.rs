//! Bucket API calls.
use crate::acl::{AclHeaderOptions, AclXml};
use crate::{Client, Operation, RequestBody, Response, Result, SendOptions};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Result of [`BucketService::get_acl`].
pub type BucketGetAclResult = AclXml;

/// Options for [`BucketService::put_acl`].  The service treats header-based and body-based ACL
/// settings as alternatives; supply one or the other.
#[derive(Debug, Default, Clone)]
pub struct BucketPutAclOptions {
    pub header: Option<AclHeaderOptions>,
    pub body: Option<AclXml>,
}

/// Result of [`BucketService::get_location`], e.g. `ap-beijing`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "LocationConstraint")]
pub struct BucketGetLocationResult {
    #[serde(rename = "$text", default)]
    pub location: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleFilter {
    #[serde(rename = "Prefix", default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleTransition {
    #[serde(rename = "Date", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "Days", default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(rename = "StorageClass", default)]
    pub storage_class: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleExpiration {
    #[serde(rename = "Date", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "Days", default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleAbortIncompleteMultipartUpload {
    #[serde(rename = "DaysAfterInitiation")]
    pub days_after_initiation: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleRule {
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "Filter", default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<LifecycleFilter>,
    /// `Enabled` or `Disabled`
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Transition", default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<LifecycleTransition>,
    #[serde(rename = "Expiration", default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<LifecycleExpiration>,
    #[serde(
        rename = "AbortIncompleteMultipartUpload",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub abort_incomplete_multipart_upload: Option<LifecycleAbortIncompleteMultipartUpload>,
}

/// The lifecycle rules of a bucket, used both to read and to replace them.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "LifecycleConfiguration")]
pub struct LifecycleConfiguration {
    #[serde(rename = "Rule", default)]
    pub rules: Vec<LifecycleRule>,
}

pub type BucketGetLifecycleResult = LifecycleConfiguration;
pub type BucketPutLifecycleOptions = LifecycleConfiguration;

/// Bucket API calls, obtained from [`Client::bucket`].  All calls go to the bucket URL.
#[derive(Debug, Clone, Copy)]
pub struct BucketService<'c> {
    client: &'c Client,
}

impl<'c> BucketService<'c> {
    pub(crate) fn new(client: &'c Client) -> Self {
        Self { client }
    }

    /// Get the access-control policy of the bucket.
    pub async fn get_acl(&self, ctx: &CancellationToken) -> Result<(BucketGetAclResult, Response)> {
        let mut res = BucketGetAclResult::default();
        let resp = self
            .client
            .send(
                ctx,
                SendOptions::new(Operation::BucketGetAcl, Method::GET, "/?acl").result(&mut res),
            )
            .await?;
        Ok((res, resp))
    }

    /// Replace the access-control policy of the bucket, from headers or from a policy
    /// document.
    pub async fn put_acl(
        &self,
        ctx: &CancellationToken,
        opt: &BucketPutAclOptions,
    ) -> Result<Response> {
        let mut send = SendOptions::new(Operation::BucketPutAcl, Method::PUT, "/?acl");
        if let Some(header) = &opt.header {
            send = send.header(header);
        }
        if let Some(body) = &opt.body {
            send = send.body(RequestBody::Document(body));
        }
        self.client.send(ctx, send).await
    }

    /// Get the region the bucket lives in.
    pub async fn get_location(
        &self,
        ctx: &CancellationToken,
    ) -> Result<(BucketGetLocationResult, Response)> {
        let mut res = BucketGetLocationResult::default();
        let resp = self
            .client
            .send(
                ctx,
                SendOptions::new(Operation::BucketGetLocation, Method::GET, "/?location")
                    .result(&mut res),
            )
            .await?;
        Ok((res, resp))
    }

    pub async fn get_lifecycle(
        &self,
        ctx: &CancellationToken,
    ) -> Result<(BucketGetLifecycleResult, Response)> {
        let mut res = BucketGetLifecycleResult::default();
        let resp = self
            .client
            .send(
                ctx,
                SendOptions::new(Operation::BucketGetLifecycle, Method::GET, "/?lifecycle")
                    .result(&mut res),
            )
            .await?;
        Ok((res, resp))
    }

    /// Replace all lifecycle rules of the bucket.
    pub async fn put_lifecycle(
        &self,
        ctx: &CancellationToken,
        opt: &BucketPutLifecycleOptions,
    ) -> Result<Response> {
        self.client
            .send(
                ctx,
                SendOptions::new(Operation::BucketPutLifecycle, Method::PUT, "/?lifecycle")
                    .body(RequestBody::Document(opt)),
            )
            .await
    }

    pub async fn delete_lifecycle(&self, ctx: &CancellationToken) -> Result<Response> {
        self.client
            .send(
                ctx,
                SendOptions::new(Operation::BucketDeleteLifecycle, Method::DELETE, "/?lifecycle"),
            )
            .await
    }
}
