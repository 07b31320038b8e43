//! Service API calls.
use crate::acl::Owner;
use crate::{Client, Endpoint, Operation, Response, Result, SendOptions};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBucket {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Location", default)]
    pub location: String,
    #[serde(rename = "CreateDate", default)]
    pub create_date: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBuckets {
    #[serde(rename = "Bucket", default)]
    pub buckets: Vec<ServiceBucket>,
}

/// Result of [`ServiceService::get`]: the account owner and all of its buckets.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "ListAllMyBucketsResult")]
pub struct ServiceGetResult {
    #[serde(rename = "Owner", default)]
    pub owner: Owner,
    #[serde(rename = "Buckets", default)]
    pub buckets: ServiceBuckets,
}

/// Service API calls, obtained from [`Client::service`].  All calls go to the service URL.
#[derive(Debug, Clone, Copy)]
pub struct ServiceService<'c> {
    client: &'c Client,
}

impl<'c> ServiceService<'c> {
    pub(crate) fn new(client: &'c Client) -> Self {
        Self { client }
    }

    /// List all buckets owned by the account the request is authorized as.
    pub async fn get(&self, ctx: &CancellationToken) -> Result<(ServiceGetResult, Response)> {
        let mut res = ServiceGetResult::default();
        let resp = self
            .client
            .send(
                ctx,
                SendOptions::new(Operation::ServiceGet, Method::GET, "/")
                    .endpoint(Endpoint::Service)
                    .result(&mut res),
            )
            .await?;
        Ok((res, resp))
    }
}
