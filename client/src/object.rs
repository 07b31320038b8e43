//! Object API calls.
use crate::acl::AclHeaderOptions;
use crate::options::{HeaderOptions, OptionField, QueryOptions};
use crate::response::X_COS_META_PREFIX;
use crate::util::object_path;
use crate::{Client, Operation, RawBody, RequestBody, Response, Result, SendOptions};
use reqwest::Method;
use tokio_util::sync::CancellationToken;

/// Options for [`ObjectService::put`], all sent as headers.
#[derive(Debug, Default, Clone)]
pub struct ObjectPutOptions {
    pub cache_control: String,
    pub content_disposition: String,
    pub content_encoding: String,
    pub content_type: String,
    /// Required for streamed bodies that should not use chunked encoding
    pub content_length: u64,
    pub expect: String,
    pub expires: String,
    /// One of the `STORAGE_CLASS_*` constants
    pub storage_class: String,
    pub acl: AclHeaderOptions,
    /// User-defined metadata, as `(name, value)`.  Names get the `x-cos-meta-` prefix if they
    /// do not already have it.
    pub meta: Vec<(String, String)>,
}

impl HeaderOptions for ObjectPutOptions {
    fn header_fields(&self) -> Vec<OptionField> {
        let mut fields = vec![
            OptionField::omit_empty("Cache-Control", &self.cache_control),
            OptionField::omit_empty("Content-Disposition", &self.content_disposition),
            OptionField::omit_empty("Content-Encoding", &self.content_encoding),
            OptionField::omit_empty("Content-Type", &self.content_type),
            OptionField::omit_zero("Content-Length", self.content_length),
            OptionField::omit_empty("Expect", &self.expect),
            OptionField::omit_empty("Expires", &self.expires),
            OptionField::omit_empty("x-cos-storage-class", &self.storage_class),
        ];
        fields.extend(self.acl.fields());
        for (name, value) in &self.meta {
            let name = name.to_ascii_lowercase();
            let name = if name.starts_with(X_COS_META_PREFIX) {
                name
            } else {
                format!("{}{}", X_COS_META_PREFIX, name)
            };
            fields.push(OptionField::new(name, value));
        }
        fields
    }
}

/// Options for [`ObjectService::get`].  The `response_*` fields are sent as query parameters
/// and override the corresponding headers of the response; the rest are request headers.
#[derive(Debug, Default, Clone)]
pub struct ObjectGetOptions {
    pub response_content_type: String,
    pub response_content_language: String,
    pub response_expires: String,
    pub response_cache_control: String,
    pub response_content_disposition: String,
    pub response_content_encoding: String,
    /// e.g. `bytes=0-1023`
    pub range: String,
    pub if_modified_since: String,
}

impl QueryOptions for ObjectGetOptions {
    fn query_fields(&self) -> Vec<OptionField> {
        vec![
            OptionField::omit_empty("response-content-type", &self.response_content_type),
            OptionField::omit_empty("response-content-language", &self.response_content_language),
            OptionField::omit_empty("response-expires", &self.response_expires),
            OptionField::omit_empty("response-cache-control", &self.response_cache_control),
            OptionField::omit_empty(
                "response-content-disposition",
                &self.response_content_disposition,
            ),
            OptionField::omit_empty("response-content-encoding", &self.response_content_encoding),
        ]
    }
}

impl HeaderOptions for ObjectGetOptions {
    fn header_fields(&self) -> Vec<OptionField> {
        vec![
            OptionField::omit_empty("Range", &self.range),
            OptionField::omit_empty("If-Modified-Since", &self.if_modified_since),
        ]
    }
}

#[derive(Debug, Default, Clone)]
pub struct ObjectHeadOptions {
    pub if_modified_since: String,
}

impl HeaderOptions for ObjectHeadOptions {
    fn header_fields(&self) -> Vec<OptionField> {
        vec![OptionField::omit_empty(
            "If-Modified-Since",
            &self.if_modified_since,
        )]
    }
}

/// Object API calls, obtained from [`Client::object`].  Keys are relative to the bucket URL;
/// a leading `/` is ignored.
#[derive(Debug, Clone, Copy)]
pub struct ObjectService<'c> {
    client: &'c Client,
}

impl<'c> ObjectService<'c> {
    pub(crate) fn new(client: &'c Client) -> Self {
        Self { client }
    }

    /// Upload an object.  The body is sent exactly as supplied.
    pub async fn put<B: Into<RawBody>>(
        &self,
        ctx: &CancellationToken,
        key: &str,
        body: B,
        opt: Option<&ObjectPutOptions>,
    ) -> Result<Response> {
        let mut send = SendOptions::new(Operation::ObjectPut, Method::PUT, object_path(key))
            .body(RequestBody::Raw(body.into()));
        if let Some(opt) = opt {
            send = send.header(opt);
        }
        self.client.send(ctx, send).await
    }

    /// Download an object.  The body of the returned response is left unread for the caller.
    pub async fn get(
        &self,
        ctx: &CancellationToken,
        key: &str,
        opt: Option<&ObjectGetOptions>,
    ) -> Result<Response> {
        let mut send =
            SendOptions::new(Operation::ObjectGet, Method::GET, object_path(key)).keep_body();
        if let Some(opt) = opt {
            send = send.query(opt).header(opt);
        }
        self.client.send(ctx, send).await
    }

    /// Get the metadata of an object.
    pub async fn head(
        &self,
        ctx: &CancellationToken,
        key: &str,
        opt: Option<&ObjectHeadOptions>,
    ) -> Result<Response> {
        let mut send = SendOptions::new(Operation::ObjectHead, Method::HEAD, object_path(key));
        if let Some(opt) = opt {
            send = send.header(opt);
        }
        self.client.send(ctx, send).await
    }

    pub async fn delete(&self, ctx: &CancellationToken, key: &str) -> Result<Response> {
        self.client
            .send(
                ctx,
                SendOptions::new(Operation::ObjectDelete, Method::DELETE, object_path(key)),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::STORAGE_CLASS_STANDARD_IA;
    use crate::test_helpers::{FakeSender, Logger};
    use crate::{BaseUrl, ClientBuilder};

    const BUCKET_URL: &str = "https://test-1250000000.cos.ap-beijing.myqcloud.com";

    fn client(sender: FakeSender) -> Client {
        ClientBuilder::new(BaseUrl::new(BUCKET_URL).unwrap())
            .sender(sender)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn put_with_metadata() -> Result<()> {
        let sender = FakeSender::new(Logger::default(), 200, &[("ETag", "\"abc\"")], "");
        let opt = ObjectPutOptions {
            content_type: "text/plain".into(),
            storage_class: STORAGE_CLASS_STANDARD_IA.into(),
            acl: AclHeaderOptions {
                x_cos_acl: "public-read".into(),
                ..Default::default()
            },
            meta: vec![
                ("Owner".into(), "me".into()),
                ("x-cos-meta-Color".into(), "blue".into()),
            ],
            ..Default::default()
        };
        client(sender.clone())
            .object()
            .put(&CancellationToken::new(), "dir/hello world.txt", &b"hello"[..], Some(&opt))
            .await?;

        let req = sender.last_request();
        assert_eq!(req.method, Method::PUT);
        assert_eq!(req.url.path(), "/dir/hello%20world.txt");
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert_eq!(req.header("x-cos-storage-class"), Some("STANDARD_IA"));
        assert_eq!(req.header("x-cos-acl"), Some("public-read"));
        assert_eq!(req.header("x-cos-meta-owner"), Some("me"));
        assert_eq!(req.header("x-cos-meta-color"), Some("blue"));
        assert_eq!(req.header("content-md5"), None);
        assert_eq!(req.header("expires"), None);
        assert_eq!(req.body_bytes(), b"hello");
        Ok(())
    }

    #[tokio::test]
    async fn get_keeps_body() -> Result<()> {
        let sender = FakeSender::new(
            Logger::default(),
            206,
            &[("x-cos-meta-color", "blue"), ("x-cos-storage-class", "STANDARD")],
            "hel",
        );
        let opt = ObjectGetOptions {
            response_content_type: "text/plain".into(),
            response_cache_control: "no-cache".into(),
            range: "bytes=0-2".into(),
            ..Default::default()
        };
        let ctx = CancellationToken::new();
        let mut resp = client(sender.clone())
            .object()
            .get(&ctx, "/hello.txt", Some(&opt))
            .await?;
        assert_eq!(resp.storage_class(), "STANDARD");
        assert_eq!(resp.meta_headers().len(), 1);
        assert_eq!(resp.bytes(&ctx).await?.as_ref(), b"hel");

        let req = sender.last_request();
        assert_eq!(req.url.path(), "/hello.txt");
        assert_eq!(
            req.url.query(),
            Some("response-content-type=text%2Fplain&response-cache-control=no-cache")
        );
        assert_eq!(req.header("range"), Some("bytes=0-2"));
        Ok(())
    }

    #[tokio::test]
    async fn head_and_delete() -> Result<()> {
        let logger = Logger::default();
        let sender = FakeSender::new(logger.clone(), 200, &[("x-cos-object-type", "appendable")], "");
        let client = client(sender.clone());
        let ctx = CancellationToken::new();

        let opt = ObjectHeadOptions {
            if_modified_since: "Wed, 28 Oct 2015 07:28:00 GMT".into(),
        };
        let resp = client.object().head(&ctx, "a.txt", Some(&opt)).await?;
        assert_eq!(resp.object_type(), "appendable");
        assert_eq!(
            sender.last_request().header("if-modified-since"),
            Some("Wed, 28 Oct 2015 07:28:00 GMT")
        );

        client.object().delete(&ctx, "a.txt").await?;
        logger.assert(vec![
            format!("send Object.Head HEAD {}/a.txt", BUCKET_URL),
            format!("send Object.Delete DELETE {}/a.txt", BUCKET_URL),
        ]);
        Ok(())
    }
}
