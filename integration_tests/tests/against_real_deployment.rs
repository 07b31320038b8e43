use anyhow::Result;
use cos::{ClientBuilder, Error};
use reqwest::StatusCode;
use std::env;
use tokio_util::sync::CancellationToken;

/// Return a client configured from COS_BUCKET_URL / COS_SERVICE_URL, or None if the test should
/// be skipped, or panic if NO_TEST_SKIP is set and COS_BUCKET_URL is not.
///
/// These tests make unsigned calls, so they only rely on the service rejecting them
/// consistently.
fn get_client() -> Option<ClientBuilder> {
    match env::var("COS_BUCKET_URL") {
        Ok(_) => Some(ClientBuilder::from_env().expect("parsing COS_* environment variables")),
        Err(_) => match env::var("NO_TEST_SKIP") {
            Ok(_) => panic!("NO_TEST_SKIP is set but COS_BUCKET_URL is not!"),
            Err(_) => None,
        },
    }
}

/// An unsigned ACL read is refused, with the service's error document decoded
#[tokio::test]
async fn test_unsigned_get_acl() -> Result<()> {
    if let Some(client) = get_client() {
        let client = client.build()?;
        let err = client
            .bucket()
            .get_acl(&CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(StatusCode::FORBIDDEN));
        let api = err.api_error().unwrap();
        assert!(!api.code.is_empty());
        assert!(!api.request_id.is_empty());
    }
    Ok(())
}

/// A HEAD request has no error body, so the error is built from the status and headers
#[tokio::test]
async fn test_head_missing_object() -> Result<()> {
    if let Some(client) = get_client() {
        let client = client.build()?;
        let res = client
            .object()
            .head(&CancellationToken::new(), "no/such/object/for/rust/tests", None)
            .await;
        let err = res.unwrap_err();
        let status_code = err.status_code();

        // a public-read bucket gives NOT_FOUND, a private one FORBIDDEN.  Anything else is
        // not good!
        if status_code != Some(StatusCode::NOT_FOUND) && status_code != Some(StatusCode::FORBIDDEN)
        {
            panic!("Got unexpected status code {:?}", status_code);
        }
        assert!(matches!(err, Error::Api(_)));
    }
    Ok(())
}

/// Listing buckets always requires a signature
#[tokio::test]
async fn test_unsigned_service_get() -> Result<()> {
    if let Some(client) = get_client() {
        let client = client.build()?;
        let err = client
            .service()
            .get(&CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(StatusCode::FORBIDDEN));
    }
    Ok(())
}
