//! Anonymous object-storage listing.
//!
//! The support package catalog is a public S3 bucket. Listing it needs no
//! credentials, so requests are sent unsigned over plain HTTPS and the
//! ListObjectsV2 XML response is decoded with `quick-xml`.

use crate::bundler::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::OnceLock;

/// One object in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectSummary {
    /// Object key
    pub key: String,
    /// Object size in bytes
    #[serde(default)]
    pub size: Option<u64>,
    /// Last modification time as reported by the store
    #[serde(default)]
    pub last_modified: Option<String>,
}

/// One page of a listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListBucketResult {
    #[serde(default)]
    contents: Vec<ObjectSummary>,
    #[serde(default)]
    is_truncated: bool,
    #[serde(default)]
    next_continuation_token: Option<String>,
}

/// Lists objects in a bucket without authentication.
#[async_trait]
pub trait ObjectLister: Send + Sync {
    /// Every object under `prefix`, across all pages, in listing order.
    async fn list(&self, bucket: &str, region: &str, prefix: &str) -> Result<Vec<ObjectSummary>>;
}

/// Unsigned S3 ListObjectsV2 client.
///
/// The HTTP client is built on first use and reused for every page.
#[derive(Debug, Default)]
pub struct S3Lister {
    client: OnceLock<reqwest::Client>,
}

impl S3Lister {
    /// Create a lister; no connection is made until the first listing.
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self) -> &reqwest::Client {
        self.client.get_or_init(|| {
            log::debug!("Creating anonymous object-storage client");
            reqwest::Client::new()
        })
    }

    /// Public HTTPS base URL for objects in `bucket`.
    pub fn bucket_url(bucket: &str, region: &str) -> String {
        format!("https://{}.s3-{}.amazonaws.com/", bucket, region)
    }
}

fn parse_page(body: &str) -> Result<ListBucketResult> {
    Ok(quick_xml::de::from_str(body)?)
}

#[async_trait]
impl ObjectLister for S3Lister {
    async fn list(&self, bucket: &str, region: &str, prefix: &str) -> Result<Vec<ObjectSummary>> {
        let url = Self::bucket_url(bucket, region);
        let mut objects = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut query: Vec<(&str, &str)> = vec![("list-type", "2"), ("prefix", prefix)];
            if let Some(token) = token.as_deref() {
                query.push(("continuation-token", token));
            }

            log::debug!("Listing s3://{}/{} (page token {:?})", bucket, prefix, token);
            let response = self.client().get(&url).query(&query).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(Error::HttpStatus {
                    url: url.clone(),
                    status: status.as_u16(),
                });
            }
            let page = parse_page(&response.text().await?)?;
            objects.extend(page.contents);

            match page.next_continuation_token {
                Some(next) if page.is_truncated => token = Some(next),
                _ => break,
            }
        }

        Ok(objects)
    }
}
