//! Support package resolution and installation.
//!
//! Prebuilt runtime support packages are published to a public bucket under
//! `python/<version tag>/<platform>/`, one object per build:
//!
//! ```text
//! python/3.10/macOS/Python-3.10-macOS-support.b1.tar.gz
//! python/3.10/macOS/Python-3.10-macOS-support.b37.tar.gz
//! ```
//!
//! The build number is the third-from-last dot-separated segment of the key,
//! without its leading `b`. The highest build wins.

use crate::bundler::Bundler;
use crate::bundler::builder::lock;
use crate::config::AppDescriptor;
use crate::error::{BriefcaseError, Result, SupportPackageError};
use crate::storage::S3Lister;
use std::path::{Path, PathBuf};

/// Bucket holding the support package catalog.
pub const SUPPORT_BUCKET: &str = "briefcase-support";

/// Region of [`SUPPORT_BUCKET`].
pub const SUPPORT_REGION: &str = "us-west-2";

/// Build number encoded in a catalog key.
pub fn build_number(key: &str) -> Result<u64> {
    let malformed = || {
        BriefcaseError::from(SupportPackageError::MalformedCatalogKey {
            key: key.to_string(),
        })
    };
    let segments: Vec<&str> = key.split('.').collect();
    if segments.len() < 3 {
        return Err(malformed());
    }
    segments[segments.len() - 3]
        .trim_start_matches('b')
        .parse()
        .map_err(|_| malformed())
}

/// Key with the highest build number; ties go to the greatest key so the
/// result does not depend on listing order.
pub fn select_latest<'a, I>(keys: I) -> Result<Option<&'a str>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(u64, &str)> = None;
    for key in keys {
        let candidate = (build_number(key)?, key);
        if best.is_none_or(|current| candidate > current) {
            best = Some(candidate);
        }
    }
    Ok(best.map(|(_, key)| key))
}

fn is_http_url(reference: &str) -> bool {
    reference.starts_with("https://") || reference.starts_with("http://")
}

impl Bundler {
    /// Catalog prefix for the session's platform and runtime version
    pub fn support_package_key_prefix(&self) -> String {
        format!(
            "python/{}/{}/",
            self.settings.python_version_tag, self.settings.platform
        )
    }

    /// URL of the newest support package for the session's platform and
    /// runtime version. Resolved once per session.
    pub async fn support_package_url(&self) -> Result<String> {
        let memo_key = (
            self.settings.platform.clone(),
            self.settings.python_version_tag.clone(),
        );
        if let Some(url) = lock(&self.support_urls).get(&memo_key) {
            return Ok(url.clone());
        }

        let prefix = self.support_package_key_prefix();
        let objects = self
            .collaborators
            .lister
            .list(SUPPORT_BUCKET, SUPPORT_REGION, &prefix)
            .await
            .map_err(|e| {
                if e.is_transport() {
                    BriefcaseError::network("list support packages")
                } else {
                    e.into()
                }
            })?;
        log::debug!("{} catalog entries under {}", objects.len(), prefix);

        let key = select_latest(objects.iter().map(|o| o.key.as_str()))?.ok_or_else(|| {
            BriefcaseError::from(SupportPackageError::NotFound {
                platform: self.settings.platform.clone(),
                python_version: self.settings.python_version_tag.clone(),
            })
        })?;

        let url = format!("{}{}", S3Lister::bucket_url(SUPPORT_BUCKET, SUPPORT_REGION), key);
        lock(&self.support_urls).insert(memo_key, url.clone());
        Ok(url)
    }

    async fn fetch_support_package(&self, reference: &str) -> Result<PathBuf> {
        if !is_http_url(reference) {
            return Ok(self.settings.base_path.join(reference));
        }
        self.collaborators
            .downloader
            .download(reference, &self.settings.support_cache)
            .await
            .map_err(|e| {
                if e.is_transport() {
                    BriefcaseError::network("downloading support package")
                } else {
                    e.into()
                }
            })
    }

    /// Fetch the support package for `app` and unpack it into the bundle.
    pub async fn install_app_support_package(&self, app: &AppDescriptor) -> Result<()> {
        let reference = match &app.support_package {
            Some(custom) => {
                self.runtime
                    .println(&format!("Using custom support package {}", custom));
                custom.clone()
            }
            None => {
                let url = self.support_package_url().await?;
                self.runtime
                    .println(&format!("Using support package {}", url));
                url
            }
        };

        let archive = self.fetch_support_package(&reference).await?;

        self.runtime.println("Unpacking support package...");
        let support_path = self.support_path(app)?;
        crate::bundler::utils::fs::create_dir_all(&support_path, false).await?;
        self.collaborators
            .extractor
            .unpack(&archive, &support_path)
            .await
            .map_err(|e| {
                log::debug!("Unable to unpack {}: {}", archive.display(), e);
                BriefcaseError::from(SupportPackageError::Invalid {
                    filename: file_name(&archive),
                })
            })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
