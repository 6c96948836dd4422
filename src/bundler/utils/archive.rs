//! Archive extraction for support packages.
//!
//! The format is chosen from the file name, the same way the support
//! catalog names its artifacts: `.tar.gz`/`.tgz`, `.tar` and `.zip`.

use crate::bundler::error::{Error, ErrorExt, Result};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Archive formats we can unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Gzip-compressed tarball
    TarGz,
    /// Uncompressed tarball
    Tar,
    /// ZIP archive
    Zip,
}

impl ArchiveFormat {
    /// Detect the format from a file name, or `None` if unrecognized.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

/// Unpacks an archive into a directory.
#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    /// Extract `archive` into `dest`.
    ///
    /// Fails with [`Error::UnsupportedArchive`] when the format is not
    /// recognized, and with a decoding error when the content is corrupt.
    async fn unpack(&self, archive: &Path, dest: &Path) -> Result<()>;
}

/// [`ArchiveExtractor`] backed by `tar`, `flate2` and `zip`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardExtractor;

#[async_trait]
impl ArchiveExtractor for StandardExtractor {
    async fn unpack(&self, archive: &Path, dest: &Path) -> Result<()> {
        let archive: PathBuf = archive.to_path_buf();
        let dest: PathBuf = dest.to_path_buf();
        tokio::task::spawn_blocking(move || unpack_archive(&archive, &dest))
            .await
            .map_err(|e| Error::GenericError(format!("Archive extraction task failed: {}", e)))?
    }
}

/// Synchronously extract `archive` into `dest`.
pub fn unpack_archive(archive: &Path, dest: &Path) -> Result<()> {
    let format =
        ArchiveFormat::detect(archive).ok_or_else(|| Error::UnsupportedArchive(archive.into()))?;
    log::debug!("Unpacking {} as {:?}", archive.display(), format);

    let file = File::open(archive).fs_context("opening archive", archive)?;
    match format {
        ArchiveFormat::TarGz => tar::Archive::new(GzDecoder::new(file))
            .unpack(dest)
            .fs_context("unpacking archive", archive),
        ArchiveFormat::Tar => tar::Archive::new(file)
            .unpack(dest)
            .fs_context("unpacking archive", archive),
        ArchiveFormat::Zip => {
            let mut zip = zip::ZipArchive::new(file)?;
            zip.extract(dest)?;
            Ok(())
        }
    }
}
