//! Archive retrieval
//!
//! Fetches a gzipped tarball and unpacks it into a destination
//! directory. Behind a trait so installer logic stays testable without
//! touching the network.

use crate::error::{GantryError, GantryResult};
use flate2::read::GzDecoder;
use std::fs;
use std::path::Path;
use tar::Archive;
use tracing::debug;

/// Retrieves and unpacks one archive per call.
pub trait ArchiveFetcher: Send + Sync {
    /// Download the tarball at `url` and unpack its entries into `dest`,
    /// creating `dest` if needed. Any failure is fatal to the build.
    fn fetch_unpack(&self, url: &str, dest: &Path) -> GantryResult<()>;
}

/// Fetches archives over HTTPS and streams them straight through
/// gzip+tar extraction, never materializing the tarball on disk.
#[derive(Debug, Default)]
pub struct HttpArchiveFetcher;

impl HttpArchiveFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveFetcher for HttpArchiveFetcher {
    fn fetch_unpack(&self, url: &str, dest: &Path) -> GantryResult<()> {
        fs::create_dir_all(dest)
            .map_err(|e| GantryError::io(format!("creating {}", dest.display()), e))?;

        debug!("Fetching {}", url);
        let response = ureq::get(url)
            .call()
            .map_err(|e| GantryError::download(url, e.to_string()))?;

        let reader = response.into_body().into_reader();
        let mut archive = Archive::new(GzDecoder::new(reader));
        archive
            .unpack(dest)
            .map_err(|e| GantryError::extract(url, e.to_string()))?;

        debug!("Unpacked {} into {}", url, dest.display());
        Ok(())
    }
}
