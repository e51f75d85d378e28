//! JDK installation
//!
//! The JDK version comes from `system.properties`: the copy in the
//! build directory wins, else the copy carried forward in the cache
//! from a previous build, else a synthesized default. The selection is
//! written back to both trees so later builds see the same choice.

use crate::error::GantryResult;
use crate::fetch::ArchiveFetcher;
use crate::layout::{BuildLayout, CacheLayout};
use crate::manifest::properties::SystemProperties;
use crate::ui;
use std::path::PathBuf;
use tracing::debug;

/// Default JDK distribution mirror.
pub const DIST_BASE_URL: &str = "https://lang-jvm.s3.amazonaws.com/jdk";

/// JDK version used when no build has ever declared one.
pub const DEFAULT_JDK_VERSION: &str = "1.8";

/// The `system.properties` key naming the JDK version.
pub const VERSION_KEY: &str = "java.runtime.version";

/// Installs the JDK the application selected into `<build>/.jdk`.
pub struct JdkInstaller<'a> {
    fetcher: &'a dyn ArchiveFetcher,
    base_url: String,
}

impl<'a> JdkInstaller<'a> {
    pub fn new(fetcher: &'a dyn ArchiveFetcher) -> Self {
        Self {
            fetcher,
            base_url: DIST_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(fetcher: &'a dyn ArchiveFetcher, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
        }
    }

    /// Resolve the JDK version, download and unpack it, and persist the
    /// selection into both the build and cache trees. Returns the JDK
    /// home inside the build directory.
    pub fn install(&self, build: &BuildLayout, cache: &CacheLayout) -> GantryResult<PathBuf> {
        let mut props = resolve_properties(build, cache)?;
        let version = props
            .get(VERSION_KEY)
            .unwrap_or(DEFAULT_JDK_VERSION)
            .to_string();

        ui::detail(&format!("Installing OpenJDK {version}"));
        let url = format!("{}/openjdk{}-latest.tar.gz", self.base_url, version);
        let jdk_home = build.jdk_home();
        self.fetcher.fetch_unpack(&url, &jdk_home)?;

        props.set(VERSION_KEY, version);
        props.save(&build.system_properties())?;
        props.save(&cache.system_properties())?;
        debug!("JDK installed at {}", jdk_home.display());

        Ok(jdk_home)
    }
}

/// Find the JDK selection: build directory, then cache, then default.
fn resolve_properties(build: &BuildLayout, cache: &CacheLayout) -> GantryResult<SystemProperties> {
    if let Some(props) = SystemProperties::load(&build.system_properties())? {
        return Ok(props);
    }
    if let Some(props) = SystemProperties::load(&cache.system_properties())? {
        ui::detail("Using JDK selection from previous build");
        return Ok(props);
    }
    debug!("No system.properties, defaulting to JDK {DEFAULT_JDK_VERSION}");
    Ok(SystemProperties::with(VERSION_KEY, DEFAULT_JDK_VERSION))
}
