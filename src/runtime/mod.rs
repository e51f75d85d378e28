//! JRuby runtime installation
//!
//! Keeps exactly one JRuby version in the cache directory at a time:
//! installing a new version prunes every other `jruby-*` sibling before
//! the download. Installers return resolved locations; nothing here
//! touches the gantry process environment.

pub mod jdk;

use crate::error::{GantryError, GantryResult};
use crate::fetch::ArchiveFetcher;
use crate::layout::CacheLayout;
use crate::manifest::{RubyMode, RuntimeSpec};
use crate::ui;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default JRuby distribution mirror.
pub const DIST_BASE_URL: &str = "https://s3.amazonaws.com/jruby.org/downloads";

/// Installs the JRuby release named by the Gemfile runtime directive.
pub struct RuntimeInstaller<'a> {
    fetcher: &'a dyn ArchiveFetcher,
    base_url: String,
}

impl<'a> RuntimeInstaller<'a> {
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

    /// Ensure the requested JRuby exists in the cache, downloading it at
    /// most once per version. Returns the cached runtime home.
    pub fn ensure(&self, spec: &RuntimeSpec, cache: &CacheLayout) -> GantryResult<PathBuf> {
        let home = cache.jruby_dir(&spec.version);
        if home.is_dir() {
            ui::detail(&format!("Using cached JRuby {}", spec.version));
            return Ok(home);
        }

        prune_runtimes(cache.root())?;

        let url = format!(
            "{}/{}/jruby-bin-{}.tar.gz",
            self.base_url, spec.version, spec.version
        );
        ui::detail(&format!("Downloading JRuby {}", spec.version));
        self.fetcher.fetch_unpack(&url, cache.root())?;

        // The release tarball carries a jruby-<version>/ top-level dir.
        if !home.join("bin").is_dir() {
            return Err(GantryError::extract(
                url,
                format!("archive did not contain jruby-{}/bin", spec.version),
            ));
        }

        Ok(home)
    }
}

/// Delete every cached `jruby-*` directory.
fn prune_runtimes(cache_root: &Path) -> GantryResult<()> {
    if !cache_root.is_dir() {
        return Ok(());
    }
    let entries = fs::read_dir(cache_root)
        .map_err(|e| GantryError::io(format!("reading {}", cache_root.display()), e))?;

    for entry in entries {
        let entry =
            entry.map_err(|e| GantryError::io(format!("reading {}", cache_root.display()), e))?;
        let name = entry.file_name();
        let is_runtime = name.to_string_lossy().starts_with("jruby-");
        if is_runtime && entry.path().is_dir() {
            debug!("Pruning cached runtime {}", entry.path().display());
            fs::remove_dir_all(entry.path())
                .map_err(|e| GantryError::io(format!("removing {}", entry.path().display()), e))?;
        }
    }
    Ok(())
}

/// Resolved tool locations, threaded explicitly through the pipeline
/// instead of prepending to the process search path.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub jdk_home: PathBuf,
    pub jruby_home: PathBuf,
    pub mode: RubyMode,
}

impl Toolchain {
    /// The jruby launcher inside the vendored runtime.
    pub fn jruby_bin(&self) -> PathBuf {
        self.jruby_home.join("bin").join("jruby")
    }

    /// Environment for build-time tool invocations: an explicit JAVA_HOME
    /// and a PATH with the JDK and JRuby bin directories prepended to the
    /// ambient one.
    pub fn env(&self) -> Vec<(String, String)> {
        let mut path = format!(
            "{}:{}",
            self.jdk_home.join("bin").display(),
            self.jruby_home.join("bin").display()
        );
        if let Ok(ambient) = std::env::var("PATH") {
            path.push(':');
            path.push_str(&ambient);
        }
        vec![
            ("JAVA_HOME".to_string(), self.jdk_home.display().to_string()),
            ("PATH".to_string(), path),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::{FailingFetcher, FakeFetcher};
    use semver::Version;
    use tempfile::TempDir;

    fn spec(version: &str) -> RuntimeSpec {
        RuntimeSpec {
            version: Version::parse(version).unwrap(),
            mode: RubyMode::Compat19,
        }
    }

    #[test]
    fn installs_into_version_named_dir() {
        let dir = TempDir::new().unwrap();
        let cache = CacheLayout::new(dir.path());
        let fetcher = FakeFetcher::unpacking(["jruby-1.7.4/bin/jruby"]);

        let home = RuntimeInstaller::new(&fetcher)
            .ensure(&spec("1.7.4"), &cache)
            .unwrap();

        assert_eq!(home, dir.path().join("jruby-1.7.4"));
        assert!(home.join("bin/jruby").is_file());
    }

    #[test]
    fn cached_version_is_not_downloaded_again() {
        let dir = TempDir::new().unwrap();
        let cache = CacheLayout::new(dir.path());
        let fetcher = FakeFetcher::unpacking(["jruby-1.7.4/bin/jruby"]);
        let installer = RuntimeInstaller::new(&fetcher);

        installer.ensure(&spec("1.7.4"), &cache).unwrap();
        installer.ensure(&spec("1.7.4"), &cache).unwrap();

        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn at_most_one_cached_runtime_survives() {
        let dir = TempDir::new().unwrap();
        let cache = CacheLayout::new(dir.path());

        let old = FakeFetcher::unpacking(["jruby-1.7.3/bin/jruby"]);
        RuntimeInstaller::new(&old)
            .ensure(&spec("1.7.3"), &cache)
            .unwrap();

        let new = FakeFetcher::unpacking(["jruby-1.7.4/bin/jruby"]);
        RuntimeInstaller::new(&new)
            .ensure(&spec("1.7.4"), &cache)
            .unwrap();

        assert!(!dir.path().join("jruby-1.7.3").exists());
        assert!(dir.path().join("jruby-1.7.4").is_dir());
    }

    #[test]
    fn pruning_spares_unrelated_cache_entries() {
        let dir = TempDir::new().unwrap();
        let cache = CacheLayout::new(dir.path());
        std::fs::create_dir_all(dir.path().join("vendor/bundle/gems")).unwrap();
        std::fs::create_dir_all(dir.path().join("jruby-1.7.3/bin")).unwrap();

        let fetcher = FakeFetcher::unpacking(["jruby-1.7.4/bin/jruby"]);
        RuntimeInstaller::new(&fetcher)
            .ensure(&spec("1.7.4"), &cache)
            .unwrap();

        assert!(dir.path().join("vendor/bundle/gems").is_dir());
    }

    #[test]
    fn download_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let cache = CacheLayout::new(dir.path());

        let err = RuntimeInstaller::new(&FailingFetcher)
            .ensure(&spec("1.7.4"), &cache)
            .unwrap_err();

        assert!(matches!(err, GantryError::Download { .. }));
    }

    #[test]
    fn unexpected_archive_layout_is_fatal() {
        let dir = TempDir::new().unwrap();
        let cache = CacheLayout::new(dir.path());
        let fetcher = FakeFetcher::unpacking(["README.txt"]);

        let err = RuntimeInstaller::new(&fetcher)
            .ensure(&spec("1.7.4"), &cache)
            .unwrap_err();

        assert!(matches!(err, GantryError::Extract { .. }));
    }

    #[test]
    fn toolchain_env_threads_explicit_locations() {
        let tc = Toolchain {
            jdk_home: PathBuf::from("/app/.jdk"),
            jruby_home: PathBuf::from("/app/vendor/jruby"),
            mode: RubyMode::Compat19,
        };

        let env = tc.env();
        let java_home = env.iter().find(|(k, _)| k == "JAVA_HOME").unwrap();
        let path = env.iter().find(|(k, _)| k == "PATH").unwrap();

        assert_eq!(java_home.1, "/app/.jdk");
        assert!(path.1.starts_with("/app/.jdk/bin:/app/vendor/jruby/bin"));
        assert_eq!(tc.jruby_bin(), PathBuf::from("/app/vendor/jruby/bin/jruby"));
    }
}
