//! Path definitions for the build and cache trees.
//!
//! The build directory is staged into the deployable bundle; the cache
//! directory persists across builds. This module only defines WHERE
//! things live, not HOW they get there.

use std::path::{Path, PathBuf};

/// Well-known paths inside the build (staging) directory.
#[derive(Debug, Clone)]
pub struct BuildLayout {
    root: PathBuf,
}

impl BuildLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The application's dependency manifest.
    pub fn gemfile(&self) -> PathBuf {
        self.root.join("Gemfile")
    }

    /// JDK version selection, key=value format.
    pub fn system_properties(&self) -> PathBuf {
        self.root.join("system.properties")
    }

    /// Where the JDK is unpacked.
    pub fn jdk_home(&self) -> PathBuf {
        self.root.join(".jdk")
    }

    /// Where the JRuby runtime is vendored into the bundle.
    pub fn jruby_home(&self) -> PathBuf {
        self.root.join("vendor").join("jruby")
    }

    /// Working copy of the installed gem tree.
    pub fn bundle_dir(&self) -> PathBuf {
        self.root.join("vendor").join("bundle")
    }

    /// Generated executable wrappers for installed tools.
    pub fn binstub_dir(&self) -> PathBuf {
        self.bundle_dir().join("bin")
    }

    pub fn database_config(&self) -> PathBuf {
        self.root.join("config").join("database.yml")
    }

    /// Marker left by a previous asset compilation.
    pub fn asset_manifest(&self) -> PathBuf {
        self.root.join("public").join("assets").join("manifest.yml")
    }

    /// Sourced by the platform at container start.
    pub fn profile_script(&self) -> PathBuf {
        self.root.join(".profile.d").join("ruby.sh")
    }
}

/// Well-known paths inside the cross-build cache directory.
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cached runtime for one version. At most one of these exists at a
    /// time; installing a new version prunes the siblings first.
    pub fn jruby_dir(&self, version: &semver::Version) -> PathBuf {
        self.root.join(format!("jruby-{version}"))
    }

    /// Mirror of the build's gem tree from the last successful run.
    pub fn bundle_dir(&self) -> PathBuf {
        self.root.join("vendor").join("bundle")
    }

    /// JDK selection carried forward from a previous build.
    pub fn system_properties(&self) -> PathBuf {
        self.root.join("system.properties")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_paths_are_rooted() {
        let layout = BuildLayout::new("/tmp/app");
        assert_eq!(layout.gemfile(), PathBuf::from("/tmp/app/Gemfile"));
        assert_eq!(
            layout.binstub_dir(),
            PathBuf::from("/tmp/app/vendor/bundle/bin")
        );
        assert_eq!(
            layout.profile_script(),
            PathBuf::from("/tmp/app/.profile.d/ruby.sh")
        );
    }

    #[test]
    fn cache_runtime_dir_is_version_named() {
        let layout = CacheLayout::new("/tmp/cache");
        let version = semver::Version::new(1, 7, 4);
        assert_eq!(
            layout.jruby_dir(&version),
            PathBuf::from("/tmp/cache/jruby-1.7.4")
        );
    }
}
