//! The build pipeline
//!
//! Stages run strictly in sequence and the first failure aborts the
//! whole build. Collaborators that shell out or touch the network are
//! injected, so the sequencing itself is tested with doubles.

use crate::assets::{self, AssetCompiler, RakeAssetCompiler};
use crate::cache::{copy_tree, restore, store};
use crate::dbconfig;
use crate::error::GantryResult;
use crate::fetch::{ArchiveFetcher, HttpArchiveFetcher};
use crate::layout::{BuildLayout, CacheLayout};
use crate::manifest::RuntimeSpec;
use crate::profiled::ProfileScript;
use crate::resolver::{BundlerResolver, DependencyResolver};
use crate::runtime::{jdk::JdkInstaller, RuntimeInstaller, Toolchain};
use crate::ui;
use std::path::PathBuf;
use tracing::info;

/// Runs one deployment build: `<build_dir>` is staged into the
/// deployable bundle, `<cache_dir>` carries artifacts to the next run.
pub struct Builder {
    fetcher: Box<dyn ArchiveFetcher>,
    resolver: Box<dyn DependencyResolver>,
    assets: Box<dyn AssetCompiler>,
    jdk_url: Option<String>,
    jruby_url: Option<String>,
}

impl Builder {
    /// A builder wired to the real collaborators.
    pub fn new() -> Self {
        Self::with_collaborators(
            Box::new(HttpArchiveFetcher::new()),
            Box::new(BundlerResolver),
            Box::new(RakeAssetCompiler),
        )
    }

    /// A builder with injected collaborators.
    pub fn with_collaborators(
        fetcher: Box<dyn ArchiveFetcher>,
        resolver: Box<dyn DependencyResolver>,
        assets: Box<dyn AssetCompiler>,
    ) -> Self {
        Self {
            fetcher,
            resolver,
            assets,
            jdk_url: None,
            jruby_url: None,
        }
    }

    /// Override the JDK distribution mirror.
    pub fn jdk_url(mut self, url: Option<String>) -> Self {
        self.jdk_url = url;
        self
    }

    /// Override the JRuby distribution mirror.
    pub fn jruby_url(mut self, url: Option<String>) -> Self {
        self.jruby_url = url;
        self
    }

    pub async fn run(&self, build_dir: PathBuf, cache_dir: PathBuf) -> GantryResult<()> {
        let build = BuildLayout::new(build_dir);
        let cache = CacheLayout::new(cache_dir);

        let spec = RuntimeSpec::from_gemfile(&build.gemfile())?;
        info!("Staging {}", spec);

        ui::topic("Installing JDK");
        let jdk_installer = match &self.jdk_url {
            Some(url) => JdkInstaller::with_base_url(&*self.fetcher, url.as_str()),
            None => JdkInstaller::new(&*self.fetcher),
        };
        let jdk_home = jdk_installer.install(&build, &cache)?;

        ui::topic(&format!("Installing JRuby {}", spec.version));
        let runtime_installer = match &self.jruby_url {
            Some(url) => RuntimeInstaller::with_base_url(&*self.fetcher, url.as_str()),
            None => RuntimeInstaller::new(&*self.fetcher),
        };
        let cached_runtime = runtime_installer.ensure(&spec, &cache)?;
        copy_tree(&cached_runtime, &build.jruby_home())?;
        ui::detail("Vendored runtime into the bundle");

        let toolchain = Toolchain {
            jdk_home,
            jruby_home: build.jruby_home(),
            mode: spec.mode,
        };

        ui::topic("Installing dependencies");
        restore(&cache.bundle_dir(), &build.bundle_dir())?;
        self.resolver.resolve(&toolchain, &build).await?;
        store(&cache.bundle_dir(), &build.bundle_dir())?;
        ui::detail("Dependencies cached for future builds");

        ui::topic("Writing config/database.yml to read from DATABASE_URL");
        dbconfig::write_template(&build)?;

        ui::topic("Precompiling assets");
        assets::maybe_precompile(&*self.assets, &toolchain, &build).await?;

        ui::topic("Exporting runtime environment");
        let mut profile = ProfileScript::new(&build);
        profile.set_env(
            "PATH",
            "$HOME/.jdk/bin:$HOME/vendor/jruby/bin:$HOME/vendor/bundle/bin:$PATH",
        );
        profile.set_env("RAILS_ENV", "production");
        profile.set_env("RACK_ENV", "production");
        profile.set_env("JRUBY_OPTS", spec.mode.flag());
        profile.set_env_default("LANG", "en_US.UTF-8");
        profile.write()?;

        Ok(())
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
