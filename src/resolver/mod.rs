//! Gem dependency resolution via Bundler
//!
//! The resolver is an external-process collaborator behind a narrow
//! trait, so the pipeline is testable without a working JRuby install.

use crate::error::GantryResult;
use crate::layout::BuildLayout;
use crate::process::ToolCommand;
use crate::runtime::Toolchain;
use crate::ui;
use async_trait::async_trait;

/// Bundler release installed before resolution.
pub const BUNDLER_VERSION: &str = "1.17.3";

/// Materializes exact dependency versions into the build directory.
#[async_trait]
pub trait DependencyResolver: Send + Sync {
    /// Resolve and install the application's dependencies. The manifest
    /// and lockfile must already agree; anything undeclared is pruned.
    /// A nonzero exit aborts the build.
    async fn resolve(&self, toolchain: &Toolchain, build: &BuildLayout) -> GantryResult<()>;
}

/// The real resolver: `gem install bundler` followed by
/// `bundle install` in deployment mode, both run through the vendored
/// JRuby with the declared compatibility mode flag.
pub struct BundlerResolver;

#[async_trait]
impl DependencyResolver for BundlerResolver {
    async fn resolve(&self, toolchain: &Toolchain, build: &BuildLayout) -> GantryResult<()> {
        ui::detail(&format!("Installing Bundler {BUNDLER_VERSION}"));
        ToolCommand::new(toolchain.jruby_bin(), build.root())
            .arg(toolchain.mode.flag())
            .args(["-S", "gem", "install", "bundler", "--version", BUNDLER_VERSION])
            .envs(toolchain.env())
            .stream()
            .await?;

        ui::detail("Running: bundle install");
        ToolCommand::new(toolchain.jruby_bin(), build.root())
            .arg(toolchain.mode.flag())
            .args([
                "-S",
                "bundle",
                "install",
                "--without",
                "development:test",
                "--path",
                "vendor/bundle",
                "--binstubs",
                "vendor/bundle/bin",
                "--deployment",
                "--clean",
            ])
            .envs(toolchain.env())
            .stream()
            .await
    }
}

#[cfg(test)]
pub mod testing {
    //! Resolver doubles for pipeline tests.

    use super::*;
    use crate::error::GantryError;
    use std::path::PathBuf;

    /// Pretends to resolve by writing the given relative files into the
    /// work tree and deleting anything it was told to prune.
    pub struct ScriptedResolver {
        pub installs: Vec<PathBuf>,
        pub prunes: Vec<PathBuf>,
    }

    impl ScriptedResolver {
        pub fn installing<I, P>(files: I) -> Self
        where
            I: IntoIterator<Item = P>,
            P: Into<PathBuf>,
        {
            Self {
                installs: files.into_iter().map(Into::into).collect(),
                prunes: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl DependencyResolver for ScriptedResolver {
        async fn resolve(&self, _toolchain: &Toolchain, build: &BuildLayout) -> GantryResult<()> {
            let bundle = build.bundle_dir();
            for rel in &self.installs {
                let path = bundle.join(rel);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| GantryError::io(format!("creating {}", parent.display()), e))?;
                }
                std::fs::write(&path, b"installed")
                    .map_err(|e| GantryError::io(format!("writing {}", path.display()), e))?;
            }
            for rel in &self.prunes {
                let path = bundle.join(rel);
                if path.exists() {
                    std::fs::remove_dir_all(&path)
                        .map_err(|e| GantryError::io(format!("removing {}", path.display()), e))?;
                }
            }
            Ok(())
        }
    }

    /// Always fails, simulating a resolution conflict.
    pub struct FailingResolver;

    #[async_trait]
    impl DependencyResolver for FailingResolver {
        async fn resolve(&self, _toolchain: &Toolchain, _build: &BuildLayout) -> GantryResult<()> {
            Err(GantryError::CommandExited {
                command: "bundle install".to_string(),
                code: 1,
            })
        }
    }
}
