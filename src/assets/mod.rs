//! Asset precompilation
//!
//! Runs the application's `assets:precompile` rake task, unless the app
//! shipped precompiled assets or has no such task. Detection is a dry
//! run; only the real invocation is allowed to fail the build.

use crate::error::GantryResult;
use crate::layout::BuildLayout;
use crate::process::ToolCommand;
use crate::runtime::Toolchain;
use crate::ui;
use async_trait::async_trait;

/// External asset build task.
#[async_trait]
pub trait AssetCompiler: Send + Sync {
    /// Dry-run probe: whether the asset task exists and is runnable.
    async fn detect(&self, toolchain: &Toolchain, build: &BuildLayout) -> bool;

    /// The real compilation. A nonzero exit aborts the build.
    async fn compile(&self, toolchain: &Toolchain, build: &BuildLayout) -> GantryResult<()>;
}

/// `rake assets:precompile` through the vendored JRuby.
pub struct RakeAssetCompiler;

#[async_trait]
impl AssetCompiler for RakeAssetCompiler {
    async fn detect(&self, toolchain: &Toolchain, build: &BuildLayout) -> bool {
        ToolCommand::new(toolchain.jruby_bin(), build.root())
            .arg(toolchain.mode.flag())
            .args(["-S", "rake", "--dry-run", "assets:precompile"])
            .envs(toolchain.env())
            .succeeds()
            .await
    }

    async fn compile(&self, toolchain: &Toolchain, build: &BuildLayout) -> GantryResult<()> {
        ToolCommand::new(toolchain.jruby_bin(), build.root())
            .arg(toolchain.mode.flag())
            .args(["-S", "rake", "assets:precompile"])
            .envs(toolchain.env())
            .env("RAILS_ENV", "production")
            .env("RACK_ENV", "production")
            .stream()
            .await
    }
}

/// Precompile assets if the app needs it.
///
/// Shipped assets (an existing manifest) and a failed dry run both skip
/// compilation entirely; only the real task's failure is fatal.
pub async fn maybe_precompile(
    compiler: &dyn AssetCompiler,
    toolchain: &Toolchain,
    build: &BuildLayout,
) -> GantryResult<()> {
    if build.asset_manifest().is_file() {
        ui::detail("Assets already compiled, skipping");
        return Ok(());
    }

    if !compiler.detect(toolchain, build).await {
        ui::warn("Could not detect rake task assets:precompile, skipping");
        return Ok(());
    }

    ui::detail("Running: rake assets:precompile");
    compiler.compile(toolchain, build).await
}
