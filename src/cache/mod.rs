//! Cross-build dependency cache synchronization
//!
//! The gem tree installed under the build directory is mirrored into the
//! cache directory after every successful resolution, and merged back
//! before the next one.
//!
//! # Contract
//!
//! | Operation | Semantics |
//! |-----------|-----------|
//! | [`restore`] | merge cache into work tree; cache wins on conflict, nothing staged is removed |
//! | [`store`] | full replacement of the cache with the work tree, promoted atomically |
//!
//! `store` never deletes the previous cache until its replacement is
//! fully staged: the new tree is copied into a temporary directory
//! beside the cache and swapped in by rename. A build killed mid-store
//! leaves the old cache intact.

use crate::error::{GantryError, GantryResult};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Merge the cached tree into the work tree ahead of resolution.
///
/// A missing cache is the expected cold-start condition, not an error.
/// Files present in both trees are taken from the cache; files only in
/// the work tree are left alone.
pub fn restore(cache_tree: &Path, work_tree: &Path) -> GantryResult<()> {
    if !cache_tree.is_dir() {
        debug!("No cache at {}, cold start", cache_tree.display());
        return Ok(());
    }

    debug!(
        "Restoring cache {} -> {}",
        cache_tree.display(),
        work_tree.display()
    );
    copy_tree(cache_tree, work_tree)
}

/// Replace the cached tree with the work tree.
///
/// The work tree is first copied into a staging directory next to the
/// cache, then swapped into place. The previous cache survives until
/// the swap commits; on a failed swap it is moved back.
pub fn store(cache_tree: &Path, work_tree: &Path) -> GantryResult<()> {
    let parent = cache_tree.parent().ok_or_else(|| {
        GantryError::Internal(format!("cache tree {} has no parent", cache_tree.display()))
    })?;
    fs::create_dir_all(parent)
        .map_err(|e| GantryError::io(format!("creating {}", parent.display()), e))?;

    let staging = tempfile::Builder::new()
        .prefix(".cache-staging")
        .tempdir_in(parent)
        .map_err(|e| GantryError::io(format!("staging under {}", parent.display()), e))?;

    let staged = staging.path().join("next");
    copy_tree(work_tree, &staged)?;

    let retired = staging.path().join("previous");
    let had_cache = cache_tree.is_dir();
    if had_cache {
        fs::rename(cache_tree, &retired).map_err(|e| GantryError::CachePromote {
            path: cache_tree.to_path_buf(),
            source: e,
        })?;
    }

    if let Err(e) = fs::rename(&staged, cache_tree) {
        // Put the old cache back before reporting; the staging
        // directory (with the failed copy) is cleaned up on drop.
        if had_cache {
            let _ = fs::rename(&retired, cache_tree);
        }
        return Err(GantryError::CachePromote {
            path: cache_tree.to_path_buf(),
            source: e,
        });
    }

    debug!(
        "Stored {} as {}",
        work_tree.display(),
        cache_tree.display()
    );
    Ok(())
}

/// Recursively copy `src` into `dst`, creating `dst` if needed.
///
/// Directories merge; existing files are overwritten by the source
/// copy. Only regular files and directories are carried; symlinks and
/// special files are skipped.
pub fn copy_tree(src: &Path, dst: &Path) -> GantryResult<()> {
    fs::create_dir_all(dst)
        .map_err(|e| GantryError::io(format!("creating {}", dst.display()), e))?;

    let entries = fs::read_dir(src)
        .map_err(|e| GantryError::io(format!("reading {}", src.display()), e))?;

    for entry in entries {
        let entry =
            entry.map_err(|e| GantryError::io(format!("reading {}", src.display()), e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| GantryError::io(format!("inspecting {}", entry.path().display()), e))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if file_type.is_dir() {
            copy_tree(&src_path, &dst_path)?;
        } else if file_type.is_file() {
            fs::copy(&src_path, &dst_path).map_err(|e| {
                GantryError::io(
                    format!(
                        "copying {} to {}",
                        src_path.display(),
                        dst_path.display()
                    ),
                    e,
                )
            })?;
        }
    }

    Ok(())
}
