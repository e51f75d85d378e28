//! Runtime environment export
//!
//! The platform sources every script under `.profile.d/` when the
//! application container starts. Gantry regenerates its script from
//! scratch on each build; it is never read back.

use crate::error::{GantryError, GantryResult};
use crate::layout::BuildLayout;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Accumulates export lines, then writes them in one shot.
#[derive(Debug)]
pub struct ProfileScript {
    path: PathBuf,
    lines: Vec<String>,
}

impl ProfileScript {
    pub fn new(build: &BuildLayout) -> Self {
        Self {
            path: build.profile_script(),
            lines: Vec::new(),
        }
    }

    /// Export a value, overriding anything already in the environment.
    pub fn set_env(&mut self, name: &str, value: &str) {
        self.lines.push(format!("export {name}=\"{value}\""));
    }

    /// Export a default: the value applies only when the variable is
    /// not already set, so platform-level configuration wins.
    pub fn set_env_default(&mut self, name: &str, value: &str) {
        self.lines.push(format!("export {name}=${{{name}:-{value}}}"));
    }

    /// Write the script into the build directory.
    pub fn write(&self) -> GantryResult<PathBuf> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| GantryError::io(format!("creating {}", parent.display()), e))?;
        }

        let mut contents = self.lines.join("\n");
        contents.push('\n');
        fs::write(&self.path, contents)
            .map_err(|e| GantryError::io(format!("writing {}", self.path.display()), e))?;

        debug!("Wrote {} ({} exports)", self.path.display(), self.lines.len());
        Ok(self.path.clone())
    }
}
