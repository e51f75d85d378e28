//! Error types for Gantry
//!
//! All modules use `GantryResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Gantry operations
pub type GantryResult<T> = Result<T, GantryError>;

/// All errors that can occur in Gantry
#[derive(Error, Debug)]
pub enum GantryError {
    // Manifest errors
    #[error("Gemfile not found: {0}")]
    ManifestMissing(PathBuf),

    #[error("No jruby runtime declared in {path}")]
    RuntimeDirectiveMissing { path: PathBuf },

    #[error("Invalid runtime version '{value}': {reason}")]
    RuntimeVersionInvalid { value: String, reason: String },

    #[error("Unsupported Ruby compatibility mode '{0}'")]
    RuntimeModeUnsupported(String),

    #[error("Unsupported runtime engine '{0}'. Only jruby applications can be staged.")]
    EngineUnsupported(String),

    // Archive errors
    #[error("Download failed: {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Failed to unpack archive from {url}: {reason}")]
    Extract { url: String, reason: String },

    // Cache errors
    #[error("Failed to promote cache into {path}: {source}")]
    CachePromote {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Database config errors (surface when the generated template is
    // evaluated at application boot, modeled here for the boot-time logic)
    #[error("Invalid database URL '{url}': {reason}")]
    DatabaseUrlInvalid { url: String, reason: String },

    #[error("No deployment stage set: RAILS_ENV or RACK_ENV is required")]
    StageUnset,

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed: {command}, exit code: {code}")]
    CommandExited { command: String, code: i32 },

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GantryError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a download error
    pub fn download(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create an extract error
    pub fn extract(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Extract {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ManifestMissing(_) => {
                Some("The application root must contain a Gemfile declaring the jruby engine")
            }
            Self::RuntimeDirectiveMissing { .. } => Some(
                "Declare the runtime in the Gemfile: ruby '1.9.3', :engine => 'jruby', :engine_version => '1.7.4'",
            ),
            Self::RuntimeModeUnsupported(_) => Some("Supported modes: 1.8, 1.9, 2.0"),
            Self::Download { .. } => {
                Some("Check that the declared version exists on the distribution mirror")
            }
            _ => None,
        }
    }
}
