//! Application manifest parsing
//!
//! The runtime an application wants is declared in its Gemfile:
//!
//! ```text
//! ruby '1.9.3', :engine => 'jruby', :engine_version => '1.7.4'
//! ```
//!
//! The directive is parsed structurally into a typed [`RuntimeSpec`];
//! a missing directive or malformed version fails the build outright.

pub mod properties;

use crate::error::{GantryError, GantryResult};
use regex::Regex;
use semver::Version;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Ruby language compatibility modes JRuby can run in.
///
/// The mode selects the language level flag passed to every jruby
/// invocation during the build and exported for the running app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RubyMode {
    Compat18,
    Compat19,
    Compat20,
}

impl RubyMode {
    /// The jruby command-line flag for this mode.
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Compat18 => "--1.8",
            Self::Compat19 => "--1.9",
            Self::Compat20 => "--2.0",
        }
    }

    /// Parse from the leading `major.minor` of the declared Ruby version.
    fn from_compat(compat: &str) -> Option<Self> {
        match compat {
            "1.8" => Some(Self::Compat18),
            "1.9" => Some(Self::Compat19),
            "2.0" => Some(Self::Compat20),
            _ => None,
        }
    }
}

impl fmt::Display for RubyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self {
            Self::Compat18 => "1.8",
            Self::Compat19 => "1.9",
            Self::Compat20 => "2.0",
        };
        write!(f, "{}", mode)
    }
}

/// The runtime selection parsed from the Gemfile directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSpec {
    /// JRuby engine version (strict dotted-numeric, e.g. 1.7.4)
    pub version: Version,
    /// Ruby language compatibility mode
    pub mode: RubyMode,
}

impl RuntimeSpec {
    /// Read and parse the runtime directive from a Gemfile on disk.
    pub fn from_gemfile(path: &Path) -> GantryResult<Self> {
        let contents =
            fs::read_to_string(path).map_err(|_| GantryError::ManifestMissing(path.to_path_buf()))?;
        Self::parse(&contents, path)
    }

    /// Parse the runtime directive out of Gemfile contents.
    ///
    /// Accepts both hash syntaxes (`:engine => 'jruby'` and
    /// `engine: 'jruby'`) with single or double quotes.
    pub fn parse(contents: &str, path: &Path) -> GantryResult<Self> {
        let directive = Regex::new(
            r#"(?x)
            ^\s* ruby \s+ ['"] (?P<compat>\d+\.\d+) (?:\.\d+)? ['"]
            \s*,\s* (?: :engine \s* => | engine: ) \s* ['"] (?P<engine>\w+) ['"]
            \s*,\s* (?: :engine_version \s* => | engine_version: ) \s* ['"] (?P<version>[^'"]+) ['"]
            "#,
        )
        .map_err(|e| GantryError::Internal(format!("runtime directive pattern: {e}")))?;

        for line in contents.lines() {
            let Some(caps) = directive.captures(line) else {
                continue;
            };

            let engine = &caps["engine"];
            if engine != "jruby" {
                return Err(GantryError::EngineUnsupported(engine.to_string()));
            }

            let raw_version = &caps["version"];
            let version =
                Version::parse(raw_version).map_err(|e| GantryError::RuntimeVersionInvalid {
                    value: raw_version.to_string(),
                    reason: e.to_string(),
                })?;

            let compat = &caps["compat"];
            let mode = RubyMode::from_compat(compat)
                .ok_or_else(|| GantryError::RuntimeModeUnsupported(compat.to_string()))?;

            debug!("Runtime directive: jruby {} mode {}", version, mode);
            return Ok(Self { version, mode });
        }

        Err(GantryError::RuntimeDirectiveMissing {
            path: path.to_path_buf(),
        })
    }
}

impl fmt::Display for RuntimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "jruby {} (ruby {} mode)", self.version, self.mode)
    }
}
