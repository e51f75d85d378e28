//! Minimal `system.properties` reader and writer
//!
//! Java-style `key=value` lines. Comments and blank lines are tolerated
//! on read and dropped on write; key order is preserved.

use crate::error::{GantryError, GantryResult};
use std::fs;
use std::path::Path;

/// An ordered set of `key=value` properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemProperties {
    entries: Vec<(String, String)>,
}

impl SystemProperties {
    /// A properties set holding a single entry.
    pub fn with(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut props = Self::default();
        props.set(key, value);
        props
    }

    /// Load from a file. A missing file is `None`, not an error.
    pub fn load(path: &Path) -> GantryResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| GantryError::io(format!("reading {}", path.display()), e))?;
        Ok(Some(Self::parse(&contents)))
    }

    /// Parse properties from text. Lines without `=` are skipped.
    pub fn parse(contents: &str) -> Self {
        let mut props = Self::default();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                props.set(key.trim(), value.trim());
            }
        }
        props
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a key, replacing an existing value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Write the properties to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> GantryResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| GantryError::io(format!("creating {}", parent.display()), e))?;
        }
        let mut contents = String::new();
        for (key, value) in &self.entries {
            contents.push_str(key);
            contents.push('=');
            contents.push_str(value);
            contents.push('\n');
        }
        fs::write(path, contents)
            .map_err(|e| GantryError::io(format!("writing {}", path.display()), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_skips_comments_and_blanks() {
        let props = SystemProperties::parse(
            "# build settings\n\njava.runtime.version=1.8\nmaven.version = 3.2.5\n",
        );

        assert_eq!(props.get("java.runtime.version"), Some("1.8"));
        assert_eq!(props.get("maven.version"), Some("3.2.5"));
        assert_eq!(props.get("missing"), None);
    }

    #[test]
    fn set_replaces_in_place() {
        let mut props = SystemProperties::with("java.runtime.version", "1.7");
        props.set("java.runtime.version", "1.8");

        assert_eq!(props.get("java.runtime.version"), Some("1.8"));
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let loaded = SystemProperties::load(&dir.path().join("system.properties")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("system.properties");

        let props = SystemProperties::with("java.runtime.version", "1.8");
        props.save(&path).unwrap();

        let loaded = SystemProperties::load(&path).unwrap().unwrap();
        assert_eq!(loaded, props);
    }
}
