//! Search configuration.
//!
//! Defaults reproduce the standard search: both uninstall subtrees, abort on
//! the first key error. A JSON file can override either field.

use crate::error::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Native uninstall records.
pub const UNINSTALL_SUBTREE: &str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall";

/// Uninstall records of 32-bit applications on 64-bit Windows.
pub const WOW64_UNINSTALL_SUBTREE: &str =
    r"SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall";

/// What to do when a subtree or application key cannot be opened or read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyErrorPolicy {
    /// Stop the search and return the error.
    #[default]
    Abort,
    /// Log a warning, skip the key and keep going.
    Skip,
}

/// Options for a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Subtree paths to scan, relative to the store root, in order.
    pub subtrees: Vec<String>,
    /// Handling of per-key failures.
    pub on_key_error: KeyErrorPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            subtrees: vec![
                UNINSTALL_SUBTREE.to_string(),
                WOW64_UNINSTALL_SUBTREE.to_string(),
            ],
            on_key_error: KeyErrorPolicy::Abort,
        }
    }
}

impl SearchConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid JSON, has unknown
    /// fields, or does not pass [`SearchConfig::validate`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(&path)?;
        let config = Self::from_json(&text)?;
        debug!(path = %path.as_ref().display(), subtrees = config.subtrees.len(), "Loaded search configuration");
        Ok(config)
    }

    /// Parses and validates a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the key error policy.
    pub fn with_policy(mut self, policy: KeyErrorPolicy) -> Self {
        self.on_key_error = policy;
        self
    }

    /// Checks that at least one subtree is configured and none is blank.
    pub fn validate(&self) -> Result<()> {
        if self.subtrees.is_empty() {
            return Err(RegistryError::Config("no subtrees configured".to_string()));
        }
        if self.subtrees.iter().any(|s| s.trim().trim_matches('\\').is_empty()) {
            return Err(RegistryError::Config("subtree path is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scans_both_subtrees() {
        let config = SearchConfig::default();
        assert_eq!(config.subtrees, vec![UNINSTALL_SUBTREE, WOW64_UNINSTALL_SUBTREE]);
        assert_eq!(config.on_key_error, KeyErrorPolicy::Abort);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SearchConfig::from_json(r#"{"on_key_error": "skip"}"#).unwrap();
        assert_eq!(config.on_key_error, KeyErrorPolicy::Skip);
        assert_eq!(config.subtrees.len(), 2);
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = SearchConfig::from_json(r#"{"subtree": []}"#).unwrap_err();
        assert!(matches!(err, RegistryError::Json(_)));
    }

    #[test]
    fn test_rejects_empty_subtrees() {
        let err = SearchConfig::from_json(r#"{"subtrees": []}"#).unwrap_err();
        assert!(matches!(err, RegistryError::Config(_)));

        let err = SearchConfig::from_json(r#"{"subtrees": ["  "]}"#).unwrap_err();
        assert!(matches!(err, RegistryError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search.json");
        std::fs::write(&path, r#"{"subtrees": ["SOFTWARE\\Vendor\\Apps"]}"#).unwrap();

        let config = SearchConfig::load(&path).unwrap();
        assert_eq!(config.subtrees, vec![r"SOFTWARE\Vendor\Apps"]);
    }
}
