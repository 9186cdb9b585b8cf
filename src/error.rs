//! Error types for store access, hive parsing and search configuration.
//!
//! Store-level failures (`StoreUnavailable`, `KeyNotFound`, `KeyAccess`,
//! `KeyEnumeration`) are what the walker reacts to. The hive format variants
//! only surface when an offline hive file is damaged.

use std::io;
use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur while opening, parsing or walking a registry store.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The store root could not be opened.
    #[error("Registry store unavailable: {store}")]
    StoreUnavailable {
        /// Human-readable name of the store (hive path, `HKEY_LOCAL_MACHINE`, ...).
        store: String,
        /// Underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A key does not exist.
    #[error("Key not found: {path}")]
    KeyNotFound {
        /// Path of the missing key, relative to the store root.
        path: String,
    },

    /// A key exists but could not be opened.
    #[error("Cannot open key {path}")]
    KeyAccess {
        /// Path of the key that failed to open.
        path: String,
        /// Underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Subkeys or values of an open key could not be listed.
    #[error("Cannot enumerate key {path}: {reason}")]
    KeyEnumeration {
        /// Path of the key being enumerated.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// None of the configured subtrees exist in the store.
    #[error("No uninstall subtree found in {store}: tried {}", subtrees.join(", "))]
    NoSubtrees {
        /// Store that was searched.
        store: String,
        /// Subtree paths that were tried, in order.
        subtrees: Vec<String>,
    },

    /// Search configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error occurred while reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid magic signature in header or structure.
    #[error("Invalid signature: expected {expected:?}, found {found:?}")]
    InvalidSignature {
        /// Signature the format requires.
        expected: Vec<u8>,
        /// Signature actually present.
        found: Vec<u8>,
    },

    /// Invalid hive format or corrupted data.
    #[error("Invalid hive format: {0}")]
    InvalidFormat(String),

    /// Cell offset is out of bounds.
    #[error("Invalid cell offset: {offset:#x} (hive size: {hive_size:#x})")]
    InvalidOffset {
        /// Offending cell offset.
        offset: u32,
        /// Size of the mapped hive.
        hive_size: usize,
    },

    /// Cell size is invalid or corrupted.
    #[error("Invalid cell size: {size} at offset {offset:#x}")]
    InvalidCellSize {
        /// Raw signed size field.
        size: i32,
        /// Offset of the cell.
        offset: u32,
    },

    /// Data truncated or incomplete.
    #[error("Truncated data at offset {offset:#x}: expected {expected} bytes, got {actual} bytes")]
    TruncatedData {
        /// Offset of the structure being read.
        offset: u32,
        /// Bytes required.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },

    /// Invalid UTF-16 name data.
    #[error("Invalid UTF-16 string at offset {offset:#x}")]
    InvalidUtf16 {
        /// Offset of the owning cell.
        offset: u32,
    },

    /// Hive is too small to be valid.
    #[error("Hive too small: {size} bytes (minimum: {minimum} bytes)")]
    HiveTooSmall {
        /// Actual size.
        size: usize,
        /// Required size.
        minimum: usize,
    },

    /// Checksum mismatch in hive header.
    #[error("Checksum mismatch: expected {expected:#x}, calculated {calculated:#x}")]
    ChecksumMismatch {
        /// Checksum stored in the base block.
        expected: u32,
        /// Checksum computed over the base block.
        calculated: u32,
    },

    /// Unsupported hive version.
    #[error("Unsupported hive version: {major}.{minor}")]
    UnsupportedVersion {
        /// Major version.
        major: u32,
        /// Minor version.
        minor: u32,
    },

    /// Invalid subkey list type.
    #[error("Invalid subkey list type: {list_type:?}")]
    InvalidSubkeyList {
        /// Two-byte signature found.
        list_type: [u8; 2],
    },
}

impl RegistryError {
    /// Creates an invalid signature error with context.
    pub fn invalid_signature(expected: &[u8], found: &[u8]) -> Self {
        Self::InvalidSignature {
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }

    /// Creates an invalid offset error with context.
    pub fn invalid_offset(offset: u32, hive_size: usize) -> Self {
        Self::InvalidOffset { offset, hive_size }
    }

    /// Creates a truncation error for a structure at `offset`.
    pub fn truncated(offset: u32, expected: usize, actual: usize) -> Self {
        Self::TruncatedData {
            offset,
            expected,
            actual,
        }
    }

    /// Wraps a failure to open the store root.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use reg_appsearch::error::RegistryError;
    /// let io = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
    /// let err = RegistryError::store_unavailable("HKEY_LOCAL_MACHINE", io);
    /// assert!(err.is_fatal());
    /// ```
    pub fn store_unavailable<E>(store: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::StoreUnavailable {
            store: store.into(),
            source: source.into(),
        }
    }

    /// Wraps a failure to open a key below the root.
    pub fn key_access<E>(path: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::KeyAccess {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Creates an enumeration error for the key at `path`.
    pub fn key_enumeration(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::KeyEnumeration {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a not found error for the key at `path`.
    pub fn key_not_found(path: impl Into<String>) -> Self {
        Self::KeyNotFound { path: path.into() }
    }

    /// Returns true for errors that always abort a search, whatever the key
    /// error policy says.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }

    /// Returns true if the error reports a missing key.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_unavailable_is_fatal() {
        let err = RegistryError::store_unavailable("SOFTWARE", "no such file");
        assert!(err.is_fatal());
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "Registry store unavailable: SOFTWARE");
    }

    #[test]
    fn test_key_errors_are_not_fatal() {
        let err = RegistryError::key_access("Uninstall\\App", "access denied");
        assert!(!err.is_fatal());

        let err = RegistryError::key_not_found("Uninstall");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Key not found: Uninstall");
    }

    #[test]
    fn test_no_subtrees_lists_paths() {
        let err = RegistryError::NoSubtrees {
            store: "SYSTEM".to_string(),
            subtrees: vec!["A".to_string(), "B".to_string()],
        };
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "No uninstall subtree found in SYSTEM: tried A, B");
    }

    #[test]
    fn test_key_access_keeps_source() {
        use std::error::Error as _;

        let io = io::Error::from(io::ErrorKind::PermissionDenied);
        let err = RegistryError::key_access("Uninstall\\App", io);
        assert!(err.source().is_some());
    }
}
