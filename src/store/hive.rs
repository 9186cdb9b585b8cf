//! [`ConfigStore`] over an offline hive file.
//!
//! An offline `SOFTWARE` hive has no `SOFTWARE` key of its own: on a running
//! system it is mounted at `HKLM\SOFTWARE`. The store therefore strips a
//! leading path component equal to its mount point, so the usual
//! `SOFTWARE\...\Uninstall` paths resolve inside the file.

use super::{join_path, path_components, Attribute, ConfigStore, StoreKey};
use crate::error::{RegistryError, Result};
use crate::hive::{Hive, HiveKey};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Mount point of the hive that holds uninstall records.
pub const DEFAULT_MOUNT: &str = "SOFTWARE";

/// A registry store read from a hive file.
pub struct HiveStore {
    hive: Hive,
    source: PathBuf,
    mount: Option<String>,
}

impl HiveStore {
    /// Opens the hive file at `path`, mounted at [`DEFAULT_MOUNT`].
    ///
    /// # Errors
    ///
    /// Any failure to read or validate the file is reported as
    /// [`RegistryError::StoreUnavailable`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = path.as_ref().to_path_buf();
        let hive = Hive::open(&source)
            .map_err(|e| RegistryError::store_unavailable(source.display().to_string(), e))?;
        Ok(Self::from_hive(hive, source))
    }

    /// Wraps an already loaded hive.
    pub fn from_hive(hive: Hive, source: impl Into<PathBuf>) -> Self {
        Self {
            hive,
            source: source.into(),
            mount: Some(DEFAULT_MOUNT.to_string()),
        }
    }

    /// Sets the mount point; `None` resolves paths from the hive root as is.
    pub fn with_mount(mut self, mount: Option<&str>) -> Self {
        self.mount = mount
            .map(|m| m.trim_matches(super::PATH_SEPARATOR).to_string())
            .filter(|m| !m.is_empty());
        self
    }

    /// Returns the underlying hive.
    pub fn hive(&self) -> &Hive {
        &self.hive
    }
}

impl ConfigStore for HiveStore {
    fn describe(&self) -> String {
        self.source.display().to_string()
    }

    fn open_root(&self) -> Result<Box<dyn StoreKey + '_>> {
        let key = self
            .hive
            .root_key()
            .map_err(|e| RegistryError::store_unavailable(self.describe(), e))?;
        Ok(Box::new(HiveStoreKey {
            key,
            path: String::new(),
            mount: self.mount.as_deref(),
        }))
    }
}

struct HiveStoreKey<'h> {
    key: HiveKey<'h>,
    path: String,
    /// Only set on the root handle.
    mount: Option<&'h str>,
}

impl StoreKey for HiveStoreKey<'_> {
    fn path(&self) -> &str {
        &self.path
    }

    fn subkey_names(&self) -> Result<Vec<String>> {
        let subkeys = self
            .key
            .subkeys()
            .map_err(|e| RegistryError::key_enumeration(&self.path, e.to_string()))?;
        Ok(subkeys.iter().map(|key| key.name().to_string()).collect())
    }

    fn open_subkey(&self, path: &str) -> Result<Box<dyn StoreKey + '_>> {
        let full_path = join_path(&self.path, path);
        let mut parts = path_components(path).peekable();
        let below_mount = matches!(
            (self.mount, parts.peek()),
            (Some(mount), Some(first)) if first.eq_ignore_ascii_case(mount)
        );
        if below_mount {
            debug!(mount = self.mount, "Resolving path below hive mount point");
            parts.next();
        }

        let mut key = self.key.clone();
        for part in parts {
            key = key
                .subkey(part)
                .map_err(|e| RegistryError::key_access(&full_path, e))?
                .ok_or_else(|| RegistryError::key_not_found(&full_path))?;
        }

        Ok(Box::new(HiveStoreKey {
            key,
            path: full_path,
            mount: None,
        }))
    }

    fn values(&self) -> Result<Vec<Attribute>> {
        let values = self
            .key
            .values()
            .map_err(|e| RegistryError::key_enumeration(&self.path, e.to_string()))?;
        values
            .iter()
            .map(|value| {
                let data = value
                    .data()
                    .map_err(|e| RegistryError::key_enumeration(&self.path, e.to_string()))?;
                Ok(Attribute::new(value.name(), data))
            })
            .collect()
    }
}
