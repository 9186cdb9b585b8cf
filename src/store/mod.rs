//! Read-only access to a hierarchical registry store.
//!
//! The search code only talks to [`ConfigStore`] and [`StoreKey`]. Each open
//! key is an owned handle; dropping it releases the underlying resource, so
//! every exit path of a walk, `?` included, closes what it opened.

pub mod hive;
#[cfg(windows)]
pub mod live;
pub mod memory;

use crate::error::Result;
use crate::value::ValueData;

pub use self::hive::HiveStore;
#[cfg(windows)]
pub use self::live::LocalMachine;
pub use self::memory::MemoryStore;

/// Path separator used by registry paths.
pub const PATH_SEPARATOR: char = '\\';

/// One name/value pair stored under a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Value name, case preserved.
    pub name: String,
    /// Decoded value.
    pub value: ValueData,
}

impl Attribute {
    /// Creates an attribute.
    pub fn new(name: impl Into<String>, value: impl Into<ValueData>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A registry store that can be opened at its root.
pub trait ConfigStore {
    /// Name used in logs and errors, e.g. `HKEY_LOCAL_MACHINE` or a hive path.
    fn describe(&self) -> String;

    /// Opens the root key.
    ///
    /// Implementations report failure as
    /// [`RegistryError::StoreUnavailable`](crate::RegistryError::StoreUnavailable).
    fn open_root(&self) -> Result<Box<dyn StoreKey + '_>>;
}

/// An open key handle.
pub trait StoreKey {
    /// Path of this key relative to the store root; empty for the root.
    fn path(&self) -> &str;

    /// Names of the immediate subkeys, in the store's enumeration order.
    fn subkey_names(&self) -> Result<Vec<String>>;

    /// Opens a descendant by backslash-separated relative path.
    ///
    /// A missing key is [`RegistryError::KeyNotFound`](crate::RegistryError::KeyNotFound);
    /// any other failure is [`RegistryError::KeyAccess`](crate::RegistryError::KeyAccess).
    fn open_subkey(&self, path: &str) -> Result<Box<dyn StoreKey + '_>>;

    /// All values of this key, in the store's enumeration order.
    fn values(&self) -> Result<Vec<Attribute>>;
}

impl<T: ConfigStore + ?Sized> ConfigStore for &T {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn open_root(&self) -> Result<Box<dyn StoreKey + '_>> {
        (**self).open_root()
    }
}

/// Splits a registry path into its non-empty components.
pub fn path_components(path: &str) -> impl Iterator<Item = &str> {
    path.split(PATH_SEPARATOR).filter(|part| !part.is_empty())
}

/// Joins a parent path and a relative child path.
pub fn join_path(parent: &str, child: &str) -> String {
    let child = child.trim_matches(PATH_SEPARATOR);
    if parent.is_empty() {
        child.to_string()
    } else if child.is_empty() {
        parent.to_string()
    } else {
        format!("{}{}{}", parent, PATH_SEPARATOR, child)
    }
}
