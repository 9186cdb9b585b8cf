//! [`ConfigStore`] over the live `HKEY_LOCAL_MACHINE` hive.

use super::{join_path, Attribute, ConfigStore, StoreKey};
use crate::error::{RegistryError, Result};
use crate::value::{ValueData, ValueType};
use std::io;
use winreg::enums::{RegType, HKEY_LOCAL_MACHINE, KEY_READ, KEY_WOW64_64KEY};
use winreg::RegKey;

const STORE_NAME: &str = "HKEY_LOCAL_MACHINE";

/// The local machine registry, opened read-only.
///
/// Keys are opened in the 64-bit view so a 32-bit build sees the same tree
/// as a native one; 32-bit applications are found through the explicit
/// `WOW6432Node` subtree.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalMachine;

impl LocalMachine {
    /// Creates the store; no handle is opened until [`ConfigStore::open_root`].
    pub fn new() -> Self {
        Self
    }
}

impl ConfigStore for LocalMachine {
    fn describe(&self) -> String {
        STORE_NAME.to_string()
    }

    fn open_root(&self) -> Result<Box<dyn StoreKey + '_>> {
        let key = RegKey::predef(HKEY_LOCAL_MACHINE)
            .open_subkey_with_flags("", KEY_READ | KEY_WOW64_64KEY)
            .map_err(|e| RegistryError::store_unavailable(STORE_NAME, e))?;
        Ok(Box::new(LiveKey {
            key,
            path: String::new(),
        }))
    }
}

struct LiveKey {
    key: RegKey,
    path: String,
}

impl StoreKey for LiveKey {
    fn path(&self) -> &str {
        &self.path
    }

    fn subkey_names(&self) -> Result<Vec<String>> {
        self.key
            .enum_keys()
            .collect::<io::Result<Vec<_>>>()
            .map_err(|e| RegistryError::key_enumeration(&self.path, e.to_string()))
    }

    fn open_subkey(&self, path: &str) -> Result<Box<dyn StoreKey + '_>> {
        let full_path = join_path(&self.path, path);
        let key = self
            .key
            .open_subkey_with_flags(path, KEY_READ | KEY_WOW64_64KEY)
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => RegistryError::key_not_found(&full_path),
                _ => RegistryError::key_access(&full_path, e),
            })?;
        Ok(Box::new(LiveKey {
            key,
            path: full_path,
        }))
    }

    fn values(&self) -> Result<Vec<Attribute>> {
        self.key
            .enum_values()
            .map(|entry| {
                let (name, value) =
                    entry.map_err(|e| RegistryError::key_enumeration(&self.path, e.to_string()))?;
                let data = ValueData::decode(&value.bytes[..], value_type(&value.vtype));
                Ok(Attribute::new(name, data))
            })
            .collect()
    }
}

fn value_type(vtype: &RegType) -> ValueType {
    match vtype {
        RegType::REG_NONE => ValueType::None,
        RegType::REG_SZ => ValueType::String,
        RegType::REG_EXPAND_SZ => ValueType::ExpandString,
        RegType::REG_BINARY => ValueType::Binary,
        RegType::REG_DWORD => ValueType::Dword,
        RegType::REG_DWORD_BIG_ENDIAN => ValueType::DwordBigEndian,
        RegType::REG_LINK => ValueType::Link,
        RegType::REG_MULTI_SZ => ValueType::MultiString,
        RegType::REG_RESOURCE_LIST => ValueType::ResourceList,
        RegType::REG_FULL_RESOURCE_DESCRIPTOR => ValueType::FullResourceDescriptor,
        RegType::REG_RESOURCE_REQUIREMENTS_LIST => ValueType::ResourceRequirementsList,
        RegType::REG_QWORD => ValueType::Qword,
        #[allow(unreachable_patterns)]
        _ => ValueType::Binary,
    }
}
