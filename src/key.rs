//! Registry key node (nk) parsing.

use crate::error::{RegistryError, Result};
use crate::utils::{read_ascii_string, read_u16_le, read_u32_le, read_u64_le, read_utf16_string, NO_OFFSET};

/// Offset of the key name within a key node; also its minimum size.
const KEY_NAME_OFFSET: usize = 0x4C;

/// Key node flag: this is the hive root.
pub const KEY_HIVE_ENTRY: u16 = 0x0004;

/// Key node flag: the name is stored as Latin-1 rather than UTF-16LE.
pub const KEY_COMP_NAME: u16 = 0x0020;

/// Key node (nk) cell, reduced to the fields a read-only walk needs.
#[derive(Debug, Clone)]
pub struct KeyNode {
    /// Raw flags.
    pub flags: u16,
    /// Last written timestamp (Windows FILETIME).
    pub last_written: u64,
    /// Number of stable subkeys.
    pub subkey_count: u32,
    /// Cell offset of the stable subkey list.
    pub subkey_list_offset: u32,
    /// Number of values.
    pub value_count: u32,
    /// Cell offset of the value offset array.
    pub value_list_offset: u32,
    /// Key name.
    pub name: String,
}

impl KeyNode {
    /// Parses a key node from cell data starting at the `nk` signature.
    pub fn parse(data: &[u8], offset: u32) -> Result<Self> {
        if data.len() < KEY_NAME_OFFSET {
            return Err(RegistryError::truncated(offset, KEY_NAME_OFFSET, data.len()));
        }
        if &data[0..2] != b"nk" {
            return Err(RegistryError::InvalidFormat(format!(
                "Expected 'nk' signature at offset {:#x}",
                offset
            )));
        }

        let flags = read_u16_le(data, 0x02)?;
        let name_length = read_u16_le(data, 0x48)? as usize;
        let raw_name = data
            .get(KEY_NAME_OFFSET..KEY_NAME_OFFSET + name_length)
            .ok_or_else(|| RegistryError::truncated(offset, KEY_NAME_OFFSET + name_length, data.len()))?;
        let name = if flags & KEY_COMP_NAME != 0 {
            read_ascii_string(raw_name)
        } else {
            read_utf16_string(raw_name, offset)?
        };

        Ok(KeyNode {
            flags,
            last_written: read_u64_le(data, 0x04)?,
            subkey_count: read_u32_le(data, 0x14)?,
            subkey_list_offset: read_u32_le(data, 0x1C)?,
            value_count: read_u32_le(data, 0x24)?,
            value_list_offset: read_u32_le(data, 0x28)?,
            name,
        })
    }

    /// Returns true if this key has a subkey list to follow.
    pub fn has_subkeys(&self) -> bool {
        self.subkey_count > 0 && self.subkey_list_offset != NO_OFFSET
    }

    /// Returns true if this key has a value list to follow.
    pub fn has_values(&self) -> bool {
        self.value_count > 0 && self.value_list_offset != NO_OFFSET
    }

    /// Returns true if this is the hive root.
    pub fn is_root(&self) -> bool {
        self.flags & KEY_HIVE_ENTRY != 0
    }
}
