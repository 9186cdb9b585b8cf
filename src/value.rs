//! Registry value types, value key (vk) cells, and decoded value data.

use crate::error::{RegistryError, Result};
use crate::utils::{read_ascii_string, read_u16_le, read_u32_le, read_utf16_lossy, read_utf16_string};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Serialize, Serializer};
use std::fmt;

/// Registry value data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// REG_NONE
    None,
    /// REG_SZ
    String,
    /// REG_EXPAND_SZ
    ExpandString,
    /// REG_BINARY
    Binary,
    /// REG_DWORD
    Dword,
    /// REG_DWORD_BIG_ENDIAN
    DwordBigEndian,
    /// REG_LINK
    Link,
    /// REG_MULTI_SZ
    MultiString,
    /// REG_RESOURCE_LIST
    ResourceList,
    /// REG_FULL_RESOURCE_DESCRIPTOR
    FullResourceDescriptor,
    /// REG_RESOURCE_REQUIREMENTS_LIST
    ResourceRequirementsList,
    /// REG_QWORD
    Qword,
    /// Any other type code.
    Unknown(u32),
}

impl ValueType {
    /// Maps a raw type code to a value type. Codes above 11 are legal and
    /// kept as `Unknown`.
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => ValueType::None,
            1 => ValueType::String,
            2 => ValueType::ExpandString,
            3 => ValueType::Binary,
            4 => ValueType::Dword,
            5 => ValueType::DwordBigEndian,
            6 => ValueType::Link,
            7 => ValueType::MultiString,
            8 => ValueType::ResourceList,
            9 => ValueType::FullResourceDescriptor,
            10 => ValueType::ResourceRequirementsList,
            11 => ValueType::Qword,
            other => ValueType::Unknown(other),
        }
    }

    /// Returns the raw type code.
    pub fn code(self) -> u32 {
        match self {
            ValueType::None => 0,
            ValueType::String => 1,
            ValueType::ExpandString => 2,
            ValueType::Binary => 3,
            ValueType::Dword => 4,
            ValueType::DwordBigEndian => 5,
            ValueType::Link => 6,
            ValueType::MultiString => 7,
            ValueType::ResourceList => 8,
            ValueType::FullResourceDescriptor => 9,
            ValueType::ResourceRequirementsList => 10,
            ValueType::Qword => 11,
            ValueType::Unknown(code) => code,
        }
    }
}

/// Value key (vk) cell.
#[derive(Debug, Clone)]
pub struct ValueKey {
    /// Value name; `(default)` for the unnamed value.
    pub name: String,
    /// Data length in bytes, inline flag stripped.
    pub data_length: u32,
    /// Cell offset of the data, or the data itself when inline.
    pub data_offset: u32,
    /// Value type.
    pub data_type: ValueType,
    inline: bool,
}

/// Name used for the unnamed value of a key.
pub const DEFAULT_VALUE_NAME: &str = "(default)";

const VALUE_KEY_MIN_SIZE: usize = 0x14;
const DATA_INLINE_FLAG: u32 = 0x8000_0000;
const VALUE_NAME_ASCII: u16 = 0x0001;

impl ValueKey {
    /// Parses a value key from cell data starting at the `vk` signature.
    pub fn parse(data: &[u8], offset: u32) -> Result<Self> {
        if data.len() < VALUE_KEY_MIN_SIZE {
            return Err(RegistryError::truncated(offset, VALUE_KEY_MIN_SIZE, data.len()));
        }
        if &data[0..2] != b"vk" {
            return Err(RegistryError::InvalidFormat(format!(
                "Expected 'vk' signature at offset {:#x}",
                offset
            )));
        }

        let name_length = read_u16_le(data, 0x02)? as usize;
        let raw_length = read_u32_le(data, 0x04)?;
        let data_offset = read_u32_le(data, 0x08)?;
        let data_type = ValueType::from_u32(read_u32_le(data, 0x0C)?);
        let flags = read_u16_le(data, 0x10)?;

        let name = if name_length == 0 {
            DEFAULT_VALUE_NAME.to_string()
        } else {
            let raw = data
                .get(VALUE_KEY_MIN_SIZE..VALUE_KEY_MIN_SIZE + name_length)
                .ok_or_else(|| {
                    RegistryError::truncated(offset, VALUE_KEY_MIN_SIZE + name_length, data.len())
                })?;
            if flags & VALUE_NAME_ASCII != 0 {
                read_ascii_string(raw)
            } else {
                read_utf16_string(raw, offset)?
            }
        };

        Ok(ValueKey {
            name,
            data_length: raw_length & !DATA_INLINE_FLAG,
            data_offset,
            data_type,
            inline: raw_length & DATA_INLINE_FLAG != 0,
        })
    }

    /// Returns true if the data lives in the offset field itself.
    pub fn is_inline_data(&self) -> bool {
        self.inline
    }

    /// Returns inline data bytes (at most four).
    pub fn inline_data(&self) -> Vec<u8> {
        let len = self.data_length.min(4) as usize;
        self.data_offset.to_le_bytes()[..len].to_vec()
    }
}

/// Decoded registry value data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueData {
    /// No data.
    None,
    /// REG_SZ
    String(String),
    /// REG_EXPAND_SZ, unexpanded.
    ExpandString(String),
    /// REG_BINARY
    Binary(Vec<u8>),
    /// REG_DWORD
    Dword(u32),
    /// REG_DWORD_BIG_ENDIAN
    DwordBigEndian(u32),
    /// REG_MULTI_SZ
    MultiString(Vec<String>),
    /// REG_QWORD
    Qword(u64),
    /// Other types, and integers too short for their type.
    Unknown(Vec<u8>),
}

impl ValueData {
    /// Decodes raw value bytes according to `value_type`.
    ///
    /// Never fails: strings are decoded lossily and integer data that is too
    /// short is kept as `Unknown` bytes, so a single malformed attribute does
    /// not abort a search.
    pub fn decode(data: &[u8], value_type: ValueType) -> Self {
        match value_type {
            ValueType::None => ValueData::None,
            _ if data.is_empty() && value_type != ValueType::String => ValueData::None,
            ValueType::String => ValueData::String(read_utf16_lossy(data)),
            ValueType::ExpandString => ValueData::ExpandString(read_utf16_lossy(data)),
            ValueType::Link => ValueData::String(read_utf16_lossy(data)),
            ValueType::Binary => ValueData::Binary(data.to_vec()),
            ValueType::Dword if data.len() >= 4 => ValueData::Dword(LittleEndian::read_u32(data)),
            ValueType::DwordBigEndian if data.len() >= 4 => {
                ValueData::DwordBigEndian(BigEndian::read_u32(data))
            }
            ValueType::Qword if data.len() >= 8 => ValueData::Qword(LittleEndian::read_u64(data)),
            ValueType::MultiString => ValueData::MultiString(
                read_utf16_lossy(data)
                    .split('\0')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            _ => ValueData::Unknown(data.to_vec()),
        }
    }

    /// Returns the string payload of `String` and `ExpandString` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ValueData::String(s) | ValueData::ExpandString(s) => Some(s),
            _ => None,
        }
    }

    /// Text used when comparing or printing the value.
    ///
    /// Strings come back borrowed; every other variant is rendered through
    /// `Display`.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        match self.as_str() {
            Some(s) => std::borrow::Cow::Borrowed(s),
            None => std::borrow::Cow::Owned(self.to_string()),
        }
    }
}

impl fmt::Display for ValueData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueData::None => Ok(()),
            ValueData::String(s) | ValueData::ExpandString(s) => f.write_str(s),
            ValueData::Dword(d) | ValueData::DwordBigEndian(d) => write!(f, "{}", d),
            ValueData::Qword(q) => write!(f, "{}", q),
            ValueData::MultiString(strings) => f.write_str(&strings.join(", ")),
            ValueData::Binary(b) | ValueData::Unknown(b) => f.write_str(&hex::encode(b)),
        }
    }
}

impl From<&str> for ValueData {
    fn from(s: &str) -> Self {
        ValueData::String(s.to_string())
    }
}

impl From<String> for ValueData {
    fn from(s: String) -> Self {
        ValueData::String(s)
    }
}

impl From<u32> for ValueData {
    fn from(d: u32) -> Self {
        ValueData::Dword(d)
    }
}

impl From<u64> for ValueData {
    fn from(q: u64) -> Self {
        ValueData::Qword(q)
    }
}

impl Serialize for ValueData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ValueData::None => serializer.serialize_none(),
            ValueData::String(s) | ValueData::ExpandString(s) => serializer.serialize_str(s),
            ValueData::Dword(d) | ValueData::DwordBigEndian(d) => serializer.serialize_u32(*d),
            ValueData::Qword(q) => serializer.serialize_u64(*q),
            ValueData::MultiString(strings) => strings.serialize(serializer),
            ValueData::Binary(b) | ValueData::Unknown(b) => serializer.serialize_str(&hex::encode(b)),
        }
    }
}
