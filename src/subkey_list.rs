//! Subkey list parsing (lf, lh, li, ri).
//!
//! Leaf lists point at key nodes. An index root (`ri`) points at further
//! leaf lists and is how large keys such as `Uninstall` on a busy machine
//! are usually stored.

use crate::error::{RegistryError, Result};
use crate::utils::read_u32_le;

/// Parsed subkey list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubkeyList {
    /// `li`, `lf` or `lh`: offsets of key nodes, in stored order.
    Leaf(Vec<u32>),
    /// `ri`: offsets of further subkey lists.
    IndexRoot(Vec<u32>),
}

impl SubkeyList {
    /// Parses a subkey list from cell data.
    pub fn parse(data: &[u8], offset: u32) -> Result<Self> {
        if data.len() < 4 {
            return Err(RegistryError::truncated(offset, 4, data.len()));
        }

        let count = u16::from_le_bytes([data[2], data[3]]) as usize;
        // lf/lh entries carry a 4-byte name hint after each offset.
        let stride = match &data[0..2] {
            b"li" | b"ri" => 4,
            b"lf" | b"lh" => 8,
            _ => {
                return Err(RegistryError::InvalidSubkeyList {
                    list_type: [data[0], data[1]],
                })
            }
        };

        let needed = 4 + count * stride;
        if data.len() < needed {
            return Err(RegistryError::truncated(offset, needed, data.len()));
        }

        let offsets = (0..count)
            .map(|i| read_u32_le(data, 4 + i * stride))
            .collect::<Result<Vec<_>>>()?;

        Ok(if &data[0..2] == b"ri" {
            SubkeyList::IndexRoot(offsets)
        } else {
            SubkeyList::Leaf(offsets)
        })
    }

    /// Returns true if this is an index root (contains sublists).
    pub fn is_index_root(&self) -> bool {
        matches!(self, SubkeyList::IndexRoot(_))
    }

    /// Offsets held by this list, whether of keys or of sublists.
    pub fn offsets(&self) -> &[u32] {
        match self {
            SubkeyList::Leaf(offsets) | SubkeyList::IndexRoot(offsets) => offsets,
        }
    }
}
