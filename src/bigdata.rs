//! Big data block (db) header parsing.
//!
//! Values longer than 16344 bytes are split into segments. The `db` cell
//! holds the segment count and the offset of an array of segment offsets.

use crate::error::{RegistryError, Result};
use crate::utils::{read_u16_le, read_u32_le};

/// Largest value stored directly in a single data cell.
pub const MAX_DIRECT_DATA_SIZE: u32 = 16344;

/// Big data block header.
#[derive(Debug, Clone)]
pub struct BigDataBlock {
    /// Number of data segments.
    pub segment_count: u16,
    /// Cell offset of the segment offset array.
    pub segment_list_offset: u32,
}

impl BigDataBlock {
    /// Parses a `db` header from cell data.
    pub fn parse(data: &[u8], offset: u32) -> Result<Self> {
        if data.len() < 8 {
            return Err(RegistryError::truncated(offset, 8, data.len()));
        }
        if &data[0..2] != b"db" {
            return Err(RegistryError::InvalidFormat(format!(
                "Expected 'db' signature at offset {:#x}, found {:?}",
                offset,
                &data[0..2]
            )));
        }

        Ok(BigDataBlock {
            segment_count: read_u16_le(data, 0x02)?,
            segment_list_offset: read_u32_le(data, 0x04)?,
        })
    }
}
