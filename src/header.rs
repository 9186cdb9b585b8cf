//! Registry hive base block (header) parsing.
//!
//! The base block is the first 4096 bytes of a hive file. Only the fields the
//! reader needs are decoded: signature, sequence numbers, timestamp, version
//! and the root cell offset, with the XOR checksum verified.

use crate::error::{RegistryError, Result};
use crate::utils::{calculate_checksum, filetime_to_datetime, read_u32_le, read_u64_le};

/// Size of the base block in bytes.
pub const BASE_BLOCK_SIZE: usize = 4096;

/// Expected signature for a valid registry hive.
pub const REGF_SIGNATURE: &[u8; 4] = b"regf";

/// Offset of the checksum field in the base block.
pub const CHECKSUM_OFFSET: usize = 0x1FC;

/// Registry hive base block header.
#[derive(Debug, Clone)]
pub struct BaseBlock {
    /// Primary sequence number.
    pub primary_sequence: u32,
    /// Secondary sequence number.
    pub secondary_sequence: u32,
    /// Last written timestamp (Windows FILETIME).
    pub last_written: u64,
    /// Major format version (always 1).
    pub major_version: u32,
    /// Minor format version (3 to 6).
    pub minor_version: u32,
    /// Offset of the root key cell, relative to the first hbin.
    pub root_cell_offset: u32,
    /// Length of the hive bins data in bytes.
    pub hive_length: u32,
}

impl BaseBlock {
    /// Parses and validates a base block.
    ///
    /// # Errors
    ///
    /// Fails when the data is shorter than a base block, the signature is not
    /// `regf`, the checksum does not match, or the version is outside 1.3-1.6.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < BASE_BLOCK_SIZE {
            return Err(RegistryError::HiveTooSmall {
                size: data.len(),
                minimum: BASE_BLOCK_SIZE,
            });
        }
        if &data[0..4] != REGF_SIGNATURE {
            return Err(RegistryError::invalid_signature(REGF_SIGNATURE, &data[0..4]));
        }

        let stored = read_u32_le(data, CHECKSUM_OFFSET)?;
        let calculated = calculate_checksum(data);
        if stored != calculated {
            return Err(RegistryError::ChecksumMismatch {
                expected: stored,
                calculated,
            });
        }

        let major_version = read_u32_le(data, 0x14)?;
        let minor_version = read_u32_le(data, 0x18)?;
        if major_version != 1 || !(3..=6).contains(&minor_version) {
            return Err(RegistryError::UnsupportedVersion {
                major: major_version,
                minor: minor_version,
            });
        }

        Ok(BaseBlock {
            primary_sequence: read_u32_le(data, 0x04)?,
            secondary_sequence: read_u32_le(data, 0x08)?,
            last_written: read_u64_le(data, 0x0C)?,
            major_version,
            minor_version,
            root_cell_offset: read_u32_le(data, 0x24)?,
            hive_length: read_u32_le(data, 0x28)?,
        })
    }

    /// Returns true if the hive was cleanly written (sequence numbers match).
    ///
    /// A dirty hive still parses, but recent changes may only exist in its
    /// transaction logs.
    pub fn is_consistent(&self) -> bool {
        self.primary_sequence == self.secondary_sequence
    }

    /// Last written timestamp as UTC.
    pub fn last_written_datetime(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        filetime_to_datetime(self.last_written)
    }
}
