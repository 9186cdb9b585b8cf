//! Little-endian field readers and string decoding shared by the hive parser
//! and the value decoder.

use crate::error::{RegistryError, Result};
use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::UTF_16LE;

/// Offset where hive bins start (after the base block).
pub const HBIN_START_OFFSET: u32 = 0x1000;

/// Sentinel for "no list" in key node and value key offset fields.
pub const NO_OFFSET: u32 = 0xFFFF_FFFF;

fn field<'a>(data: &'a [u8], offset: usize, len: usize) -> Result<&'a [u8]> {
    data.get(offset..offset + len).ok_or_else(|| {
        RegistryError::truncated(offset as u32, len, data.len().saturating_sub(offset))
    })
}

/// Reads a u16 at `offset`.
pub fn read_u16_le(data: &[u8], offset: usize) -> Result<u16> {
    Ok(LittleEndian::read_u16(field(data, offset, 2)?))
}

/// Reads a u32 at `offset`.
pub fn read_u32_le(data: &[u8], offset: usize) -> Result<u32> {
    Ok(LittleEndian::read_u32(field(data, offset, 4)?))
}

/// Reads an i32 at `offset`.
pub fn read_i32_le(data: &[u8], offset: usize) -> Result<i32> {
    Ok(LittleEndian::read_i32(field(data, offset, 4)?))
}

/// Reads a u64 at `offset`.
pub fn read_u64_le(data: &[u8], offset: usize) -> Result<u64> {
    Ok(LittleEndian::read_u64(field(data, offset, 8)?))
}

/// Decodes a compressed (Latin-1) key or value name.
pub fn read_ascii_string(data: &[u8]) -> String {
    data.iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect()
}

/// Decodes a UTF-16LE name, failing on odd lengths or unpaired surrogates.
pub fn read_utf16_string(data: &[u8], offset: u32) -> Result<String> {
    if data.len() % 2 != 0 {
        return Err(RegistryError::InvalidUtf16 { offset });
    }
    let (decoded, had_errors) = UTF_16LE.decode_without_bom_handling(data);
    if had_errors {
        return Err(RegistryError::InvalidUtf16 { offset });
    }
    Ok(decoded.trim_end_matches('\0').to_string())
}

/// Decodes UTF-16LE value data, replacing bad code units.
///
/// Value data is written by arbitrary installers, so a broken string must not
/// stop a search. A trailing odd byte is ignored.
pub fn read_utf16_lossy(data: &[u8]) -> String {
    let even = &data[..data.len() - data.len() % 2];
    let (decoded, _) = UTF_16LE.decode_without_bom_handling(even);
    decoded.trim_end_matches('\0').to_string()
}

/// XOR of the first 127 dwords of the base block.
pub fn calculate_checksum(data: &[u8]) -> u32 {
    data[..0x1FC.min(data.len())]
        .chunks_exact(4)
        .fold(0u32, |acc, dword| acc ^ LittleEndian::read_u32(dword))
}

/// Converts a cell offset (relative to the first hbin) to a file offset.
#[inline]
pub fn cell_offset_to_absolute(cell_offset: u32) -> Result<u32> {
    cell_offset
        .checked_add(HBIN_START_OFFSET)
        .ok_or_else(|| RegistryError::invalid_offset(cell_offset, 0))
}

/// Converts a Windows FILETIME into a UTC timestamp.
pub fn filetime_to_datetime(filetime: u64) -> Option<chrono::DateTime<chrono::Utc>> {
    // 100ns ticks since 1601-01-01; the Unix epoch is 11644473600s later.
    const FILETIME_UNIX_DIFF: i64 = 11_644_473_600;

    let seconds = (filetime / 10_000_000) as i64 - FILETIME_UNIX_DIFF;
    let nanos = ((filetime % 10_000_000) * 100) as u32;
    chrono::DateTime::from_timestamp(seconds, nanos)
}
