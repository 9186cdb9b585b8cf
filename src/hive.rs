//! Offline registry hive reader backed by a memory map.

use crate::bigdata::{BigDataBlock, MAX_DIRECT_DATA_SIZE};
use crate::error::{RegistryError, Result};
use crate::header::{BaseBlock, BASE_BLOCK_SIZE};
use crate::key::KeyNode;
use crate::subkey_list::SubkeyList;
use crate::utils::{cell_offset_to_absolute, read_i32_le, read_u32_le, NO_OFFSET};
use crate::value::{ValueData, ValueKey};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Bound on `ri` nesting; real hives use a single level.
const MAX_INDEX_DEPTH: usize = 8;

/// A read-only registry hive.
///
/// Keys borrow from the hive, so a hive outlives every key and value read
/// from it.
pub struct Hive {
    data: HiveData,
    base_block: BaseBlock,
}

enum HiveData {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl HiveData {
    fn as_slice(&self) -> &[u8] {
        match self {
            HiveData::Mapped(mmap) => mmap,
            HiveData::Owned(data) => data,
        }
    }
}

impl Hive {
    /// Opens and memory-maps a hive file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its base block is not
    /// a valid `regf` header.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use reg_appsearch::Hive;
    ///
    /// let hive = Hive::open("SOFTWARE").unwrap();
    /// let root = hive.root_key().unwrap();
    /// println!("{} subkeys", root.subkeys().unwrap().len());
    /// ```
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        let file_size = file.metadata()?.len() as usize;
        if file_size < BASE_BLOCK_SIZE {
            return Err(RegistryError::HiveTooSmall {
                size: file_size,
                minimum: BASE_BLOCK_SIZE,
            });
        }

        // SAFETY: the file is opened read-only, its size was checked above,
        // and every access into the map goes through bounds-checked slicing.
        let mmap = unsafe { Mmap::map(&file)? };
        debug!(size = mmap.len(), "Memory mapped hive file");

        Self::from_data(HiveData::Mapped(mmap))
    }

    /// Builds a hive from bytes already in memory.
    pub fn from_vec(data: Vec<u8>) -> Result<Self> {
        Self::from_data(HiveData::Owned(data))
    }

    fn from_data(data: HiveData) -> Result<Self> {
        let base_block = BaseBlock::parse(data.as_slice())?;
        info!(
            version = %format!("{}.{}", base_block.major_version, base_block.minor_version),
            last_written = ?base_block.last_written_datetime(),
            "Loaded registry hive"
        );
        if !base_block.is_consistent() {
            warn!(
                primary = base_block.primary_sequence,
                secondary = base_block.secondary_sequence,
                "Hive was not cleanly written; recent changes may be missing"
            );
        }
        Ok(Self { data, base_block })
    }

    /// Returns the parsed base block.
    pub fn base_block(&self) -> &BaseBlock {
        &self.base_block
    }

    /// Returns the root key.
    pub fn root_key(&self) -> Result<HiveKey<'_>> {
        self.key_at(self.base_block.root_cell_offset)
    }

    fn key_at(&self, offset: u32) -> Result<HiveKey<'_>> {
        let node = KeyNode::parse(self.read_cell(offset)?, offset)?;
        Ok(HiveKey {
            hive: self,
            offset,
            node,
        })
    }

    /// Returns the payload of the cell at `offset`, without its size field.
    fn read_cell(&self, offset: u32) -> Result<&[u8]> {
        let data = self.data.as_slice();
        let start = cell_offset_to_absolute(offset)? as usize;
        if start + 4 > data.len() {
            return Err(RegistryError::invalid_offset(offset, data.len()));
        }

        let size = read_i32_le(data, start)?;
        let len = size.unsigned_abs() as usize;
        if len < 4 {
            return Err(RegistryError::InvalidCellSize { size, offset });
        }
        data.get(start + 4..start + len)
            .ok_or_else(|| RegistryError::truncated(offset, len, data.len() - start))
    }

    fn read_value_data(&self, value: &ValueKey) -> Result<Vec<u8>> {
        if value.is_inline_data() {
            return Ok(value.inline_data());
        }
        if value.data_length == 0 || value.data_offset == NO_OFFSET {
            return Ok(Vec::new());
        }

        let length = value.data_length as usize;
        let mut data = if value.data_length > MAX_DIRECT_DATA_SIZE && self.base_block.minor_version >= 4 {
            self.read_big_data(value.data_offset, length)?
        } else {
            self.read_cell(value.data_offset)?.to_vec()
        };
        if data.len() < length {
            return Err(RegistryError::truncated(value.data_offset, length, data.len()));
        }
        data.truncate(length);
        Ok(data)
    }

    fn read_big_data(&self, offset: u32, length: usize) -> Result<Vec<u8>> {
        let header = BigDataBlock::parse(self.read_cell(offset)?, offset)?;
        let list = self.read_cell(header.segment_list_offset)?;
        debug!(offset = %format!("{:#x}", offset), segments = header.segment_count, "Reading big data value");

        let mut data = Vec::with_capacity(length);
        for i in 0..header.segment_count as usize {
            if data.len() >= length {
                break;
            }
            let segment = read_u32_le(list, i * 4)?;
            let chunk = self.read_cell(segment)?;
            // Each segment cell holds at most MAX_DIRECT_DATA_SIZE bytes of
            // payload; anything beyond is cell padding.
            let take = chunk.len().min(MAX_DIRECT_DATA_SIZE as usize);
            data.extend_from_slice(&chunk[..take]);
        }
        Ok(data)
    }
}

/// A key inside a [`Hive`].
#[derive(Clone)]
pub struct HiveKey<'a> {
    hive: &'a Hive,
    /// Cell offset of this key, relative to the first hbin.
    pub offset: u32,
    node: KeyNode,
}

impl<'a> HiveKey<'a> {
    /// Returns the key name.
    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Returns the parsed key node.
    pub fn node(&self) -> &KeyNode {
        &self.node
    }

    /// Returns the subkeys in stored order.
    pub fn subkeys(&self) -> Result<Vec<HiveKey<'a>>> {
        let mut offsets = Vec::new();
        if self.node.has_subkeys() {
            self.collect_subkey_offsets(self.node.subkey_list_offset, &mut offsets, 0)?;
        }
        offsets.into_iter().map(|offset| self.hive.key_at(offset)).collect()
    }

    fn collect_subkey_offsets(&self, list_offset: u32, out: &mut Vec<u32>, depth: usize) -> Result<()> {
        if depth > MAX_INDEX_DEPTH {
            return Err(RegistryError::InvalidFormat(format!(
                "Subkey index nested too deeply at offset {:#x}",
                list_offset
            )));
        }

        let list = SubkeyList::parse(self.hive.read_cell(list_offset)?, list_offset)?;
        if list.is_index_root() {
            for &sublist in list.offsets() {
                self.collect_subkey_offsets(sublist, out, depth + 1)?;
            }
        } else {
            out.extend_from_slice(list.offsets());
        }
        Ok(())
    }

    /// Finds a direct subkey by name, ignoring ASCII case.
    pub fn subkey(&self, name: &str) -> Result<Option<HiveKey<'a>>> {
        Ok(self
            .subkeys()?
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(name)))
    }

    /// Returns the values in stored order.
    pub fn values(&self) -> Result<Vec<HiveValue<'a>>> {
        if !self.node.has_values() {
            return Ok(Vec::new());
        }

        let list_offset = self.node.value_list_offset;
        let list = self.hive.read_cell(list_offset)?;
        let count = self.node.value_count as usize;
        if list.len() < count * 4 {
            return Err(RegistryError::truncated(list_offset, count * 4, list.len()));
        }

        (0..count)
            .map(|i| {
                let offset = read_u32_le(list, i * 4)?;
                let key = ValueKey::parse(self.hive.read_cell(offset)?, offset)?;
                Ok(HiveValue { hive: self.hive, key })
            })
            .collect()
    }
}

/// A value inside a [`Hive`].
pub struct HiveValue<'a> {
    hive: &'a Hive,
    key: ValueKey,
}

impl HiveValue<'_> {
    /// Returns the value name.
    pub fn name(&self) -> &str {
        &self.key.name
    }

    /// Returns the value type.
    pub fn data_type(&self) -> crate::value::ValueType {
        self.key.data_type
    }

    /// Returns the raw data bytes.
    pub fn raw_data(&self) -> Result<Vec<u8>> {
        self.hive.read_value_data(&self.key)
    }

    /// Returns the decoded data.
    pub fn data(&self) -> Result<ValueData> {
        Ok(ValueData::decode(&self.raw_data()?, self.key.data_type))
    }
}
