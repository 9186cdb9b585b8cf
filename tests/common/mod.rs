//! Shared fixtures: an in-memory uninstall tree and a writer for small
//! synthetic hive files with the same layout.

#![allow(dead_code)]

use reg_appsearch::{MemoryStore, ValueData, UNINSTALL_SUBTREE, WOW64_UNINSTALL_SUBTREE};
use std::io::Write;

const NO_OFFSET: u32 = 0xFFFF_FFFF;
const SEGMENT_SIZE: usize = 16344;

/// `SOFTWARE\...\Uninstall\<name>`
pub fn uninstall_path(name: &str) -> String {
    format!(r"{}\{}", UNINSTALL_SUBTREE, name)
}

/// `SOFTWARE\WOW6432Node\...\Uninstall\<name>`
pub fn wow64_path(name: &str) -> String {
    format!(r"{}\{}", WOW64_UNINSTALL_SUBTREE, name)
}

/// Two applications under the native uninstall key.
pub fn notepad_vlc_store() -> MemoryStore {
    MemoryStore::new()
        .with_key(
            &uninstall_path("A"),
            [("DisplayName", "Notepad++"), ("Version", "8.0")],
        )
        .with_key(
            &uninstall_path("B"),
            [("DisplayName", "VLC media player"), ("Version", "3.0")],
        )
}

/// A key to be written into a synthetic hive.
#[derive(Debug, Clone)]
pub struct TestKey {
    pub name: String,
    pub values: Vec<(String, ValueData)>,
    pub children: Vec<TestKey>,
}

impl TestKey {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            values: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn value(mut self, name: &str, value: impl Into<ValueData>) -> Self {
        self.values.push((name.to_string(), value.into()));
        self
    }

    pub fn child(mut self, child: TestKey) -> Self {
        self.children.push(child);
        self
    }

    /// Wraps `self` in a chain of parent keys, outermost first.
    pub fn nested_in(self, parents: &[&str]) -> Self {
        parents
            .iter()
            .rev()
            .fold(self, |inner, name| TestKey::new(name).child(inner))
    }
}

/// `Microsoft\Windows\CurrentVersion\Uninstall` under a hive root, holding
/// the same two applications as [`notepad_vlc_store`].
pub fn software_hive_root() -> TestKey {
    let uninstall = TestKey::new("Uninstall")
        .child(
            TestKey::new("A")
                .value("DisplayName", "Notepad++")
                .value("Version", "8.0"),
        )
        .child(
            TestKey::new("B")
                .value("DisplayName", "VLC media player")
                .value("Version", "3.0"),
        );
    TestKey::new("ROOT").child(uninstall.nested_in(&["Microsoft", "Windows", "CurrentVersion"]))
}

/// Layout choices for [`HiveWriter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Layout {
    /// Split subkey lists larger than this into `lf` leaves under an `ri`.
    pub index_root_after: Option<usize>,
}

/// Serializes [`TestKey`] trees into `regf` bytes.
pub struct HiveWriter {
    bins: Vec<u8>,
    layout: Layout,
}

impl HiveWriter {
    pub fn new(layout: Layout) -> Self {
        let mut bins = vec![0u8; 0x20];
        bins[0..4].copy_from_slice(b"hbin");
        Self { bins, layout }
    }

    /// Builds a complete hive image with `root` as its root key.
    pub fn build(root: &TestKey, layout: Layout) -> Vec<u8> {
        let mut writer = Self::new(layout);
        let root_offset = writer.write_key(root, true);
        writer.finish(root_offset)
    }

    fn alloc(&mut self, payload: &[u8]) -> u32 {
        let offset = self.bins.len();
        let size = (payload.len() + 4 + 7) & !7;
        self.bins.extend_from_slice(&(-(size as i32)).to_le_bytes());
        self.bins.extend_from_slice(payload);
        self.bins.resize(offset + size, 0);
        offset as u32
    }

    fn write_data(&mut self, data: &[u8]) -> u32 {
        if data.len() <= SEGMENT_SIZE {
            return self.alloc(data);
        }
        let segments: Vec<u32> = data
            .chunks(SEGMENT_SIZE)
            .map(|chunk| self.alloc(chunk))
            .collect();
        let list: Vec<u8> = segments.iter().flat_map(|o| o.to_le_bytes()).collect();
        let list_offset = self.alloc(&list);

        let mut db = b"db".to_vec();
        db.extend_from_slice(&(segments.len() as u16).to_le_bytes());
        db.extend_from_slice(&list_offset.to_le_bytes());
        self.alloc(&db)
    }

    fn write_value(&mut self, name: &str, value: &ValueData) -> u32 {
        let (type_code, bytes) = encode(value);
        let (length_field, data_field) = if bytes.len() <= 4 && matches!(value, ValueData::Dword(_) | ValueData::Binary(_)) {
            let mut inline = [0u8; 4];
            inline[..bytes.len()].copy_from_slice(&bytes);
            (0x8000_0000 | bytes.len() as u32, u32::from_le_bytes(inline))
        } else if bytes.is_empty() {
            (0, NO_OFFSET)
        } else {
            (bytes.len() as u32, self.write_data(&bytes))
        };

        let mut vk = b"vk".to_vec();
        vk.extend_from_slice(&(name.len() as u16).to_le_bytes());
        vk.extend_from_slice(&length_field.to_le_bytes());
        vk.extend_from_slice(&data_field.to_le_bytes());
        vk.extend_from_slice(&type_code.to_le_bytes());
        vk.extend_from_slice(&1u16.to_le_bytes());
        vk.extend_from_slice(&0u16.to_le_bytes());
        vk.extend_from_slice(name.as_bytes());
        self.alloc(&vk)
    }

    fn write_leaf(&mut self, children: &[(u32, &str)]) -> u32 {
        let mut lf = b"lf".to_vec();
        lf.extend_from_slice(&(children.len() as u16).to_le_bytes());
        for (offset, name) in children {
            lf.extend_from_slice(&offset.to_le_bytes());
            let mut hint = [0u8; 4];
            for (slot, byte) in hint.iter_mut().zip(name.bytes()) {
                *slot = byte;
            }
            lf.extend_from_slice(&hint);
        }
        self.alloc(&lf)
    }

    fn write_subkey_list(&mut self, children: &[(u32, &str)]) -> u32 {
        match self.layout.index_root_after {
            Some(limit) if children.len() > limit => {
                let leaves: Vec<u32> = children
                    .chunks(limit)
                    .map(|chunk| self.write_leaf(chunk))
                    .collect();
                let mut ri = b"ri".to_vec();
                ri.extend_from_slice(&(leaves.len() as u16).to_le_bytes());
                for leaf in leaves {
                    ri.extend_from_slice(&leaf.to_le_bytes());
                }
                self.alloc(&ri)
            }
            _ => self.write_leaf(children),
        }
    }

    fn write_key(&mut self, key: &TestKey, is_root: bool) -> u32 {
        let children: Vec<(u32, &str)> = key
            .children
            .iter()
            .map(|child| (self.write_key(child, false), child.name.as_str()))
            .collect();
        let subkey_list = if children.is_empty() {
            NO_OFFSET
        } else {
            self.write_subkey_list(&children)
        };

        let value_offsets: Vec<u32> = key
            .values
            .iter()
            .map(|(name, value)| self.write_value(name, value))
            .collect();
        let value_list = if value_offsets.is_empty() {
            NO_OFFSET
        } else {
            let list: Vec<u8> = value_offsets.iter().flat_map(|o| o.to_le_bytes()).collect();
            self.alloc(&list)
        };

        let flags: u16 = 0x0020 | if is_root { 0x0004 } else { 0 };
        let mut nk = vec![0u8; 0x4C];
        nk[0..2].copy_from_slice(b"nk");
        nk[0x02..0x04].copy_from_slice(&flags.to_le_bytes());
        nk[0x04..0x0C].copy_from_slice(&132_000_000_000_000_000u64.to_le_bytes());
        nk[0x14..0x18].copy_from_slice(&(children.len() as u32).to_le_bytes());
        nk[0x1C..0x20].copy_from_slice(&subkey_list.to_le_bytes());
        nk[0x20..0x24].copy_from_slice(&NO_OFFSET.to_le_bytes());
        nk[0x24..0x28].copy_from_slice(&(value_offsets.len() as u32).to_le_bytes());
        nk[0x28..0x2C].copy_from_slice(&value_list.to_le_bytes());
        nk[0x2C..0x30].copy_from_slice(&NO_OFFSET.to_le_bytes());
        nk[0x30..0x34].copy_from_slice(&NO_OFFSET.to_le_bytes());
        nk[0x48..0x4A].copy_from_slice(&(key.name.len() as u16).to_le_bytes());
        nk.extend_from_slice(key.name.as_bytes());
        self.alloc(&nk)
    }

    fn finish(mut self, root_offset: u32) -> Vec<u8> {
        let bins_size = (self.bins.len() + 0xFFF) & !0xFFF;
        self.bins.resize(bins_size, 0);
        self.bins[8..12].copy_from_slice(&(bins_size as u32).to_le_bytes());

        let mut base = vec![0u8; 0x1000];
        base[0..4].copy_from_slice(b"regf");
        base[0x04..0x08].copy_from_slice(&1u32.to_le_bytes());
        base[0x08..0x0C].copy_from_slice(&1u32.to_le_bytes());
        base[0x0C..0x14].copy_from_slice(&132_000_000_000_000_000u64.to_le_bytes());
        base[0x14..0x18].copy_from_slice(&1u32.to_le_bytes());
        base[0x18..0x1C].copy_from_slice(&5u32.to_le_bytes());
        base[0x20..0x24].copy_from_slice(&1u32.to_le_bytes());
        base[0x24..0x28].copy_from_slice(&root_offset.to_le_bytes());
        base[0x28..0x2C].copy_from_slice(&(bins_size as u32).to_le_bytes());
        base[0x2C..0x30].copy_from_slice(&1u32.to_le_bytes());
        let checksum = base[..0x1FC]
            .chunks_exact(4)
            .fold(0u32, |acc, dword| acc ^ u32::from_le_bytes([dword[0], dword[1], dword[2], dword[3]]));
        base[0x1FC..0x200].copy_from_slice(&checksum.to_le_bytes());

        base.extend_from_slice(&self.bins);
        base
    }
}

fn utf16z(s: &str) -> Vec<u8> {
    s.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .collect()
}

fn encode(value: &ValueData) -> (u32, Vec<u8>) {
    match value {
        ValueData::None => (0, Vec::new()),
        ValueData::String(s) => (1, utf16z(s)),
        ValueData::ExpandString(s) => (2, utf16z(s)),
        ValueData::Binary(b) => (3, b.clone()),
        ValueData::Dword(d) => (4, d.to_le_bytes().to_vec()),
        ValueData::DwordBigEndian(d) => (5, d.to_be_bytes().to_vec()),
        ValueData::MultiString(strings) => {
            let mut bytes: Vec<u8> = strings.iter().flat_map(|s| utf16z(s)).collect();
            bytes.extend_from_slice(&[0, 0]);
            (7, bytes)
        }
        ValueData::Qword(q) => (11, q.to_le_bytes().to_vec()),
        ValueData::Unknown(b) => (0x2A, b.clone()),
    }
}

/// Writes `bytes` to a fresh temp file and returns its handle.
pub fn write_temp_hive(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp hive");
    file.write_all(bytes).expect("write temp hive");
    file.flush().expect("flush temp hive");
    file
}

