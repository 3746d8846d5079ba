//! On-disk layout of the 256-byte container header.
//!
//! Three format generations share the magic and comment fields:
//!
//! | version | checksum at 0xFC        | section table at 0x50 |
//! |---------|-------------------------|-----------------------|
//! | 1       | absent (bytes undefined)| none                  |
//! | 2       | CRC-32 over payload     | none                  |
//! | 3       | CRC-32 over table+payload| 8 fixed 16-byte slots |
//!
//! Decoding accepts all three; encoding targets version 3 only.

use super::{ContainerError, Result};

pub const HEADER_LEN: usize = 256;
pub const MAGIC: [u8; 4] = *b"X100";

/// Oldest version the decoder accepts.
pub const MIN_VERSION: u8 = 1;
/// First version carrying a checksum at [`CHECKSUM_OFFSET`].
pub const CHECKSUMMED_VERSION: u8 = 2;
/// First version carrying a section table.
pub const SECTIONED_VERSION: u8 = 3;
/// Version written by the encoder.
pub const CURRENT_VERSION: u8 = 3;

pub const COMMENT_LEN: usize = 64;
pub const SECTION_COUNT: usize = 8;

const VERSION_OFFSET: usize = 0x04;
pub(super) const DATA_SIZE_OFFSET: usize = 0x05;
const COMMENT_OFFSET: usize = 0x09;
const SECTION_TABLE_OFFSET: usize = 0x50;
const SECTION_ENTRY_LEN: usize = 16;
const SECTION_TABLE_LEN: usize = SECTION_COUNT * SECTION_ENTRY_LEN;
pub(super) const CHECKSUM_OFFSET: usize = 0xFC;

/// A vacant section slot on disk.
const VACANT_ENTRY: [u8; SECTION_ENTRY_LEN] = [0xFF; SECTION_ENTRY_LEN];

/// Comment stamped into every backup this tool produces.
pub const DEFAULT_COMMENT: &str = "Alinco DJ-X100 **Unofficial** Memory Backup Data";

/// What a payload range holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Other,
    ChannelMemory,
}

impl SectionKind {
    fn from_byte(byte: u8) -> Self {
        match byte {
            1 => SectionKind::ChannelMemory,
            _ => SectionKind::Other,
        }
    }

    fn as_byte(self) -> u8 {
        match self {
            SectionKind::Other => 0,
            SectionKind::ChannelMemory => 1,
        }
    }
}

/// One entry of the version-3 section table: a device address range and
/// what it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionDescriptor {
    /// First device address covered by the section.
    pub start: u32,
    /// Section length in bytes.
    pub size: u32,
    pub kind: SectionKind,
}

impl SectionDescriptor {
    fn encode(&self) -> [u8; SECTION_ENTRY_LEN] {
        let mut raw = [0u8; SECTION_ENTRY_LEN];
        raw[0..4].copy_from_slice(&self.start.to_le_bytes());
        raw[4..8].copy_from_slice(&self.size.to_le_bytes());
        raw[8] = self.kind.as_byte();
        raw
    }

    /// Returns `None` for the vacant-slot sentinel (kind byte 0xFF).
    fn decode(raw: &[u8]) -> Option<Self> {
        if raw[8] == 0xFF {
            return None;
        }
        Some(Self {
            start: read_u32(raw, 0),
            size: read_u32(raw, 4),
            kind: SectionKind::from_byte(raw[8]),
        })
    }
}

/// Parsed header metadata, independent of the payload.
#[derive(Debug, Clone)]
pub struct Header {
    pub version: u8,
    /// Payload length in bytes as recorded on disk.
    pub data_size: u32,
    pub comment: String,
    /// Section table; all `None` for versions before 3.
    pub sections: [Option<SectionDescriptor>; SECTION_COUNT],
    /// Stored checksum field; undefined garbage for version 1.
    pub checksum: u32,
}

impl Header {
    /// Header for a fresh current-version container. Size and checksum
    /// start at zero and are patched once the payload has been streamed.
    pub fn new(comment: &str, sections: [Option<SectionDescriptor>; SECTION_COUNT]) -> Self {
        Self {
            version: CURRENT_VERSION,
            data_size: 0,
            comment: comment.to_string(),
            sections,
            checksum: 0,
        }
    }

    /// First section describing channel memory, if the table has one.
    pub fn channel_memory_section(&self) -> Option<&SectionDescriptor> {
        self.sections
            .iter()
            .flatten()
            .find(|s| s.kind == SectionKind::ChannelMemory)
    }

    pub fn encode(&self) -> Result<[u8; HEADER_LEN]> {
        let comment = self.comment.as_bytes();
        if comment.len() > COMMENT_LEN {
            return Err(ContainerError::CommentTooLong);
        }

        let mut raw = [0u8; HEADER_LEN];
        raw[..4].copy_from_slice(&MAGIC);
        raw[VERSION_OFFSET] = self.version;
        raw[DATA_SIZE_OFFSET..DATA_SIZE_OFFSET + 4].copy_from_slice(&self.data_size.to_le_bytes());
        raw[COMMENT_OFFSET..COMMENT_OFFSET + comment.len()].copy_from_slice(comment);

        if self.version >= SECTIONED_VERSION {
            let mut offset = SECTION_TABLE_OFFSET;
            for slot in &self.sections {
                let entry = match slot {
                    Some(section) => section.encode(),
                    None => VACANT_ENTRY,
                };
                raw[offset..offset + SECTION_ENTRY_LEN].copy_from_slice(&entry);
                offset += SECTION_ENTRY_LEN;
            }
        }

        raw[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].copy_from_slice(&self.checksum.to_le_bytes());
        Ok(raw)
    }

    pub fn decode(raw: &[u8; HEADER_LEN]) -> Result<Self> {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&raw[..4]);
        if magic != MAGIC {
            return Err(ContainerError::BadMagic(magic));
        }

        let version = raw[VERSION_OFFSET];
        if !(MIN_VERSION..=CURRENT_VERSION).contains(&version) {
            return Err(ContainerError::UnsupportedVersion(version));
        }

        let field = &raw[COMMENT_OFFSET..COMMENT_OFFSET + COMMENT_LEN];
        let end = field.iter().position(|&b| b == 0).unwrap_or(COMMENT_LEN);
        let comment = String::from_utf8_lossy(&field[..end]).into_owned();

        let mut sections = [None; SECTION_COUNT];
        if version >= SECTIONED_VERSION {
            for (i, slot) in sections.iter_mut().enumerate() {
                let offset = SECTION_TABLE_OFFSET + i * SECTION_ENTRY_LEN;
                *slot = SectionDescriptor::decode(&raw[offset..offset + SECTION_ENTRY_LEN]);
            }
        }

        Ok(Self {
            version,
            data_size: read_u32(raw, DATA_SIZE_OFFSET),
            comment,
            sections,
            checksum: read_u32(raw, CHECKSUM_OFFSET),
        })
    }
}

/// The raw section table bytes, the leading region of a version-3
/// checksum.
pub(super) fn section_table_bytes(raw: &[u8; HEADER_LEN]) -> &[u8] {
    &raw[SECTION_TABLE_OFFSET..SECTION_TABLE_OFFSET + SECTION_TABLE_LEN]
}

fn read_u32(raw: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([raw[offset], raw[offset + 1], raw[offset + 2], raw[offset + 3]])
}
