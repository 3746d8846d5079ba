use std::io::{Seek, SeekFrom, Write};

use crc32fast::Hasher;

use super::header::{
    section_table_bytes, Header, SectionDescriptor, CHECKSUM_OFFSET, DATA_SIZE_OFFSET,
    SECTION_COUNT,
};
use super::{ContainerError, Result};

/// Streams a current-version container to a seekable sink.
///
/// The header goes out first with zeroed size and checksum fields; pages
/// are appended while a running CRC-32 accumulates, and
/// [`finalize`](Self::finalize) seeks back to patch both fields. The
/// payload is never buffered in memory, and an interrupted run leaves a
/// file whose size field still reads zero, which no decoder accepts.
pub struct ContainerWriter<W: Write + Seek> {
    sink: W,
    hasher: Hasher,
    bytes_written: u64,
}

impl<W: Write + Seek> ContainerWriter<W> {
    /// Write the provisional header and seed the checksum from the
    /// section table.
    pub fn create(
        mut sink: W,
        comment: &str,
        sections: [Option<SectionDescriptor>; SECTION_COUNT],
    ) -> Result<Self> {
        let header = Header::new(comment, sections);
        let raw = header.encode()?;
        sink.write_all(&raw)?;

        let mut hasher = Hasher::new();
        hasher.update(section_table_bytes(&raw));

        Ok(Self {
            sink,
            hasher,
            bytes_written: 0,
        })
    }

    /// Append payload bytes and fold them into the running checksum.
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        self.sink.write_all(data)?;
        self.hasher.update(data);
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    /// Payload bytes appended so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Patch the size and checksum fields, flush, and hand the sink back
    /// together with the final checksum.
    pub fn finalize(self) -> Result<(W, u32)> {
        let Self {
            mut sink,
            hasher,
            bytes_written,
        } = self;
        let data_size = u32::try_from(bytes_written)
            .map_err(|_| ContainerError::PayloadTooLarge(bytes_written))?;
        let checksum = hasher.finalize();

        sink.seek(SeekFrom::Start(DATA_SIZE_OFFSET as u64))?;
        sink.write_all(&data_size.to_le_bytes())?;
        sink.seek(SeekFrom::Start(CHECKSUM_OFFSET as u64))?;
        sink.write_all(&checksum.to_le_bytes())?;
        sink.flush()?;

        Ok((sink, checksum))
    }
}
