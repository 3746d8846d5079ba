use std::io::{self, Read, Seek, SeekFrom};

use crc32fast::Hasher;
use log::warn;

use super::header::{
    section_table_bytes, Header, CHECKSUMMED_VERSION, HEADER_LEN, SECTIONED_VERSION,
};
use super::{ContainerError, Result};

/// Decoded container with the payload still on disk.
///
/// [`open`](Self::open) validates everything up front; afterwards the
/// reader acts as a [`Read`] bounded to the payload, so callers can
/// stream it without holding the whole region twice.
pub struct ContainerReader<R: Read + Seek> {
    header: Header,
    source: R,
    remaining: u64,
}

impl<R: Read + Seek> ContainerReader<R> {
    /// Decode and validate the header, leaving the source positioned at
    /// the first payload byte.
    ///
    /// Validation order: magic, version, checksum (versions 2 and up,
    /// unless `verify_checksum` is off), then recorded size against the
    /// actual payload length. Version 1 predates the checksum field and
    /// is exempt whatever the bytes at its offset hold.
    pub fn open(mut source: R, verify_checksum: bool) -> Result<Self> {
        source.seek(SeekFrom::Start(0))?;

        let mut raw = [0u8; HEADER_LEN];
        if let Err(e) = source.read_exact(&mut raw) {
            return Err(if e.kind() == io::ErrorKind::UnexpectedEof {
                ContainerError::TruncatedHeader
            } else {
                ContainerError::IoError(e)
            });
        }

        let header = Header::decode(&raw)?;

        if header.version < CHECKSUMMED_VERSION {
            warn!("Version 1 container has no checksum; integrity not verified");
        } else if verify_checksum {
            let mut hasher = Hasher::new();
            if header.version >= SECTIONED_VERSION {
                hasher.update(section_table_bytes(&raw));
            }
            let mut chunk = [0u8; 8192];
            loop {
                let n = source.read(&mut chunk)?;
                if n == 0 {
                    break;
                }
                hasher.update(&chunk[..n]);
            }
            let computed = hasher.finalize();
            if computed != header.checksum {
                return Err(ContainerError::ChecksumMismatch {
                    stored: header.checksum,
                    computed,
                });
            }
        }

        let file_len = source.seek(SeekFrom::End(0))?;
        let actual = file_len - HEADER_LEN as u64;
        if u64::from(header.data_size) != actual {
            return Err(ContainerError::SizeMismatch {
                header: u64::from(header.data_size),
                actual,
            });
        }

        source.seek(SeekFrom::Start(HEADER_LEN as u64))?;
        Ok(Self {
            header,
            source,
            remaining: actual,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Payload bytes not yet consumed.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Pull the rest of the payload into memory.
    pub fn read_payload(&mut self) -> Result<Vec<u8>> {
        let mut payload = Vec::with_capacity(self.remaining as usize);
        Read::read_to_end(self, &mut payload)?;
        Ok(payload)
    }
}

impl<R: Read + Seek> Read for ContainerReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Ok(0);
        }
        let cap = self.remaining.min(buf.len() as u64) as usize;
        let n = self.source.read(&mut buf[..cap])?;
        self.remaining -= n as u64;
        Ok(n)
    }
}
