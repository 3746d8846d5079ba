#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Cursor, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use djx100_memtool::serial::{Result, Transport};

pub const FIRMWARE: &str = "ver 1.00-003";

/// Scripted device double: answers from a queue and records every
/// command it is sent. An exhausted queue answers with silence, the way
/// an unplugged radio would.
pub struct MockTransport {
    responses: VecDeque<String>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A device that never answers.
    pub fn silent() -> Self {
        Self::new(Vec::<String>::new())
    }

    /// Handle on the command log that stays usable after the transport
    /// has moved into a session.
    pub fn sent_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.sent)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, command: &str) -> Result<String> {
        self.sent.lock().unwrap().push(command.to_string());
        Ok(self.responses.pop_front().unwrap_or_default())
    }
}

/// 512 uppercase hex characters: one page filled with `byte`.
pub fn hex_page(byte: u8) -> String {
    hex::encode_upper([byte; 256])
}

/// Seekable sink whose bytes stay reachable after an engine consumes it.
#[derive(Clone, Default)]
pub struct SharedSink(Arc<Mutex<Cursor<Vec<u8>>>>);

impl SharedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap().get_ref().clone()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

impl Seek for SharedSink {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.0.lock().unwrap().seek(pos)
    }
}

/// Hand-built container predating the section table: 256-byte header
/// with magic, version, size and comment, then the payload. `checksum`
/// lands at offset 0xFC when given.
pub fn build_legacy_container(version: u8, payload: &[u8], checksum: Option<u32>) -> Vec<u8> {
    let mut file = vec![0u8; 256];
    file[..4].copy_from_slice(b"X100");
    file[4] = version;
    file[5..9].copy_from_slice(&(payload.len() as u32).to_le_bytes());
    file[9..15].copy_from_slice(b"legacy");
    if let Some(crc) = checksum {
        file[0xFC..0x100].copy_from_slice(&crc.to_le_bytes());
    }
    file.extend_from_slice(payload);
    file
}
