//! Backup engine: stream the device's channel memory into a container.

use std::io::{self, Seek, Write};

use log::info;

use crate::container::{
    ContainerError, ContainerWriter, SectionDescriptor, SectionKind, DEFAULT_COMMENT,
    SECTION_COUNT,
};
use crate::device::{DeviceError, DeviceSession, MemoryRegion};
use crate::serial::Transport;

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("Could not create output file: {0}")]
    CreateOutput(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, BackupError>;

#[derive(Debug, Clone, Copy, Default)]
pub struct BackupOptions {
    /// Accept whatever firmware the device reports.
    pub skip_version_check: bool,
}

/// What a completed backup transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupReport {
    pub pages_read: usize,
    pub bytes_written: u64,
    pub checksum: u32,
}

/// Read `region` off the device page by page and write it as a container
/// to the sink `open_sink` produces.
///
/// The sink is not created until the firmware gate and the
/// identification handshake have both passed, so a wrong or silent
/// device never leaves a truncated file behind. `progress` is called
/// with (current page, page total) before each page transfer. Any page
/// failure aborts the run; there is no retry and no resumption.
pub async fn run<T, W, S, P>(
    session: &mut DeviceSession<T>,
    region: MemoryRegion,
    open_sink: S,
    options: &BackupOptions,
    mut progress: P,
) -> Result<BackupReport>
where
    T: Transport,
    W: Write + Seek,
    S: FnOnce() -> io::Result<W>,
    P: FnMut(usize, usize),
{
    if !options.skip_version_check {
        session.verify_firmware().await?;
    }
    session.identify().await?;

    let sink = open_sink().map_err(BackupError::CreateOutput)?;

    let mut sections = [None; SECTION_COUNT];
    sections[0] = Some(SectionDescriptor {
        start: region.start,
        size: region.byte_len() as u32,
        kind: SectionKind::ChannelMemory,
    });
    let mut writer = ContainerWriter::create(sink, DEFAULT_COMMENT, sections)?;

    let page_total = region.page_count();
    for (index, addr) in region.pages().enumerate() {
        progress(index + 1, page_total);
        let page = session.read_page(addr).await?;
        writer.append(&page)?;
    }

    let bytes_written = writer.bytes_written();
    let (_, checksum) = writer.finalize()?;

    info!(
        "Backup complete: {} pages, {} bytes, CRC32 {:08X}",
        page_total, bytes_written, checksum
    );

    Ok(BackupReport {
        pages_read: page_total,
        bytes_written,
        checksum,
    })
}
