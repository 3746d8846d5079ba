//! Restore engine: replay a container's payload onto the device.

use std::io::{Read, Seek};

use log::info;

use crate::confirm::Confirm;
use crate::container::{ContainerError, ContainerReader};
use crate::device::protocol::{CHANNEL_MEMORY_START, HALF_PAGE_SIZE, PAGE_SIZE};
use crate::device::{DeviceError, DeviceSession, MemoryRegion};
use crate::serial::{SerialError, Transport};

/// Shown before a restore that would touch addresses below the channel
/// memory boundary. The Japanese line comes first, then the English
/// question the operator answers.
pub const UNSAFE_REGION_PROMPT: &str = "警告: 重要なデータを含むメモリを上書きしようとしているため\
デバイスが壊れる可能性があります。この操作は元に戻せません。本当に続行しますか？\n\
Warning: You are about to overwrite memory that contains important data, \
which may potentially brick the device. This operation is irreversible. \
Are you sure you want to proceed? (y/N):";

#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("Serial communication error: {0}")]
    Serial(#[from] SerialError),

    #[error("Payload is {payload} bytes but the target region holds {expected}")]
    RegionMismatch { payload: usize, expected: usize },

    #[error("Aborted by operator")]
    Aborted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RestoreError>;

#[derive(Debug, Clone, Copy, Default)]
pub struct RestoreOptions {
    /// Accept whatever firmware the device reports.
    pub skip_version_check: bool,
    /// Restore even when the container checksum does not verify.
    pub skip_crc_check: bool,
    /// Write below the channel memory boundary without prompting.
    pub allow_unsafe_region: bool,
}

/// What a completed restore transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreReport {
    pub pages_processed: usize,
    /// Half-page writes actually issued; unchanged halves are skipped.
    pub subpages_written: usize,
}

/// Validate the container in `source` and write its payload into
/// `region`, then restart the device.
///
/// The session is not opened until the container has fully validated,
/// so a corrupt file causes no device I/O at all. The payload is
/// consumed page by page from the validated reader, never buffered
/// whole. Each page is read back from the device first and only the
/// 128-byte halves that differ are written.
/// `progress` is called with (current page, page total) after each page.
/// A rejected write aborts immediately with the failing address;
/// addresses already written stay written.
pub async fn run<R, T, S, C, P>(
    source: R,
    region: MemoryRegion,
    open_session: S,
    options: &RestoreOptions,
    confirm: &mut C,
    mut progress: P,
) -> Result<RestoreReport>
where
    R: Read + Seek,
    T: Transport,
    S: FnOnce() -> std::result::Result<DeviceSession<T>, SerialError>,
    C: Confirm,
    P: FnMut(usize, usize),
{
    let mut reader = ContainerReader::open(source, !options.skip_crc_check)?;

    let expected = region.byte_len();
    if reader.remaining() != expected as u64 {
        return Err(RestoreError::RegionMismatch {
            payload: reader.remaining() as usize,
            expected,
        });
    }

    if region.start < CHANNEL_MEMORY_START && !options.allow_unsafe_region {
        if !confirm.confirm(UNSAFE_REGION_PROMPT)? {
            return Err(RestoreError::Aborted);
        }
    }

    let mut session = open_session()?;
    if !options.skip_version_check {
        session.verify_firmware().await?;
    }
    session.identify().await?;

    let page_total = region.page_count();
    let mut subpages_written = 0;

    for (index, addr) in region.pages().enumerate() {
        let mut desired = [0u8; PAGE_SIZE];
        reader.read_exact(&mut desired)?;
        let current = session.read_page(addr).await?;

        for half in (0..PAGE_SIZE).step_by(HALF_PAGE_SIZE) {
            let wanted = &desired[half..half + HALF_PAGE_SIZE];
            if wanted != &current[half..half + HALF_PAGE_SIZE] {
                session.write_subpage(addr + half as u32, wanted).await?;
                subpages_written += 1;
            }
        }

        progress(index + 1, page_total);
    }

    session.restart().await?;

    info!(
        "Restore complete: {} pages, {} half-page writes",
        page_total, subpages_written
    );

    Ok(RestoreReport {
        pages_processed: page_total,
        subpages_written,
    })
}
