//! DJ-X100 control protocol definitions.
//!
//! Single source of truth for the command strings, the expected firmware
//! identification and the device memory geometry. Both the backup and the
//! restore path consult these constants; nothing else in the crate spells
//! out a protocol literal.

/// Firmware version string this tool was written and tested against.
pub const FIRMWARE_VERSION: &str = "ver 1.00-003";

/// Positive acknowledgement sent by the device.
pub const RESPONSE_OK: &str = "OK";

/// Query the firmware version.
pub const CMD_VERSION: &str = "AL~VER";

/// Identity handshake; the device answers [`RESPONSE_OK`] when it is a
/// DJ-X100 ready to accept memory commands.
pub const CMD_IDENTIFY: &str = "AL~DJ-X100";

/// Restart the device. The radio resets before it reliably answers, so the
/// response to this command carries no information.
pub const CMD_RESTART: &str = "AL~RESTART";

/// Factory baud rate of the USB control link.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Size of one memory page, the atomic unit of a device read.
pub const PAGE_SIZE: usize = 256;

/// Size of a half page, the atomic unit of a device write.
pub const HALF_PAGE_SIZE: usize = 128;

/// First address of the channel memory window.
///
/// Addresses below this boundary hold calibration and firmware data;
/// writing there can brick the radio and requires explicit operator
/// consent.
pub const CHANNEL_MEMORY_START: u32 = 0x20000;

/// Last address (inclusive) of the channel memory window.
pub const CHANNEL_MEMORY_END: u32 = 0x3F3FF;

/// Build the read command for the 256-byte page at `addr`.
pub fn read_page_command(addr: u32) -> String {
    format!("AL~F{addr:05X}M")
}

/// Build the write command placing `data` (up to half a page) at `addr`.
pub fn write_subpage_command(addr: u32, data: &[u8]) -> String {
    format!("AL~F{addr:05X}W{}", hex::encode_upper(data))
}

/// A contiguous device memory window with inclusive bounds, traversed in
/// [`PAGE_SIZE`] strides.
///
/// The page count is derived from the inclusive end, so the terminal page
/// is always transferred even when the window length is not an exact
/// multiple of the page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    /// First page address.
    pub start: u32,
    /// Last address covered by the region (inclusive).
    pub end: u32,
}

impl MemoryRegion {
    /// Region covering `start..=end`.
    ///
    /// Panics if `end` is below `start`.
    pub const fn new(start: u32, end: u32) -> Self {
        assert!(start <= end);
        Self { start, end }
    }

    /// The documented channel memory window of the DJ-X100.
    pub const fn channel_memory() -> Self {
        Self::new(CHANNEL_MEMORY_START, CHANNEL_MEMORY_END)
    }

    /// Number of pages the region spans.
    pub fn page_count(&self) -> usize {
        (((self.end - self.start) / PAGE_SIZE as u32) + 1) as usize
    }

    /// Payload size of a container holding this region.
    pub fn byte_len(&self) -> usize {
        self.page_count() * PAGE_SIZE
    }

    /// Page start addresses, in transfer order.
    pub fn pages(&self) -> impl Iterator<Item = u32> {
        let start = self.start;
        (0..self.page_count()).map(move |i| start + (i as u32) * PAGE_SIZE as u32)
    }
}
