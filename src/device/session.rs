use log::{debug, info};

use super::protocol;
use super::{DeviceError, Result};
use crate::serial::Transport;

/// A DJ-X100 reached over some [`Transport`].
///
/// Memory commands are only valid after [`identify`](Self::identify) has
/// succeeded; callers are expected to run the handshake before touching
/// pages.
pub struct DeviceSession<T> {
    transport: T,
}

impl<T: Transport> DeviceSession<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Compare the device firmware version against the one this tool was
    /// written for.
    ///
    /// The memory layout is not documented by the vendor, so any other
    /// version is rejected rather than trusted to match.
    pub async fn verify_firmware(&mut self) -> Result<()> {
        let response = self.transport.send(protocol::CMD_VERSION).await?;
        if response != protocol::FIRMWARE_VERSION {
            return Err(DeviceError::FirmwareMismatch(response));
        }
        debug!("Firmware version verified: {}", protocol::FIRMWARE_VERSION);
        Ok(())
    }

    /// Identification handshake. A silent or foreign device fails here
    /// before any memory command is issued.
    pub async fn identify(&mut self) -> Result<()> {
        let response = self.transport.send(protocol::CMD_IDENTIFY).await?;
        if response != protocol::RESPONSE_OK {
            return Err(DeviceError::IdentifyFailed);
        }
        debug!("Device identified as DJ-X100");
        Ok(())
    }

    /// Read the 256-byte page starting at `addr`.
    pub async fn read_page(&mut self, addr: u32) -> Result<Vec<u8>> {
        let response = self
            .transport
            .send(&protocol::read_page_command(addr))
            .await?;
        if response.is_empty() {
            return Err(DeviceError::NoResponse);
        }
        let data = hex::decode(&response)?;
        if data.len() != protocol::PAGE_SIZE {
            return Err(DeviceError::PageLength {
                expected: protocol::PAGE_SIZE,
                got: data.len(),
            });
        }
        Ok(data)
    }

    /// Write `data` (at most half a page) starting at `addr`.
    pub async fn write_subpage(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        if data.len() > protocol::HALF_PAGE_SIZE {
            return Err(DeviceError::PayloadTooLarge(data.len()));
        }
        let response = self
            .transport
            .send(&protocol::write_subpage_command(addr, data))
            .await?;
        if response != protocol::RESPONSE_OK {
            return Err(DeviceError::WriteRejected { addr });
        }
        Ok(())
    }

    /// Restart the radio so it picks up the rewritten memory.
    ///
    /// The device resets before it reliably answers, so the response is
    /// not checked.
    pub async fn restart(&mut self) -> Result<()> {
        self.transport.send(protocol::CMD_RESTART).await?;
        info!("Restart command sent");
        Ok(())
    }
}
