pub mod protocol;
pub mod session;

pub use protocol::MemoryRegion;
pub use session::DeviceSession;

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Unexpected firmware version: '{0}'")]
    FirmwareMismatch(String),

    #[error("Device did not identify as a DJ-X100")]
    IdentifyFailed,

    #[error("No response from the device")]
    NoResponse,

    #[error("Invalid hex in device response: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Unexpected page length: expected {expected} bytes, got {got}")]
    PageLength { expected: usize, got: usize },

    #[error("Write rejected at address {addr:05X}")]
    WriteRejected { addr: u32 },

    #[error("Payload exceeds half-page limit: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Serial communication error: {0}")]
    SerialError(#[from] crate::serial::SerialError),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
