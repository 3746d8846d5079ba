pub mod interface;

pub use interface::SerialLink;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    #[error("Write operation timed out")]
    WriteTimeout,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialport error: {0}")]
    SerialportError(#[from] serialport::Error),
}

pub type Result<T> = std::result::Result<T, SerialError>;

/// Command/response channel to the radio.
///
/// The control protocol needs exactly one primitive: transmit a command
/// line, collect the response line. [`SerialLink`] implements it over a
/// serial port; tests substitute a scripted double.
#[async_trait]
pub trait Transport: Send {
    /// Send `command` and return the device's reply with the line
    /// terminator and surrounding whitespace stripped. An empty string
    /// means the device did not answer before the read deadline.
    async fn send(&mut self, command: &str) -> Result<String>;
}
