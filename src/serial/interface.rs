use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::timeout;
use tokio_serial::SerialStream;

use super::{Result, SerialError, Transport};

/// Deadline for a single write or read on the link.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Serial connection to the radio's USB control port.
///
/// The DJ-X100 echoes every command it receives, so an exchange reads two
/// lines: the echo (discarded) and the actual response. The link is
/// generic over the underlying byte stream; `open` produces the
/// serial-port instantiation.
#[derive(Debug)]
pub struct SerialLink<S = SerialStream> {
    port_name: String,
    stream: BufReader<S>,
}

impl SerialLink<SerialStream> {
    /// Open `port_name` at `baud_rate`.
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self> {
        let builder = tokio_serial::new(port_name, baud_rate);
        let stream = SerialStream::open(&builder)?;

        log::info!("Opened {} at {} baud", port_name, baud_rate);

        Ok(Self {
            port_name: port_name.to_string(),
            stream: BufReader::new(stream),
        })
    }
}

impl<S> SerialLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Read one line, waiting at most [`COMMAND_TIMEOUT`].
    ///
    /// When the deadline passes, whatever arrived so far is returned; an
    /// empty string is the caller's signal that the device went quiet.
    async fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        match timeout(COMMAND_TIMEOUT, self.stream.read_line(&mut line)).await {
            Ok(result) => {
                result?;
                Ok(line)
            }
            Err(_) => Ok(line),
        }
    }
}

#[async_trait]
impl<S> Transport for SerialLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, command: &str) -> Result<String> {
        log::debug!("TX {}", command);

        let framed = format!("{}\r", command);
        let write = async {
            let port = self.stream.get_mut();
            port.write_all(framed.as_bytes()).await?;
            port.flush().await?;
            Ok::<_, std::io::Error>(())
        };
        match timeout(COMMAND_TIMEOUT, write).await {
            Ok(result) => result?,
            Err(_) => return Err(SerialError::WriteTimeout),
        }

        // First line back is the echo of the command we just sent.
        self.read_line().await?;
        let response = self.read_line().await?;
        let response = response.trim().to_string();

        log::debug!("RX {}", response);
        Ok(response)
    }
}
