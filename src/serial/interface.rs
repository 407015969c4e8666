use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{Result, SerialError};

/// Anything the channel can push bytes into. An opened serial port in
/// production, an in-memory sink in tests.
pub type SerialSink = Box<dyn Write + Send>;

/// Exclusive-access wrapper around the serial link to the microcontroller.
///
/// Every write holds the lock for the duration of the write and flush, so
/// concurrent callers never interleave bytes on the wire. The device calls
/// themselves run on the blocking pool.
pub struct SerialChannel {
    port_name: String,
    port: Arc<Mutex<Option<SerialSink>>>,
}

impl SerialChannel {
    /// Open the serial device at `port_name`
    pub fn open(port_name: &str, baud_rate: u32, write_timeout: Duration) -> Result<Self> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(write_timeout)
            .open()?;

        log::info!("Opened serial device {} at {} baud", port_name, baud_rate);
        Ok(Self::from_writer(port_name, Box::new(port)))
    }

    /// Wrap an already opened byte sink
    pub fn from_writer(port_name: impl Into<String>, writer: SerialSink) -> Self {
        Self {
            port_name: port_name.into(),
            port: Arc::new(Mutex::new(Some(writer))),
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub async fn is_open(&self) -> bool {
        self.port.lock().await.is_some()
    }

    /// Send data to the device, returning the number of bytes accepted
    pub async fn write(&self, data: &[u8]) -> Result<usize> {
        let mut guard = self.port.clone().lock_owned().await;
        let data = data.to_vec();

        tokio::task::spawn_blocking(move || -> Result<usize> {
            let port = guard
                .as_mut()
                .ok_or_else(|| SerialError::ConnectionFailed("Not connected".to_string()))?;

            let bytes_written = port.write(&data).map_err(SerialError::IoError)?;
            port.flush().map_err(SerialError::IoError)?;

            Ok(bytes_written)
        })
        .await?
    }

    /// Release the device. Later writes fail with `ConnectionFailed`.
    pub async fn close(&self) -> Result<()> {
        let port = self.port.lock().await.take();
        if let Some(mut port) = port {
            log::info!("Closing serial device {}", self.port_name);
            tokio::task::spawn_blocking(move || port.flush().map_err(SerialError::IoError)).await??;
        }
        Ok(())
    }
}
