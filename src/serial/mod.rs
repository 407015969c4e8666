pub mod interface;
pub mod protocol;

pub use interface::SerialChannel;
pub use protocol::{Operation, OperationError};

// Microcontroller link defaults
pub const DEFAULT_PORT_NAME: &str = "/dev/ttyACM0";
pub const BAUD_RATE: u32 = 115200;

#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Short write: expected {expected} bytes, wrote {written}")]
    ShortWrite { expected: usize, written: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialport error: {0}")]
    SerialportError(#[from] serialport::Error),

    #[error("Serial task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SerialError>;
