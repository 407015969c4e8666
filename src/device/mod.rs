pub mod manager;

pub use manager::DeviceManager;

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("{0}")]
    SerialError(#[from] crate::serial::SerialError),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
