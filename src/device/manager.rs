use tokio::sync::RwLock;

use super::Result;
use crate::serial::{Operation, SerialChannel, SerialError};

/// Owns the serial channel to the microcontroller and remembers the last
/// operation it accepted.
pub struct DeviceManager {
    channel: SerialChannel,
    current_operation: RwLock<Operation>,
}

impl DeviceManager {
    pub fn new(channel: SerialChannel) -> Self {
        Self {
            channel,
            current_operation: RwLock::new(Operation::default()),
        }
    }

    pub fn channel(&self) -> &SerialChannel {
        &self.channel
    }

    /// Forward an operation to the device
    ///
    /// The operation slot stays write-locked across the device write, so the
    /// recorded operation always matches the last byte put on the wire.
    pub async fn apply(&self, operation: Operation) -> Result<Operation> {
        let mut current = self.current_operation.write().await;

        let written = self.channel.write(&[operation.as_byte()]).await?;
        if written != 1 {
            return Err(SerialError::ShortWrite { expected: 1, written }.into());
        }

        *current = operation;
        log::debug!("Forwarded operation {} to {}", operation, self.channel.port_name());
        Ok(operation)
    }

    /// Last operation successfully written to the device
    pub async fn current_operation(&self) -> Operation {
        *self.current_operation.read().await
    }

    pub async fn shutdown(&self) -> Result<()> {
        log::info!("Closing the serial device");
        self.channel.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceError;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Stalled;

    impl Write for Stalled {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Ok(0)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn starts_stopped() {
        let manager = DeviceManager::new(SerialChannel::from_writer("test", Box::new(Sink::default())));
        assert_eq!(manager.current_operation().await, Operation::Stop);
    }

    #[tokio::test]
    async fn apply_writes_byte_and_records_operation() {
        let sink = Sink::default();
        let manager = DeviceManager::new(SerialChannel::from_writer("test", Box::new(sink.clone())));

        manager.apply(Operation::Forward).await.unwrap();
        manager.apply(Operation::Left).await.unwrap();

        assert_eq!(sink.0.lock().unwrap().as_slice(), b"fl");
        assert_eq!(manager.current_operation().await, Operation::Left);
    }

    #[tokio::test]
    async fn zero_length_write_is_an_error() {
        let manager = DeviceManager::new(SerialChannel::from_writer("test", Box::new(Stalled)));

        let err = manager.apply(Operation::Right).await.unwrap_err();
        assert!(matches!(err, DeviceError::SerialError(SerialError::ShortWrite { expected: 1, written: 0 })));
        assert_eq!(manager.current_operation().await, Operation::Stop);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn recorded_operation_matches_last_byte_written() {
        for _ in 0..50 {
            let sink = Sink::default();
            let manager = Arc::new(DeviceManager::new(SerialChannel::from_writer("test", Box::new(sink.clone()))));

            let handles: Vec<_> = (0..32)
                .map(|i| {
                    let manager = manager.clone();
                    let op = Operation::ALL[i % Operation::ALL.len()];
                    tokio::spawn(async move { manager.apply(op).await })
                })
                .collect();
            for handle in handles {
                handle.await.unwrap().unwrap();
            }

            let last = *sink.0.lock().unwrap().last().unwrap();
            assert_eq!(manager.current_operation().await.as_byte(), last);
        }
    }

    #[tokio::test]
    async fn shutdown_closes_channel() {
        let manager = DeviceManager::new(SerialChannel::from_writer("test", Box::new(Sink::default())));
        manager.shutdown().await.unwrap();

        assert!(!manager.channel().is_open().await);
        assert!(manager.apply(Operation::Stop).await.is_err());
    }
}
