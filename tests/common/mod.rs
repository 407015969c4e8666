#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use motor_bridge_lib::commands::AppState;
use motor_bridge_lib::device::DeviceManager;
use motor_bridge_lib::router;
use motor_bridge_lib::serial::SerialChannel;

/// Records every individual write call the channel makes
#[derive(Clone, Default)]
pub struct RecordingPort(Arc<Mutex<Vec<Vec<u8>>>>);

impl RecordingPort {
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for RecordingPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().push(buf.to_vec());
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct FailingPort;

impl Write for FailingPort {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "MCU went away"))
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn manager_with(port: impl Write + Send + 'static) -> Arc<DeviceManager> {
    Arc::new(DeviceManager::new(SerialChannel::from_writer("/dev/test", Box::new(port))))
}

pub fn app_with(manager: Arc<DeviceManager>) -> Router {
    router(AppState::new(manager))
}

pub fn recording_app() -> (Router, RecordingPort) {
    let port = RecordingPort::default();
    (app_with(manager_with(port.clone())), port)
}

pub fn put_operation(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::PUT)
        .uri("/operation")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
