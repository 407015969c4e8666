use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::device::{DeviceError, DeviceManager};
use crate::serial::{Operation, OperationError};

pub const HEALTH_MESSAGE: &str = "I'm as ready as I'll ever be!";
const JSON_MEDIA_TYPE: &str = "application/json";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub device_manager: Arc<DeviceManager>,
    pub require_json_content_type: bool,
}

impl AppState {
    pub fn new(device_manager: Arc<DeviceManager>) -> Self {
        Self {
            device_manager,
            require_json_content_type: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationRequest {
    #[serde(default)]
    pub operation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResponse {
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationResponse {
    pub fn ok(operation: Operation) -> Self {
        Self {
            operation: operation.to_string(),
            error: None,
        }
    }
}

/// Failures of the operation endpoint. Each one is logged and replied as an
/// `OperationResponse` carrying the message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Content-Type shall be application/json, not {0}")]
    UnsupportedContentType(String),

    #[error("failed to read the request body: {0}")]
    BodyRead(#[from] BytesRejection),

    #[error("failed to unmarshal the body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidOperation(#[from] OperationError),

    #[error("failed to write the direction to the MCU: {source}")]
    DeviceWrite {
        operation: Operation,
        #[source]
        source: DeviceError,
    },

    #[error("method not allowed")]
    MethodNotAllowed { current: Operation },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnsupportedContentType(_)
            | ApiError::MalformedBody(_)
            | ApiError::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            ApiError::BodyRead(_) | ApiError::DeviceWrite { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Operation code echoed back to the client alongside the error
    fn echoed_operation(&self) -> String {
        match self {
            ApiError::InvalidOperation(OperationError::Unknown(raw)) => raw.clone(),
            ApiError::DeviceWrite { operation, .. } => operation.to_string(),
            ApiError::MethodNotAllowed { current } => current.to_string(),
            _ => String::new(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        log::error!("{}", message);

        let body = OperationResponse {
            operation: self.echoed_operation(),
            error: Some(message),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Readiness probe, independent of the serial device
pub async fn get_healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: HEALTH_MESSAGE.to_string(),
    })
}

pub async fn ping() -> &'static str {
    "pong"
}

/// Report the last operation forwarded to the device
pub async fn get_operation(State(state): State<AppState>) -> Json<OperationResponse> {
    let current = state.device_manager.current_operation().await;
    Json(OperationResponse::ok(current))
}

/// Validate an operation request and forward it to the device
pub async fn put_operation(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<OperationResponse>, ApiError> {
    if state.require_json_content_type {
        check_content_type(&headers)?;
    }

    let body = body?;
    let request: OperationRequest = serde_json::from_slice(&body)?;
    let operation = Operation::parse(&request.operation)?;

    state
        .device_manager
        .apply(operation)
        .await
        .map_err(|source| ApiError::DeviceWrite { operation, source })?;

    Ok(Json(OperationResponse::ok(operation)))
}

pub async fn operation_method_not_allowed(State(state): State<AppState>) -> ApiError {
    ApiError::MethodNotAllowed {
        current: state.device_manager.current_operation().await,
    }
}

fn check_content_type(headers: &HeaderMap) -> Result<(), ApiError> {
    let raw = headers
        .get(header::CONTENT_TYPE)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default();

    let media_type = raw.split(';').next().unwrap_or_default().trim();
    if media_type.eq_ignore_ascii_case(JSON_MEDIA_TYPE) {
        Ok(())
    } else {
        Err(ApiError::UnsupportedContentType(raw))
    }
}
