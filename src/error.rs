use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::proxy_service::UpstreamError;

pub const INVALID_API_KEY: &str = "Invalid API key format. Must start with gsk_";
pub const INVALID_MESSAGES: &str = "Messages array is required and must not be empty";
pub const UPSTREAM_UNAVAILABLE: &str = "No response from Grok API. Service may be unavailable.";
pub const UPSTREAM_FAILED: &str = "API request failed";
pub const INTERNAL_ERROR: &str = "Internal server error";

/// 代理返回给调用方的所有错误
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Invalid API key format. Must start with gsk_")]
    InvalidApiKey,

    #[error("Messages array is required and must not be empty")]
    InvalidMessages,

    /// 上游返回了非 2xx 响应
    #[error("upstream returned {status}: {message}")]
    Upstream {
        status: StatusCode,
        message: String,
        details: Value,
    },

    /// 上游没有响应 (连接失败、超时)
    #[error("No response from Grok API: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    /// 入站请求体不是合法 JSON
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidApiKey | Self::InvalidMessages => StatusCode::BAD_REQUEST,
            Self::Upstream { status, .. } => *status,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) | Self::MalformedBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            Self::InvalidApiKey => json!({ "error": INVALID_API_KEY }),
            Self::InvalidMessages => json!({ "error": INVALID_MESSAGES }),
            Self::Upstream { message, details, .. } => json!({
                "error": message,
                "details": details,
            }),
            Self::Unavailable(details) => json!({
                "error": UPSTREAM_UNAVAILABLE,
                "details": details,
            }),
            Self::Internal(details) => json!({
                "error": INTERNAL_ERROR,
                "details": details,
            }),
            Self::MalformedBody(message) => json!({
                "error": INTERNAL_ERROR,
                "message": message,
            }),
        }
    }
}

impl From<UpstreamError> for ProxyError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status { status, body } => {
                let message = body
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty())
                    .unwrap_or(UPSTREAM_FAILED)
                    .to_string();
                Self::Upstream {
                    status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                    message,
                    details: body,
                }
            }
            UpstreamError::NoResponse(message) => Self::Unavailable(message),
            UpstreamError::Request(message) => Self::Internal(message),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::InvalidApiKey | Self::InvalidMessages => {
                tracing::warn!(status = %status, "{}", self);
            }
            _ => tracing::error!(status = %status, "{}", self),
        }
        (status, Json(self.body())).into_response()
    }
}
