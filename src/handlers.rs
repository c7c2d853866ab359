use axum::{
    body::Bytes,
    extract::{ConnectInfo, Extension},
    http::{header, HeaderMap},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::chat_types::ChatRequest;
use crate::error::ProxyError;
use crate::proxy_service::UpstreamClient;

/// GET /
pub async fn index() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Grok API Proxy Server is running",
        "endpoints": {
            "chat": "POST /api/chat",
            "health": "GET /health",
        },
    }))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "cors": "enabled",
    }))
}

/// 接收 /api/chat 的POST请求
pub async fn chat(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Extension(upstream): Extension<Arc<dyn UpstreamClient>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ProxyError> {
    let span = tracing::info_span!("chat", request_id = %Uuid::new_v4(), client = %addr);

    async move {
        tracing::info!("Received chat request");
        let body = if is_json_content_type(&headers) {
            parse_body(&body)?
        } else {
            tracing::debug!("Ignoring non-JSON request body");
            json!({})
        };
        relay_chat(&body, upstream.as_ref()).await.map(Json)
    }
    .instrument(span)
    .await
}

/// 只有 `application/json` (可带参数) 的请求体才会被解析
fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// 空请求体按 `{}` 处理，顶层只接受对象或数组
fn parse_body(raw: &[u8]) -> Result<Value, ProxyError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    let body: Value =
        serde_json::from_slice(raw).map_err(|e| ProxyError::MalformedBody(e.to_string()))?;
    if !(body.is_object() || body.is_array()) {
        return Err(ProxyError::MalformedBody(
            "JSON body must be an object or an array".to_string(),
        ));
    }
    Ok(body)
}

/// 校验请求并转发给上游
///
/// 上游的 2xx 响应体原样返回，不再检查其内容。
pub async fn relay_chat(body: &Value, upstream: &dyn UpstreamClient) -> Result<Value, ProxyError> {
    let request = ChatRequest::from_body(body)?;

    tracing::info!(messages = request.messages.len(), "Processing request with {} messages", request.messages.len());

    let payload = request.to_payload();
    let response = upstream.complete(&request.api_key, &payload).await?;

    tracing::info!(model = %payload.model, "Grok API response received");
    Ok(response)
}
