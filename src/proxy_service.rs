use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use thiserror::Error;

use crate::chat_types::CompletionPayload;
use crate::config::AppConfig;

/// 上游调用失败的三种情况
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// 上游返回了非 2xx 状态码
    #[error("upstream returned status {status}")]
    Status { status: u16, body: Value },

    /// 请求已发出但没有拿到响应 (连接失败、超时、读取响应体失败)
    #[error("no response from upstream: {0}")]
    NoResponse(String),

    /// 请求无法构造
    #[error("failed to build upstream request: {0}")]
    Request(String),
}

/// 向上游发送聊天补全请求的能力，测试中可替换为假实现
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn complete(&self, api_key: &str, payload: &CompletionPayload) -> Result<Value, UpstreamError>;
}

/// 基于 reqwest 的 Grok API 客户端
pub struct GrokClient {
    client: Client,
    endpoint: String,
}

impl GrokClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.upstream_url.clone(),
        })
    }
}

#[async_trait]
impl UpstreamClient for GrokClient {
    async fn complete(&self, api_key: &str, payload: &CompletionPayload) -> Result<Value, UpstreamError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| UpstreamError::Request(format!("Invalid authorization header: {}", e)))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        tracing::debug!("Sending request to {}", self.endpoint);

        let resp = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(payload)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| UpstreamError::NoResponse(e.to_string()))?;
        let body = parse_upstream_body(text);

        if status.is_success() {
            Ok(body)
        } else {
            tracing::debug!("Upstream responded with status {}", status);
            Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

fn classify_send_error(e: reqwest::Error) -> UpstreamError {
    if e.is_builder() {
        UpstreamError::Request(e.to_string())
    } else {
        // 超时、连接失败等：请求发出但没有响应
        UpstreamError::NoResponse(e.to_string())
    }
}

/// 上游响应体按 JSON 解析，解析失败则原样作为字符串转发
fn parse_upstream_body(text: String) -> Value {
    match serde_json::from_str(&text) {
        Ok(json) => json,
        Err(_) => Value::String(text),
    }
}
