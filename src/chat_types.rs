use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ProxyError;

pub const API_KEY_PREFIX: &str = "gsk_";
pub const DEFAULT_MODEL: &str = "grok-beta";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u64 = 4000;

/// 经过校验的 /api/chat 请求
///
/// 模型参数不做类型检查，原样转发，由上游决定是否接受。
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// 消息原样转发，不解析 role/content
    pub messages: Vec<Value>,
    pub model: Option<Value>,
    pub temperature: Option<Value>,
    pub max_tokens: Option<Value>,
    pub api_key: String,
}

/// 发送给 Grok 的请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionPayload {
    pub model: Value,
    pub messages: Vec<Value>,
    pub temperature: Value,
    pub max_tokens: Value,
    pub stream: bool,
}

impl ChatRequest {
    /// 按顺序校验：先 apiKey，再 messages
    pub fn from_body(body: &Value) -> Result<Self, ProxyError> {
        let api_key = match body.get("apiKey").and_then(Value::as_str) {
            Some(key) if key.starts_with(API_KEY_PREFIX) => key.to_string(),
            _ => return Err(ProxyError::InvalidApiKey),
        };

        let messages = match body.get("messages").and_then(Value::as_array) {
            Some(messages) if !messages.is_empty() => messages.clone(),
            _ => return Err(ProxyError::InvalidMessages),
        };

        Ok(Self {
            messages,
            model: body.get("model").cloned(),
            temperature: body.get("temperature").cloned(),
            max_tokens: body.get("max_tokens").cloned(),
            api_key,
        })
    }

    pub fn to_payload(&self) -> CompletionPayload {
        CompletionPayload {
            model: or_default(&self.model, json!(DEFAULT_MODEL)),
            messages: self.messages.clone(),
            temperature: or_default(&self.temperature, json!(DEFAULT_TEMPERATURE)),
            max_tokens: or_default(&self.max_tokens, json!(DEFAULT_MAX_TOKENS)),
            stream: false,
        }
    }
}

/// 缺失或"假值" (null、false、0、"") 时使用默认值
fn or_default(value: &Option<Value>, default: Value) -> Value {
    match value {
        Some(v) if !is_falsy(v) => v.clone(),
        _ => default,
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
