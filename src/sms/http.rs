use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::{SmsProvider, SmsReceipt};
use crate::config::SmsConfig;
use crate::errors::{PortalError, Result};

// 错误信息中保留的响应体长度
const MAX_ERROR_BODY: usize = 300;

#[derive(Debug, Serialize)]
struct SendPayload<'a> {
    to: &'a str,
    from: &'a str,
    body: &'a str,
}

/// 通用 HTTP 短信网关
///
/// `POST {api_url}`，JSON 请求体 `{"to","from","body"}`，Bearer 鉴权。
pub struct HttpSmsProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    sender_id: String,
}

impl HttpSmsProvider {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        sender_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_url = api_url.into();
        if api_url.trim().is_empty() {
            return Err(PortalError::sms_config("sms.api_url is required for the http provider"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortalError::sms_config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url,
            api_key: api_key.into(),
            sender_id: sender_id.into(),
        })
    }

    pub fn from_config(config: &SmsConfig) -> Result<Self> {
        Self::new(
            config.api_url.clone(),
            config.api_key.clone(),
            config.sender_id.clone(),
            Duration::from_secs(config.timeout_secs.max(1)),
        )
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_ERROR_BODY {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX_ERROR_BODY).collect();
        format!("{cut}...")
    }
}

/// 兼容不同网关的消息 ID 字段
fn extract_message_id(value: &Value) -> Option<String> {
    ["message_id", "id", "sid"]
        .iter()
        .find_map(|key| match value.get(*key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

#[async_trait]
impl SmsProvider for HttpSmsProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, phone: &str, body: &str) -> Result<SmsReceipt> {
        let payload = SendPayload {
            to: phone,
            from: &self.sender_id,
            body,
        };

        let mut request = self.client.post(&self.api_url).json(&payload);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!("SMS gateway returned {} for {}", status.as_u16(), phone);
            return Err(PortalError::sms_provider(format!(
                "HTTP {}: {}",
                status.as_u16(),
                truncate(&text)
            )));
        }

        // 部分网关返回 200 但在 body 中标记失败
        let value: Option<Value> = serde_json::from_str(&text).ok();
        if let Some(v) = &value
            && v.get("success").and_then(Value::as_bool) == Some(false)
        {
            let reason = v
                .get("error")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("gateway reported failure");
            return Err(PortalError::sms_provider(reason.to_string()));
        }

        let message_id = value.as_ref().and_then(extract_message_id);
        debug!("SMS accepted for {} (message id: {:?})", phone, message_id);

        Ok(SmsReceipt { message_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_message_id() {
        assert_eq!(
            extract_message_id(&json!({"message_id": "abc"})),
            Some("abc".to_string())
        );
        assert_eq!(extract_message_id(&json!({"sid": 42})), Some("42".to_string()));
        assert_eq!(extract_message_id(&json!({"id": ""})), None);
        assert_eq!(extract_message_id(&json!({"ok": true})), None);
    }

    #[test]
    fn test_truncate() {
        let long = "x".repeat(MAX_ERROR_BODY + 10);
        assert!(truncate(&long).ends_with("..."));
        assert_eq!(truncate("short"), "short");
    }
}
