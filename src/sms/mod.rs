//! 短信发送通道
//!
//! 通知模块只关心"给某个号码发一条内容"，具体走哪个服务商由配置决定。

pub mod http;
pub mod logging;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::SmsConfig;
use crate::errors::{PortalError, Result};

pub use http::HttpSmsProvider;
pub use logging::LogSmsProvider;

/// 服务商回执
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmsReceipt {
    pub message_id: Option<String>,
}

#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// 服务商名称，用于日志
    fn name(&self) -> &str;

    /// 发送一条短信，失败时返回错误
    async fn send(&self, phone: &str, body: &str) -> Result<SmsReceipt>;
}

/// 根据 `sms.provider` 创建发送通道
pub fn create_sms_provider(config: &SmsConfig) -> Result<Arc<dyn SmsProvider>> {
    let provider: Arc<dyn SmsProvider> = match config.provider.trim() {
        "http" => Arc::new(HttpSmsProvider::from_config(config)?),
        "log" => Arc::new(LogSmsProvider),
        other => {
            return Err(PortalError::sms_config(format!(
                "Unknown SMS provider '{other}', expected 'http' or 'log'"
            )));
        }
    };

    info!("SMS provider initialized: {}", provider.name());
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sms_config(provider: &str, api_url: &str) -> SmsConfig {
        SmsConfig {
            provider: provider.to_string(),
            api_url: api_url.to_string(),
            api_key: "secret".to_string(),
            sender_id: "Madrasah".to_string(),
            timeout_secs: 5,
            default_country_code: "44".to_string(),
            max_concurrency: 2,
            attendance_notify_statuses: vec!["absent".to_string()],
            rate_limit_per_minute: 30,
        }
    }

    #[test]
    fn test_create_log_provider() {
        let provider = create_sms_provider(&sms_config("log", "")).unwrap();
        assert_eq!(provider.name(), "log");
    }

    #[test]
    fn test_http_provider_requires_url() {
        let err = create_sms_provider(&sms_config("http", "")).err().unwrap();
        assert_eq!(err.code(), "E020");
    }

    #[test]
    fn test_unknown_provider() {
        let err = create_sms_provider(&sms_config("pigeon", "")).err().unwrap();
        assert!(err.message().contains("pigeon"));
    }
}
