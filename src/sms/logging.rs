use async_trait::async_trait;
use tracing::info;

use super::{SmsProvider, SmsReceipt};
use crate::errors::Result;

/// 开发环境使用，只写日志不发送
pub struct LogSmsProvider;

#[async_trait]
impl SmsProvider for LogSmsProvider {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, phone: &str, body: &str) -> Result<SmsReceipt> {
        info!(phone = %phone, chars = body.chars().count(), "SMS (log provider): {}", body);
        Ok(SmsReceipt::default())
    }
}
