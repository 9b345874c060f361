//! 批量发送
//!
//! 单条失败不会中断整批，结果按输入顺序返回。

use futures_util::{StreamExt, stream};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::models::sms::entities::Recipient;
use crate::models::sms::responses::{SmsOutcome, SmsStatus};
use crate::sms::SmsProvider;

/// 待发送的一条短信
#[derive(Debug, Clone)]
pub struct OutgoingSms {
    pub student_id: Option<i64>,
    pub student_name: String,
    pub recipient: Recipient,
    pub body: String,
}

impl OutgoingSms {
    fn outcome(self, status: SmsStatus, message_id: Option<String>, error: Option<String>) -> SmsOutcome {
        SmsOutcome {
            student_id: self.student_id,
            student_name: self.student_name,
            phone: self.recipient.phone,
            source: self.recipient.source,
            body: self.body,
            status,
            provider_message_id: message_id,
            error,
        }
    }
}

/// 发送前检查：同批次重复的 (号码, 内容) 与空内容
fn precheck(message: OutgoingSms, duplicate: bool) -> Result<OutgoingSms, SmsOutcome> {
    if duplicate {
        return Err(message.outcome(
            SmsStatus::Skipped,
            None,
            Some("Duplicate message for this number in the same batch".to_string()),
        ));
    }
    if message.body.trim().is_empty() {
        return Err(message.outcome(
            SmsStatus::Failed,
            None,
            Some("Message body is empty".to_string()),
        ));
    }
    Ok(message)
}

fn mark_duplicates(messages: &[OutgoingSms]) -> Vec<bool> {
    let mut seen = HashSet::new();
    messages
        .iter()
        .map(|m| !seen.insert((m.recipient.phone.as_str(), m.body.as_str())))
        .collect()
}

/// 以有限并发发送
pub async fn dispatch(
    provider: &dyn SmsProvider,
    messages: Vec<OutgoingSms>,
    max_concurrency: usize,
) -> Vec<SmsOutcome> {
    let duplicates = mark_duplicates(&messages);

    stream::iter(messages.into_iter().zip(duplicates))
        .map(|(message, duplicate)| async move {
            let message = match precheck(message, duplicate) {
                Ok(message) => message,
                Err(outcome) => return outcome,
            };

            match provider.send(&message.recipient.phone, &message.body).await {
                Ok(receipt) => {
                    debug!(
                        "SMS sent to {} via {} ({:?})",
                        message.recipient.phone,
                        provider.name(),
                        receipt.message_id
                    );
                    message.outcome(SmsStatus::Sent, receipt.message_id, None)
                }
                Err(e) => {
                    warn!(
                        "SMS to {} via {} failed: {}",
                        message.recipient.phone,
                        provider.name(),
                        e
                    );
                    message.outcome(SmsStatus::Failed, None, Some(e.message().to_string()))
                }
            }
        })
        .buffered(max_concurrency.max(1))
        .collect()
        .await
}

/// dry run：做同样的检查，但不调用服务商
pub fn preview(messages: Vec<OutgoingSms>) -> Vec<SmsOutcome> {
    let duplicates = mark_duplicates(&messages);

    messages
        .into_iter()
        .zip(duplicates)
        .map(|(message, duplicate)| match precheck(message, duplicate) {
            Ok(message) => message.outcome(SmsStatus::Preview, None, None),
            Err(outcome) => outcome,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{PortalError, Result};
    use crate::models::sms::entities::RecipientSource;
    use crate::sms::SmsReceipt;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 号码以 "9" 结尾的发送失败
    struct FlakyProvider {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SmsProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn send(&self, phone: &str, _body: &str) -> Result<SmsReceipt> {
            self.sent.lock().unwrap().push(phone.to_string());
            if phone.ends_with('9') {
                Err(PortalError::sms_provider("Number unreachable"))
            } else {
                Ok(SmsReceipt {
                    message_id: Some(format!("msg-{phone}")),
                })
            }
        }
    }

    fn message(phone: &str, body: &str) -> OutgoingSms {
        OutgoingSms {
            student_id: Some(7),
            student_name: "Bilal".to_string(),
            recipient: Recipient {
                phone: phone.to_string(),
                name: Some("Khadija".to_string()),
                source: RecipientSource::PrimaryParent,
            },
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_order() {
        let provider = FlakyProvider {
            sent: Mutex::new(Vec::new()),
        };
        let outcomes = dispatch(
            &provider,
            vec![
                message("+447700900001", "hello"),
                message("+447700900009", "hello"),
                message("+447700900002", "hello"),
            ],
            2,
        )
        .await;

        let statuses: Vec<SmsStatus> = outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![SmsStatus::Sent, SmsStatus::Failed, SmsStatus::Sent]
        );
        assert_eq!(outcomes[0].provider_message_id.as_deref(), Some("msg-+447700900001"));
        assert_eq!(outcomes[1].error.as_deref(), Some("Number unreachable"));
    }

    #[tokio::test]
    async fn test_duplicates_and_empty_bodies_skip_provider() {
        let provider = FlakyProvider {
            sent: Mutex::new(Vec::new()),
        };
        let outcomes = dispatch(
            &provider,
            vec![
                message("+447700900001", "hello"),
                message("+447700900001", "hello"),
                message("+447700900001", "different"),
                message("+447700900002", "   "),
            ],
            4,
        )
        .await;

        let statuses: Vec<SmsStatus> = outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![
                SmsStatus::Sent,
                SmsStatus::Skipped,
                SmsStatus::Sent,
                SmsStatus::Failed
            ]
        );
        assert_eq!(provider.sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_preview() {
        let outcomes = preview(vec![
            message("+447700900001", "hello"),
            message("+447700900001", "hello"),
        ]);
        assert_eq!(outcomes[0].status, SmsStatus::Preview);
        assert_eq!(outcomes[1].status, SmsStatus::Skipped);
    }
}
