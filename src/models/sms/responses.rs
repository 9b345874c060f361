use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::{
    NotificationKind, Recipient, RecipientSource, SmsLog, SmsPreset, SmsTemplate, TemplateSource,
};
use crate::models::PaginationInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "sms.ts")]
pub enum SmsStatus {
    Sent,
    Failed,
    Skipped,
    // dry run 预览，未实际发送
    Preview,
}

/// 单条短信的处理结果
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct SmsOutcome {
    pub student_id: Option<i64>,
    pub student_name: String,
    pub phone: String,
    pub source: RecipientSource,
    pub body: String,
    pub status: SmsStatus,
    pub provider_message_id: Option<String>,
    pub error: Option<String>,
}

/// 一次通知批次的汇总
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct NotificationReport {
    pub kind: NotificationKind,
    pub dry_run: bool,
    pub template_source: TemplateSource,
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
    // 找不到任何有效号码的学生
    pub students_without_recipients: Vec<String>,
    pub errors: Vec<String>,
    pub messages: Vec<SmsOutcome>,
}

impl NotificationReport {
    pub fn new(kind: NotificationKind, dry_run: bool, template_source: TemplateSource) -> Self {
        Self {
            kind,
            dry_run,
            template_source,
            total: 0,
            sent: 0,
            failed: 0,
            skipped: 0,
            students_without_recipients: Vec::new(),
            errors: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// 追加结果并更新计数
    pub fn push_outcomes(&mut self, outcomes: Vec<SmsOutcome>) {
        for outcome in outcomes {
            match outcome.status {
                SmsStatus::Sent => self.sent += 1,
                SmsStatus::Failed => {
                    self.failed += 1;
                    if let Some(err) = &outcome.error {
                        self.errors.push(format!("{}: {}", outcome.phone, err));
                    }
                }
                SmsStatus::Skipped => self.skipped += 1,
                SmsStatus::Preview => {}
            }
            self.total += 1;
            self.messages.push(outcome);
        }
    }

    /// 没有任何可发送的消息
    pub fn is_unaddressed(&self) -> bool {
        self.messages.is_empty()
    }

    /// 有尝试发送且全部失败
    pub fn all_failed(&self) -> bool {
        self.failed > 0 && self.sent == 0
    }

    pub fn partially_failed(&self) -> bool {
        self.failed > 0 && self.sent > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct RecipientListResponse {
    pub student_id: i64,
    pub student_name: String,
    pub recipients: Vec<Recipient>,
}

/// 内置默认模板
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct DefaultTemplate {
    pub kind: NotificationKind,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct TemplateListResponse {
    pub items: Vec<SmsTemplate>,
    pub defaults: Vec<DefaultTemplate>,
    // 模板中可用的变量名
    pub variables: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct PresetListResponse {
    pub items: Vec<SmsPreset>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct SmsLogListResponse {
    pub items: Vec<SmsLog>,
    pub pagination: PaginationInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: SmsStatus, error: Option<&str>) -> SmsOutcome {
        SmsOutcome {
            student_id: Some(1),
            student_name: "Maryam".to_string(),
            phone: "+447700900001".to_string(),
            source: RecipientSource::PrimaryParent,
            body: "hello".to_string(),
            status,
            provider_message_id: None,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_report_counters() {
        let mut report =
            NotificationReport::new(NotificationKind::Homework, false, TemplateSource::Default);
        report.push_outcomes(vec![
            outcome(SmsStatus::Sent, None),
            outcome(SmsStatus::Failed, Some("invalid number")),
            outcome(SmsStatus::Skipped, None),
        ]);
        assert_eq!(report.total, 3);
        assert_eq!((report.sent, report.failed, report.skipped), (1, 1, 1));
        assert_eq!(report.errors, vec!["+447700900001: invalid number"]);
        assert!(report.partially_failed());
        assert!(!report.all_failed());
    }

    #[test]
    fn test_preview_is_not_failure() {
        let mut report =
            NotificationReport::new(NotificationKind::Attendance, true, TemplateSource::Global);
        report.push_outcomes(vec![outcome(SmsStatus::Preview, None)]);
        assert_eq!(report.total, 1);
        assert!(!report.all_failed());
        assert!(!report.is_unaddressed());
    }
}
