use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

/// 通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "sms.ts")]
pub enum NotificationKind {
    LessonResult,
    Attendance,
    Homework,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 3] = [
        NotificationKind::LessonResult,
        NotificationKind::Attendance,
        NotificationKind::Homework,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::LessonResult => "lesson_result",
            NotificationKind::Attendance => "attendance",
            NotificationKind::Homework => "homework",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "lesson_result" | "lesson" => Ok(NotificationKind::LessonResult),
            "attendance" => Ok(NotificationKind::Attendance),
            "homework" => Ok(NotificationKind::Homework),
            other => Err(format!("Unknown notification kind: {other}")),
        }
    }
}

/// 最终使用的模板来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "sms.ts")]
pub enum TemplateSource {
    Custom,
    Preset,
    Class,
    Global,
    Default,
}

impl TemplateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateSource::Custom => "custom",
            TemplateSource::Preset => "preset",
            TemplateSource::Class => "class",
            TemplateSource::Global => "global",
            TemplateSource::Default => "default",
        }
    }
}

/// 号码是通过哪条关系找到的
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "sms.ts")]
pub enum RecipientSource {
    AdultStudent,
    PrimaryParent,
    SecondaryParent,
    LinkedParent,
    ParentFallback,
}

impl RecipientSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientSource::AdultStudent => "adult_student",
            RecipientSource::PrimaryParent => "primary_parent",
            RecipientSource::SecondaryParent => "secondary_parent",
            RecipientSource::LinkedParent => "linked_parent",
            RecipientSource::ParentFallback => "parent_fallback",
        }
    }
}

/// 已解析的收件人
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct Recipient {
    // 规范化后的号码，形如 +447700900123
    pub phone: String,
    // 收件人姓名，用于 {parent_name}
    pub name: Option<String>,
    pub source: RecipientSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct SmsTemplate {
    pub id: i64,
    // 为空表示全局模板
    pub class_id: Option<i64>,
    pub kind: NotificationKind,
    pub body: String,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct SmsPreset {
    pub id: i64,
    pub class_id: Option<i64>,
    pub title: String,
    pub body: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct SmsLog {
    pub id: i64,
    pub student_id: Option<i64>,
    pub class_id: Option<i64>,
    pub kind: String,
    pub phone: String,
    pub recipient_source: String,
    pub template_source: String,
    pub body: String,
    pub success: bool,
    pub provider_message_id: Option<String>,
    pub error: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 写入发送记录时使用
#[derive(Debug, Clone)]
pub struct NewSmsLog {
    pub student_id: Option<i64>,
    pub class_id: Option<i64>,
    pub kind: NotificationKind,
    pub phone: String,
    pub recipient_source: RecipientSource,
    pub template_source: TemplateSource,
    pub body: String,
    pub success: bool,
    pub provider_message_id: Option<String>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_and_display() {
        for kind in NotificationKind::ALL {
            assert_eq!(kind.as_str().parse::<NotificationKind>(), Ok(kind));
            assert_eq!(kind.to_string(), kind.as_str());
        }
        assert!("reminder".parse::<NotificationKind>().is_err());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&RecipientSource::ParentFallback).unwrap(),
            "\"parent_fallback\""
        );
        assert_eq!(
            serde_json::to_string(&NotificationKind::LessonResult).unwrap(),
            "\"lesson_result\""
        );
    }
}
