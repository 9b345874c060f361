use serde::Deserialize;
use ts_rs::TS;

use super::entities::NotificationKind;

/// 课程结果通知
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct LessonNotificationRequest {
    pub student_id: i64,
    // 缺省时使用学生所在班级
    pub class_id: Option<i64>,
    // YYYY-MM-DD，缺省为今天
    pub date: Option<String>,
    pub surah: Option<String>,
    pub from_verse: Option<i32>,
    pub to_verse: Option<i32>,
    pub pages: Option<String>,
    pub lesson_type: Option<String>,
    pub outcome: Option<String>,
    pub grade: Option<String>,
    pub notes: Option<String>,
    pub custom_message: Option<String>,
    pub preset_id: Option<i64>,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct AttendanceRecord {
    pub student_id: i64,
    // present / absent / late / excused
    pub status: String,
}

/// 考勤通知
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct AttendanceNotificationRequest {
    pub class_id: i64,
    pub date: Option<String>,
    pub records: Vec<AttendanceRecord>,
    pub custom_message: Option<String>,
    pub preset_id: Option<i64>,
    #[serde(default)]
    pub dry_run: bool,
}

/// 作业通知
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct HomeworkNotificationRequest {
    pub class_id: i64,
    // 缺省时通知班级全部学生
    pub student_ids: Option<Vec<i64>>,
    // 有自定义内容或预设时可省略
    #[serde(default)]
    pub homework_title: String,
    pub homework_details: Option<String>,
    pub due_date: Option<String>,
    pub date: Option<String>,
    pub custom_message: Option<String>,
    pub preset_id: Option<i64>,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct ClassScopeQuery {
    pub class_id: Option<i64>,
}

/// 保存模板，(class_id, kind) 已存在时覆盖
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct UpsertTemplateRequest {
    pub class_id: Option<i64>,
    pub kind: NotificationKind,
    pub body: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct CreatePresetRequest {
    pub class_id: Option<i64>,
    pub title: String,
    pub body: String,
}

// 发送记录查询参数（来自HTTP请求）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "sms.ts")]
pub struct SmsLogListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub student_id: Option<i64>,
    pub class_id: Option<i64>,
}
