//! 家长短信通知
//!
//! - `phone`: 号码规范化
//! - `recipients`: 按关系链解析收件人
//! - `template`: 模板选择与变量替换
//! - `cleanup`: 渲染结果清理
//! - `dispatch`: 有限并发发送与结果汇总
//! - `notifier`: 以上步骤的编排

pub mod cleanup;
pub mod dispatch;
pub mod notifier;
pub mod phone;
pub mod recipients;
pub mod template;

pub use crate::models::sms::entities::{NotificationKind, Recipient, RecipientSource, TemplateSource};
pub use cleanup::clean_message;
pub use dispatch::{OutgoingSms, dispatch};
pub use notifier::{Notifier, NotifySettings};
pub use phone::{is_valid_phone, normalize_phone};
pub use recipients::resolve_recipients;
pub use template::{
    SelectedTemplate, TemplateVars, default_template, render_template, select_template,
    validate_template_body,
};

/// 模板缓存键：`sms_template:{class_id|global}:{kind}`
pub fn template_cache_key(class_id: Option<i64>, kind: NotificationKind) -> String {
    match class_id {
        Some(id) => format!("sms_template:{id}:{kind}"),
        None => format!("sms_template:global:{kind}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_cache_key() {
        assert_eq!(
            template_cache_key(Some(12), NotificationKind::Attendance),
            "sms_template:12:attendance"
        );
        assert_eq!(
            template_cache_key(None, NotificationKind::LessonResult),
            "sms_template:global:lesson_result"
        );
    }
}
