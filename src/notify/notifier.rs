use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::dispatch::{OutgoingSms, dispatch, preview};
use super::recipients::resolve_recipients;
use super::template::{
    SelectedTemplate, TemplateVars, pick_custom, render_template, select_template,
};
use super::{cleanup::clean_message, template_cache_key};
use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::errors::{PortalError, Result};
use crate::models::classes::entities::Class;
use crate::models::sms::entities::{NewSmsLog, NotificationKind, SmsTemplate};
use crate::models::sms::requests::{
    AttendanceNotificationRequest, HomeworkNotificationRequest, LessonNotificationRequest,
};
use crate::models::sms::responses::{
    NotificationReport, RecipientListResponse, SmsOutcome, SmsStatus,
};
use crate::models::students::entities::Student;
use crate::sms::SmsProvider;
use crate::storage::Storage;

// 缓存中表示"数据库里没有"的值
const CACHE_NULL: &str = "null";

#[derive(Debug, Clone)]
pub struct NotifySettings {
    pub default_country_code: String,
    pub max_concurrency: usize,
    // 小写
    pub attendance_notify_statuses: Vec<String>,
    pub template_cache_ttl: u64,
}

impl NotifySettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            default_country_code: config.sms.default_country_code.clone(),
            max_concurrency: config.sms.max_concurrency.max(1),
            attendance_notify_statuses: config
                .sms
                .attendance_notify_statuses
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            template_cache_ttl: config.cache.default_ttl,
        }
    }

    pub fn should_notify_attendance(&self, status: &str) -> bool {
        let status = status.trim().to_lowercase();
        self.attendance_notify_statuses.contains(&status)
    }
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            default_country_code: "44".to_string(),
            max_concurrency: 4,
            attendance_notify_statuses: vec!["absent".to_string(), "late".to_string()],
            template_cache_ttl: 300,
        }
    }
}

/// 一个学生及其专属变量
struct BatchItem {
    student: Student,
    vars: TemplateVars,
}

/// 通知编排：选模板、解析收件人、渲染、清理、发送、记录
pub struct Notifier {
    storage: Arc<dyn Storage>,
    cache: Arc<dyn ObjectCache>,
    provider: Arc<dyn SmsProvider>,
    settings: NotifySettings,
}

impl Notifier {
    pub fn new(
        storage: Arc<dyn Storage>,
        cache: Arc<dyn ObjectCache>,
        provider: Arc<dyn SmsProvider>,
        settings: NotifySettings,
    ) -> Self {
        Self {
            storage,
            cache,
            provider,
            settings,
        }
    }

    pub fn settings(&self) -> &NotifySettings {
        &self.settings
    }

    /// 课程结果通知，只针对一个学生
    pub async fn notify_lesson(&self, req: LessonNotificationRequest) -> Result<NotificationReport> {
        let student = self
            .storage
            .get_student_by_id(req.student_id)
            .await?
            .ok_or_else(|| {
                PortalError::student_not_found(format!("Student {} not found", req.student_id))
            })?;

        let class = match req.class_id {
            Some(class_id) => Some(self.load_class(class_id).await?),
            None => match student.class_id {
                Some(class_id) => self.storage.get_class_by_id(class_id).await?,
                None => None,
            },
        };

        let date = resolve_date(req.date.as_deref())?;
        let custom = self
            .resolve_custom(req.custom_message.as_deref(), req.preset_id)
            .await?;

        let mut vars = TemplateVars::new();
        vars.date(&date).class(class.as_ref()).lesson(&req);

        self.run_batch(
            NotificationKind::LessonResult,
            class.as_ref(),
            custom,
            req.dry_run,
            vec![BatchItem { student, vars }],
            Vec::new(),
        )
        .await
    }

    /// 考勤通知，只通知配置中列出的状态
    pub async fn notify_attendance(
        &self,
        req: AttendanceNotificationRequest,
    ) -> Result<NotificationReport> {
        let class = self.load_class(req.class_id).await?;
        let date = resolve_date(req.date.as_deref())?;
        let custom = self
            .resolve_custom(req.custom_message.as_deref(), req.preset_id)
            .await?;

        let mut items = Vec::new();
        let mut errors = Vec::new();
        for record in &req.records {
            if !self.settings.should_notify_attendance(&record.status) {
                debug!(
                    "Attendance status '{}' for student {} is not notified",
                    record.status, record.student_id
                );
                continue;
            }

            match self.storage.get_student_by_id(record.student_id).await? {
                Some(student) => {
                    let mut vars = TemplateVars::new();
                    vars.date(&date)
                        .class(Some(&class))
                        .attendance_status(&record.status.trim().to_lowercase());
                    items.push(BatchItem { student, vars });
                }
                None => errors.push(format!("Student {} not found", record.student_id)),
            }
        }

        self.run_batch(
            NotificationKind::Attendance,
            Some(&class),
            custom,
            req.dry_run,
            items,
            errors,
        )
        .await
    }

    /// 作业通知，未指定学生时通知全班
    pub async fn notify_homework(
        &self,
        req: HomeworkNotificationRequest,
    ) -> Result<NotificationReport> {
        let class = self.load_class(req.class_id).await?;
        let date = resolve_date(req.date.as_deref())?;
        let custom = self
            .resolve_custom(req.custom_message.as_deref(), req.preset_id)
            .await?;

        if custom.is_none() && req.homework_title.trim().is_empty() {
            return Err(PortalError::validation("homework_title must not be empty"));
        }

        let mut errors = Vec::new();
        let students = match &req.student_ids {
            Some(ids) => {
                let mut students = Vec::with_capacity(ids.len());
                for id in ids {
                    match self.storage.get_student_by_id(*id).await? {
                        Some(student) => students.push(student),
                        None => errors.push(format!("Student {id} not found")),
                    }
                }
                students
            }
            None => self.storage.list_students_by_class(class.id).await?,
        };

        let items = students
            .into_iter()
            .map(|student| {
                let mut vars = TemplateVars::new();
                vars.date(&date).class(Some(&class)).homework(&req);
                BatchItem { student, vars }
            })
            .collect();

        self.run_batch(
            NotificationKind::Homework,
            Some(&class),
            custom,
            req.dry_run,
            items,
            errors,
        )
        .await
    }

    /// 学生的全部收件人，供前端展示
    pub async fn student_recipients(&self, student_id: i64) -> Result<RecipientListResponse> {
        let student = self
            .storage
            .get_student_by_id(student_id)
            .await?
            .ok_or_else(|| {
                PortalError::student_not_found(format!("Student {student_id} not found"))
            })?;

        let recipients = resolve_recipients(
            self.storage.as_ref(),
            &student,
            &self.settings.default_country_code,
        )
        .await?;

        Ok(RecipientListResponse {
            student_id: student.id,
            student_name: student.full_name,
            recipients,
        })
    }

    async fn load_class(&self, class_id: i64) -> Result<Class> {
        self.storage
            .get_class_by_id(class_id)
            .await?
            .ok_or_else(|| PortalError::class_not_found(format!("Class {class_id} not found")))
    }

    async fn resolve_custom(
        &self,
        custom_message: Option<&str>,
        preset_id: Option<i64>,
    ) -> Result<Option<SelectedTemplate>> {
        if let Some(custom) = pick_custom(custom_message, None) {
            return Ok(Some(custom));
        }

        let Some(preset_id) = preset_id else {
            return Ok(None);
        };
        let preset = self
            .storage
            .get_preset_by_id(preset_id)
            .await?
            .ok_or_else(|| PortalError::preset_not_found(format!("Preset {preset_id} not found")))?;

        Ok(pick_custom(None, Some(&preset)))
    }

    async fn resolve_template(
        &self,
        kind: NotificationKind,
        class_id: Option<i64>,
        custom: Option<SelectedTemplate>,
    ) -> Result<SelectedTemplate> {
        if let Some(custom) = custom {
            return Ok(select_template(Some(custom), None, None, kind));
        }

        let class_template = match class_id {
            Some(id) => self.cached_template(Some(id), kind).await?,
            None => None,
        };
        let global_template = self.cached_template(None, kind).await?;

        Ok(select_template(
            None,
            class_template.as_ref(),
            global_template.as_ref(),
            kind,
        ))
    }

    /// 先查缓存，未命中时查库并回填（包括"不存在"）
    async fn cached_template(
        &self,
        class_id: Option<i64>,
        kind: NotificationKind,
    ) -> Result<Option<SmsTemplate>> {
        let key = template_cache_key(class_id, kind);

        if let CacheResult::Found(raw) = self.cache.get_raw(&key).await {
            if raw == CACHE_NULL {
                return Ok(None);
            }
            match serde_json::from_str::<SmsTemplate>(&raw) {
                Ok(template) => return Ok(Some(template)),
                Err(e) => warn!("Discarding unreadable cached template '{}': {}", key, e),
            }
        }

        let template = self.storage.find_template(class_id, kind).await?;
        let raw = match &template {
            Some(t) => serde_json::to_string(t)?,
            None => CACHE_NULL.to_string(),
        };
        self.cache
            .insert_raw(key, raw, self.settings.template_cache_ttl)
            .await;

        Ok(template)
    }

    async fn run_batch(
        &self,
        kind: NotificationKind,
        class: Option<&Class>,
        custom: Option<SelectedTemplate>,
        dry_run: bool,
        items: Vec<BatchItem>,
        errors: Vec<String>,
    ) -> Result<NotificationReport> {
        let class_id = class.map(|c| c.id);
        let template = self.resolve_template(kind, class_id, custom).await?;
        let country_code = self.settings.default_country_code.as_str();

        let mut report = NotificationReport::new(kind, dry_run, template.source);
        report.errors.extend(errors);

        let mut outgoing = Vec::new();
        for item in items {
            let student = item.student;
            let recipients =
                match resolve_recipients(self.storage.as_ref(), &student, country_code).await {
                    Ok(recipients) => recipients,
                    Err(e) => {
                        warn!("Failed to resolve recipients for student {}: {}", student.id, e);
                        report
                            .errors
                            .push(format!("{}: {}", student.full_name, e.message()));
                        continue;
                    }
                };

            if recipients.is_empty() {
                report
                    .students_without_recipients
                    .push(student.full_name.clone());
                continue;
            }

            let mut vars = item.vars;
            vars.student(&student);
            for recipient in recipients {
                vars.parent_name(recipient.name.as_deref());
                let body = clean_message(&render_template(&template.body, &vars), country_code);
                outgoing.push(OutgoingSms {
                    student_id: Some(student.id),
                    student_name: student.full_name.clone(),
                    recipient,
                    body,
                });
            }
        }

        let outcomes = if dry_run {
            preview(outgoing)
        } else {
            let outcomes = dispatch(
                self.provider.as_ref(),
                outgoing,
                self.settings.max_concurrency,
            )
            .await;
            self.record_outcomes(kind, class_id, &template, &outcomes).await;
            outcomes
        };

        report.push_outcomes(outcomes);
        info!(
            "{} notification{}: {} sent, {} failed, {} skipped, {} without recipients",
            kind,
            if dry_run { " (dry run)" } else { "" },
            report.sent,
            report.failed,
            report.skipped,
            report.students_without_recipients.len()
        );

        Ok(report)
    }

    /// 写入发送记录，失败只记日志
    async fn record_outcomes(
        &self,
        kind: NotificationKind,
        class_id: Option<i64>,
        template: &SelectedTemplate,
        outcomes: &[SmsOutcome],
    ) {
        for outcome in outcomes {
            let success = match outcome.status {
                SmsStatus::Sent => true,
                SmsStatus::Failed => false,
                SmsStatus::Skipped | SmsStatus::Preview => continue,
            };

            let log = NewSmsLog {
                student_id: outcome.student_id,
                class_id,
                kind,
                phone: outcome.phone.clone(),
                recipient_source: outcome.source,
                template_source: template.source,
                body: outcome.body.clone(),
                success,
                provider_message_id: outcome.provider_message_id.clone(),
                error: outcome.error.clone(),
            };
            if let Err(e) = self.storage.insert_sms_log(log).await {
                warn!("Failed to record SMS log for {}: {}", outcome.phone, e);
            }
        }
    }
}

/// 校验日期格式，缺省为今天
fn resolve_date(date: Option<&str>) -> Result<String> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(date) => {
            let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")?;
            Ok(parsed.format("%Y-%m-%d").to_string())
        }
        None => Ok(chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_date() {
        assert_eq!(resolve_date(Some(" 2025-03-01 ")).unwrap(), "2025-03-01");
        assert_eq!(resolve_date(Some("")).unwrap().len(), 10);
        assert_eq!(resolve_date(Some("01/03/2025")).unwrap_err().code(), "E011");
    }

    #[test]
    fn test_attendance_status_filter() {
        let settings = NotifySettings::default();
        assert!(settings.should_notify_attendance("Absent"));
        assert!(settings.should_notify_attendance(" late "));
        assert!(!settings.should_notify_attendance("present"));
    }
}
