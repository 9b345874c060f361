#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rust_quran_portal::cache::ObjectCache;
use rust_quran_portal::cache::object_cache::moka::MokaCacheWrapper;
use rust_quran_portal::errors::{PortalError, Result};
use rust_quran_portal::models::PaginationInfo;
use rust_quran_portal::models::classes::entities::Class;
use rust_quran_portal::models::common::pagination::normalize_page;
use rust_quran_portal::models::parents::entities::{Parent, ParentLink};
use rust_quran_portal::models::sms::entities::{
    NewSmsLog, NotificationKind, SmsLog, SmsPreset, SmsTemplate,
};
use rust_quran_portal::models::sms::requests::{
    CreatePresetRequest, SmsLogListQuery, UpsertTemplateRequest,
};
use rust_quran_portal::models::sms::responses::SmsLogListResponse;
use rust_quran_portal::models::students::entities::Student;
use rust_quran_portal::notify::{Notifier, NotifySettings};
use rust_quran_portal::sms::{SmsProvider, SmsReceipt};
use rust_quran_portal::storage::Storage;

#[derive(Default)]
struct Tables {
    classes: Vec<Class>,
    students: Vec<Student>,
    parents: Vec<Parent>,
    links: Vec<ParentLink>,
    templates: Vec<SmsTemplate>,
    presets: Vec<SmsPreset>,
    logs: Vec<SmsLog>,
}

/// 内存存储
#[derive(Default)]
pub struct MockStorage {
    tables: Mutex<Tables>,
    pub template_queries: AtomicUsize,
    // 对这些学生的关联查询返回错误
    pub broken_students: Mutex<HashSet<i64>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&self, id: i64, name: &str, teacher: Option<&str>) {
        let now = Utc::now();
        self.tables.lock().unwrap().classes.push(Class {
            id,
            class_name: name.to_string(),
            teacher_name: teacher.map(str::to_string),
            description: None,
            created_at: now,
            updated_at: now,
        });
    }

    pub fn add_parent(&self, id: i64, name: &str, phone: Option<&str>, alternate: Option<&str>) {
        self.tables.lock().unwrap().parents.push(Parent {
            id,
            full_name: name.to_string(),
            phone: phone.map(str::to_string),
            alternate_phone: alternate.map(str::to_string),
        });
    }

    pub fn add_student(&self, student: Student) {
        self.tables.lock().unwrap().students.push(student);
    }

    pub fn add_link(&self, id: i64, parent_id: i64, student_id: i64, contact_phone: Option<&str>) {
        self.tables.lock().unwrap().links.push(ParentLink {
            id,
            parent_id,
            student_id,
            relationship: "guardian".to_string(),
            contact_phone: contact_phone.map(str::to_string),
        });
    }

    pub fn add_template(&self, class_id: Option<i64>, kind: NotificationKind, body: &str, active: bool) {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.templates.len() as i64 + 1;
        let now = Utc::now();
        tables.templates.push(SmsTemplate {
            id,
            class_id,
            kind,
            body: body.to_string(),
            is_active: active,
            created_at: now,
            updated_at: now,
        });
    }

    pub fn logs(&self) -> Vec<SmsLog> {
        self.tables.lock().unwrap().logs.clone()
    }
}

pub fn student(id: i64, name: &str, class_id: Option<i64>) -> Student {
    Student {
        id,
        full_name: name.to_string(),
        class_id,
        is_adult: false,
        phone: None,
        primary_parent_id: None,
        secondary_parent_id: None,
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.students.iter().find(|s| s.id == id).cloned())
    }

    async fn list_students_by_class(&self, class_id: i64) -> Result<Vec<Student>> {
        let tables = self.tables.lock().unwrap();
        let mut students: Vec<Student> = tables
            .students
            .iter()
            .filter(|s| s.class_id == Some(class_id))
            .cloned()
            .collect();
        students.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(students)
    }

    async fn get_parent_by_id(&self, id: i64) -> Result<Option<Parent>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.parents.iter().find(|p| p.id == id).cloned())
    }

    async fn list_parent_links_for_student(&self, student_id: i64) -> Result<Vec<ParentLink>> {
        if self.broken_students.lock().unwrap().contains(&student_id) {
            return Err(PortalError::database_operation("connection reset"));
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .links
            .iter()
            .filter(|l| l.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn list_parent_links_for_parent(&self, parent_id: i64) -> Result<Vec<ParentLink>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .links
            .iter()
            .filter(|l| l.parent_id == parent_id)
            .cloned()
            .collect())
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.classes.iter().find(|c| c.id == class_id).cloned())
    }

    async fn find_template(
        &self,
        class_id: Option<i64>,
        kind: NotificationKind,
    ) -> Result<Option<SmsTemplate>> {
        self.template_queries.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .templates
            .iter()
            .find(|t| t.class_id == class_id && t.kind == kind)
            .cloned())
    }

    async fn list_templates(&self, class_id: Option<i64>) -> Result<Vec<SmsTemplate>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .templates
            .iter()
            .filter(|t| t.class_id.is_none() || t.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn upsert_template(&self, req: UpsertTemplateRequest) -> Result<SmsTemplate> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        if let Some(existing) = tables
            .templates
            .iter_mut()
            .find(|t| t.class_id == req.class_id && t.kind == req.kind)
        {
            existing.body = req.body;
            if let Some(active) = req.is_active {
                existing.is_active = active;
            }
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let template = SmsTemplate {
            id: tables.templates.len() as i64 + 1,
            class_id: req.class_id,
            kind: req.kind,
            body: req.body,
            is_active: req.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        tables.templates.push(template.clone());
        Ok(template)
    }

    async fn delete_template(&self, id: i64) -> Result<Option<SmsTemplate>> {
        let mut tables = self.tables.lock().unwrap();
        let index = tables.templates.iter().position(|t| t.id == id);
        Ok(index.map(|i| tables.templates.remove(i)))
    }

    async fn get_preset_by_id(&self, id: i64) -> Result<Option<SmsPreset>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.presets.iter().find(|p| p.id == id).cloned())
    }

    async fn list_presets(&self, class_id: Option<i64>) -> Result<Vec<SmsPreset>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .presets
            .iter()
            .filter(|p| p.class_id.is_none() || p.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn create_preset(&self, req: CreatePresetRequest) -> Result<SmsPreset> {
        let mut tables = self.tables.lock().unwrap();
        let preset = SmsPreset {
            id: tables.presets.len() as i64 + 1,
            class_id: req.class_id,
            title: req.title,
            body: req.body,
            created_at: Utc::now(),
        };
        tables.presets.push(preset.clone());
        Ok(preset)
    }

    async fn delete_preset(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.presets.len();
        tables.presets.retain(|p| p.id != id);
        Ok(tables.presets.len() != before)
    }

    async fn insert_sms_log(&self, log: NewSmsLog) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.logs.len() as i64 + 1;
        tables.logs.push(SmsLog {
            id,
            student_id: log.student_id,
            class_id: log.class_id,
            kind: log.kind.as_str().to_string(),
            phone: log.phone,
            recipient_source: log.recipient_source.as_str().to_string(),
            template_source: log.template_source.as_str().to_string(),
            body: log.body,
            success: log.success,
            provider_message_id: log.provider_message_id,
            error: log.error,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_sms_logs_with_pagination(
        &self,
        query: SmsLogListQuery,
    ) -> Result<SmsLogListResponse> {
        let (page, size) = normalize_page(query.page, query.size);
        let tables = self.tables.lock().unwrap();
        let matching: Vec<SmsLog> = tables
            .logs
            .iter()
            .rev()
            .filter(|l| query.student_id.is_none_or(|id| l.student_id == Some(id)))
            .filter(|l| query.class_id.is_none_or(|id| l.class_id == Some(id)))
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(((page - 1) * size) as usize)
            .take(size as usize)
            .collect();
        Ok(SmsLogListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total),
        })
    }
}

/// 记录每次发送，指定号码返回失败
#[derive(Default)]
pub struct ScriptedSmsProvider {
    pub sent: Mutex<Vec<(String, String)>>,
    pub failing: Mutex<HashSet<String>>,
}

impl ScriptedSmsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, phone: &str) {
        self.failing.lock().unwrap().insert(phone.to_string());
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsProvider for ScriptedSmsProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send(&self, phone: &str, body: &str) -> Result<SmsReceipt> {
        if self.failing.lock().unwrap().contains(phone) {
            return Err(PortalError::sms_provider("Number rejected by carrier"));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((phone.to_string(), body.to_string()));
        Ok(SmsReceipt {
            message_id: Some(format!("msg-{}", sent.len())),
        })
    }
}

pub fn memory_cache() -> Arc<dyn ObjectCache> {
    Arc::new(MokaCacheWrapper::with_settings(1_000, 300))
}

pub fn notifier(
    storage: Arc<MockStorage>,
    cache: Arc<dyn ObjectCache>,
    provider: Arc<ScriptedSmsProvider>,
) -> Notifier {
    Notifier::new(storage, cache, provider, NotifySettings::default())
}
