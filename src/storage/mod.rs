use std::sync::Arc;

use crate::models::{
    classes::entities::Class,
    parents::entities::{Parent, ParentLink},
    sms::{
        entities::{NewSmsLog, NotificationKind, SmsPreset, SmsTemplate},
        requests::{CreatePresetRequest, SmsLogListQuery, UpsertTemplateRequest},
        responses::SmsLogListResponse,
    },
    students::entities::Student,
};

use crate::errors::Result;

pub mod sea_orm_storage;

/// 关系数据存储
///
/// 通知逻辑只依赖这些简单的按条件查询，测试中可以用内存实现替换。
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 学生
    // 通过ID获取学生
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>>;
    // 列出班级内的学生（按姓名排序）
    async fn list_students_by_class(&self, class_id: i64) -> Result<Vec<Student>>;

    /// 家长
    async fn get_parent_by_id(&self, id: i64) -> Result<Option<Parent>>;
    // 学生的全部家长关联
    async fn list_parent_links_for_student(&self, student_id: i64) -> Result<Vec<ParentLink>>;
    // 家长的全部学生关联
    async fn list_parent_links_for_parent(&self, parent_id: i64) -> Result<Vec<ParentLink>>;

    /// 班级
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;

    /// 短信模板
    // class_id 为 None 时查询全局模板，包括未启用的
    async fn find_template(
        &self,
        class_id: Option<i64>,
        kind: NotificationKind,
    ) -> Result<Option<SmsTemplate>>;
    // 全局模板 + 指定班级模板
    async fn list_templates(&self, class_id: Option<i64>) -> Result<Vec<SmsTemplate>>;
    async fn upsert_template(&self, req: UpsertTemplateRequest) -> Result<SmsTemplate>;
    // 返回被删除的模板，便于失效缓存
    async fn delete_template(&self, id: i64) -> Result<Option<SmsTemplate>>;

    /// 常用消息
    async fn get_preset_by_id(&self, id: i64) -> Result<Option<SmsPreset>>;
    async fn list_presets(&self, class_id: Option<i64>) -> Result<Vec<SmsPreset>>;
    async fn create_preset(&self, req: CreatePresetRequest) -> Result<SmsPreset>;
    async fn delete_preset(&self, id: i64) -> Result<bool>;

    /// 发送记录
    async fn insert_sms_log(&self, log: NewSmsLog) -> Result<()>;
    async fn list_sms_logs_with_pagination(
        &self,
        query: SmsLogListQuery,
    ) -> Result<SmsLogListResponse>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
