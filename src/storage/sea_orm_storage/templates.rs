//! 短信模板存储操作

use super::SeaOrmStorage;
use crate::entity::sms_templates::{ActiveModel, Column, Entity as SmsTemplates, Model};
use crate::errors::{PortalError, Result};
use crate::models::sms::{
    entities::{NotificationKind, SmsTemplate},
    requests::UpsertTemplateRequest,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

impl SeaOrmStorage {
    async fn find_template_model(
        &self,
        class_id: Option<i64>,
        kind: NotificationKind,
    ) -> Result<Option<Model>> {
        let select = SmsTemplates::find().filter(Column::Kind.eq(kind.as_str()));
        let select = match class_id {
            Some(id) => select.filter(Column::ClassId.eq(id)),
            None => select.filter(Column::ClassId.is_null()),
        };

        select
            .order_by_desc(Column::UpdatedAt)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("Failed to query template: {e}")))
    }

    pub async fn find_template_impl(
        &self,
        class_id: Option<i64>,
        kind: NotificationKind,
    ) -> Result<Option<SmsTemplate>> {
        Ok(self
            .find_template_model(class_id, kind)
            .await?
            .map(|m| m.into_sms_template()))
    }

    /// 全局模板在前，班级模板在后
    pub async fn list_templates_impl(&self, class_id: Option<i64>) -> Result<Vec<SmsTemplate>> {
        let condition = match class_id {
            Some(id) => Condition::any()
                .add(Column::ClassId.is_null())
                .add(Column::ClassId.eq(id)),
            None => Condition::all().add(Column::ClassId.is_null()),
        };

        let templates = SmsTemplates::find()
            .filter(condition)
            .order_by_asc(Column::ClassId)
            .order_by_asc(Column::Kind)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("Failed to list templates: {e}")))?;

        Ok(templates.into_iter().map(|m| m.into_sms_template()).collect())
    }

    /// 同一 (class_id, kind) 只保留一条模板
    pub async fn upsert_template_impl(&self, req: UpsertTemplateRequest) -> Result<SmsTemplate> {
        let now = Self::now();

        let saved = match self.find_template_model(req.class_id, req.kind).await? {
            Some(existing) => {
                let mut model = existing.into_active_model();
                model.body = Set(req.body);
                if let Some(is_active) = req.is_active {
                    model.is_active = Set(is_active);
                }
                model.updated_at = Set(now);
                model.update(&self.db).await.map_err(|e| {
                    PortalError::database_operation(format!("Failed to update template: {e}"))
                })?
            }
            None => {
                let model = ActiveModel {
                    class_id: Set(req.class_id),
                    kind: Set(req.kind.as_str().to_string()),
                    body: Set(req.body),
                    is_active: Set(req.is_active.unwrap_or(true)),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                model.insert(&self.db).await.map_err(|e| {
                    PortalError::database_operation(format!("Failed to create template: {e}"))
                })?
            }
        };

        Ok(saved.into_sms_template())
    }

    pub async fn delete_template_impl(&self, id: i64) -> Result<Option<SmsTemplate>> {
        let Some(existing) = SmsTemplates::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("Failed to query template: {e}")))?
        else {
            return Ok(None);
        };

        SmsTemplates::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("Failed to delete template: {e}")))?;

        Ok(Some(existing.into_sms_template()))
    }
}
