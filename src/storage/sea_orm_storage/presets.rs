//! 常用消息存储操作

use super::SeaOrmStorage;
use crate::entity::sms_presets::{ActiveModel, Column, Entity as SmsPresets};
use crate::errors::{PortalError, Result};
use crate::models::sms::{entities::SmsPreset, requests::CreatePresetRequest};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn get_preset_by_id_impl(&self, id: i64) -> Result<Option<SmsPreset>> {
        let result = SmsPresets::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("Failed to query preset: {e}")))?;

        Ok(result.map(|m| m.into_sms_preset()))
    }

    pub async fn list_presets_impl(&self, class_id: Option<i64>) -> Result<Vec<SmsPreset>> {
        let condition = match class_id {
            Some(id) => Condition::any()
                .add(Column::ClassId.is_null())
                .add(Column::ClassId.eq(id)),
            None => Condition::all().add(Column::ClassId.is_null()),
        };

        let presets = SmsPresets::find()
            .filter(condition)
            .order_by_asc(Column::Title)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("Failed to list presets: {e}")))?;

        Ok(presets.into_iter().map(|m| m.into_sms_preset()).collect())
    }

    pub async fn create_preset_impl(&self, req: CreatePresetRequest) -> Result<SmsPreset> {
        let model = ActiveModel {
            class_id: Set(req.class_id),
            title: Set(req.title),
            body: Set(req.body),
            created_at: Set(Self::now()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("Failed to create preset: {e}")))?;

        Ok(result.into_sms_preset())
    }

    pub async fn delete_preset_impl(&self, id: i64) -> Result<bool> {
        let result = SmsPresets::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("Failed to delete preset: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
