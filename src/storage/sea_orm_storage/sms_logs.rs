//! 短信发送记录存储操作

use super::SeaOrmStorage;
use crate::entity::sms_logs::{ActiveModel, Column, Entity as SmsLogs};
use crate::errors::{PortalError, Result};
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    sms::{entities::NewSmsLog, requests::SmsLogListQuery, responses::SmsLogListResponse},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn insert_sms_log_impl(&self, log: NewSmsLog) -> Result<()> {
        let model = ActiveModel {
            student_id: Set(log.student_id),
            class_id: Set(log.class_id),
            kind: Set(log.kind.as_str().to_string()),
            phone: Set(log.phone),
            recipient_source: Set(log.recipient_source.as_str().to_string()),
            template_source: Set(log.template_source.as_str().to_string()),
            body: Set(log.body),
            success: Set(log.success),
            provider_message_id: Set(log.provider_message_id),
            error: Set(log.error),
            created_at: Set(Self::now()),
            ..Default::default()
        };

        model
            .insert(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("Failed to write SMS log: {e}")))?;

        Ok(())
    }

    /// 分页列出发送记录，最新的在前
    pub async fn list_sms_logs_with_pagination_impl(
        &self,
        query: SmsLogListQuery,
    ) -> Result<SmsLogListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = SmsLogs::find();
        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        select = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size as u64);
        let total = paginator.num_items().await.map_err(|e| {
            PortalError::database_operation(format!("Failed to count SMS logs: {e}"))
        })?;

        let logs = paginator
            .fetch_page((page - 1) as u64)
            .await
            .map_err(|e| PortalError::database_operation(format!("Failed to list SMS logs: {e}")))?;

        Ok(SmsLogListResponse {
            items: logs.into_iter().map(|m| m.into_sms_log()).collect(),
            pagination: PaginationInfo::new(page, size, total as i64),
        })
    }
}
