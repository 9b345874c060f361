//! 短信发送记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sms_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: Option<i64>,
    pub class_id: Option<i64>,
    pub kind: String,
    pub phone: String,
    pub recipient_source: String,
    pub template_source: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub success: bool,
    pub provider_message_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub error: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_sms_log(self) -> crate::models::sms::entities::SmsLog {
        use crate::models::sms::entities::SmsLog;
        use chrono::{DateTime, Utc};

        SmsLog {
            id: self.id,
            student_id: self.student_id,
            class_id: self.class_id,
            kind: self.kind,
            phone: self.phone,
            recipient_source: self.recipient_source,
            template_source: self.template_source,
            body: self.body,
            success: self.success,
            provider_message_id: self.provider_message_id,
            error: self.error,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
