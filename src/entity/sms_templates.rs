//! 短信模板实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sms_templates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    // NULL 表示全局模板
    pub class_id: Option<i64>,
    pub kind: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Class,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_sms_template(self) -> crate::models::sms::entities::SmsTemplate {
        use crate::models::sms::entities::SmsTemplate;
        use crate::notify::NotificationKind;
        use chrono::{DateTime, Utc};

        SmsTemplate {
            id: self.id,
            class_id: self.class_id,
            kind: self.kind.parse().unwrap_or(NotificationKind::LessonResult),
            body: self.body,
            is_active: self.is_active,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
