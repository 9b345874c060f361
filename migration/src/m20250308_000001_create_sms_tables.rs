use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 短信模板表 ====================
        // class_id 为空表示全局模板
        manager
            .create_table(
                Table::create()
                    .table(SmsTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SmsTemplates::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SmsTemplates::ClassId).big_integer().null())
                    .col(ColumnDef::new(SmsTemplates::Kind).string().not_null())
                    .col(ColumnDef::new(SmsTemplates::Body).text().not_null())
                    .col(
                        ColumnDef::new(SmsTemplates::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SmsTemplates::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SmsTemplates::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(SmsTemplates::Table, SmsTemplates::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 常用消息表 ====================
        manager
            .create_table(
                Table::create()
                    .table(SmsPresets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SmsPresets::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SmsPresets::ClassId).big_integer().null())
                    .col(ColumnDef::new(SmsPresets::Title).string().not_null())
                    .col(ColumnDef::new(SmsPresets::Body).text().not_null())
                    .col(
                        ColumnDef::new(SmsPresets::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(SmsPresets::Table, SmsPresets::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 发送记录表 ====================
        manager
            .create_table(
                Table::create()
                    .table(SmsLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SmsLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SmsLogs::StudentId).big_integer().null())
                    .col(ColumnDef::new(SmsLogs::ClassId).big_integer().null())
                    .col(ColumnDef::new(SmsLogs::Kind).string().not_null())
                    .col(ColumnDef::new(SmsLogs::Phone).string().not_null())
                    .col(ColumnDef::new(SmsLogs::RecipientSource).string().not_null())
                    .col(ColumnDef::new(SmsLogs::TemplateSource).string().not_null())
                    .col(ColumnDef::new(SmsLogs::Body).text().not_null())
                    .col(ColumnDef::new(SmsLogs::Success).boolean().not_null())
                    .col(
                        ColumnDef::new(SmsLogs::ProviderMessageId)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(SmsLogs::Error).text().null())
                    .col(ColumnDef::new(SmsLogs::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sms_templates_class_kind")
                    .table(SmsTemplates::Table)
                    .col(SmsTemplates::ClassId)
                    .col(SmsTemplates::Kind)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sms_logs_student_id")
                    .table(SmsLogs::Table)
                    .col(SmsLogs::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sms_logs_created_at")
                    .table(SmsLogs::Table)
                    .col(SmsLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SmsLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SmsPresets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SmsTemplates::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Classes {
    #[sea_orm(iden = "classes")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum SmsTemplates {
    #[sea_orm(iden = "sms_templates")]
    Table,
    Id,
    ClassId,
    Kind,
    Body,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SmsPresets {
    #[sea_orm(iden = "sms_presets")]
    Table,
    Id,
    ClassId,
    Title,
    Body,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SmsLogs {
    #[sea_orm(iden = "sms_logs")]
    Table,
    Id,
    StudentId,
    ClassId,
    Kind,
    Phone,
    RecipientSource,
    TemplateSource,
    Body,
    Success,
    ProviderMessageId,
    Error,
    CreatedAt,
}
