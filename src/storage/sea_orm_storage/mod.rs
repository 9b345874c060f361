//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod classes;
mod parents;
mod presets;
mod sms_logs;
mod students;
mod templates;

use crate::config::{AppConfig, DatabaseConfig};
use crate::errors::{PortalError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        Self::connect(&AppConfig::get().database).await
    }

    /// 连接数据库并执行迁移
    pub async fn connect(database: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(&database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, database).await?
        } else {
            Self::connect_generic(&db_url, database).await?
        };

        Migrator::up(&db, None)
            .await
            .map_err(|e| PortalError::database_operation(format!("Database migration failed: {e}")))?;

        info!("SeaORM storage ready, database: {}", db_url);

        Ok(Self { db })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// SQLite 连接（WAL）
    async fn connect_sqlite(url: &str, database: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| PortalError::database_config(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(database.pool_size.max(1))
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| {
                PortalError::database_connection(format!("Failed to open SQLite database: {e}"))
            })?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// PostgreSQL / MySQL
    async fn connect_generic(url: &str, database: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(database.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(database.timeout))
            .acquire_timeout(Duration::from_secs(database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .sqlx_logging(false);

        Database::connect(opt).await.map_err(|e| {
            PortalError::database_connection(format!("Failed to connect to database: {e}"))
        })
    }

    /// 从 URL 推断数据库类型
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
        {
            Ok(url.to_string())
        } else {
            Err(PortalError::database_config(format!(
                "Cannot infer database type from URL: {url}. Supported: sqlite:, postgres://, mysql:// or a .db/.sqlite path"
            )))
        }
    }

    pub(crate) fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("quran_portal.db").unwrap(),
            "sqlite://quran_portal.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/portal").unwrap(),
            "postgres://u:p@localhost/portal"
        );
        assert!(SeaOrmStorage::build_database_url("portal").is_err());
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 学生模块
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        self.get_student_by_id_impl(id).await
    }

    async fn list_students_by_class(&self, class_id: i64) -> Result<Vec<Student>> {
        self.list_students_by_class_impl(class_id).await
    }

    // 家长模块
    async fn get_parent_by_id(&self, id: i64) -> Result<Option<Parent>> {
        self.get_parent_by_id_impl(id).await
    }

    async fn list_parent_links_for_student(&self, student_id: i64) -> Result<Vec<ParentLink>> {
        self.list_parent_links_for_student_impl(student_id).await
    }

    async fn list_parent_links_for_parent(&self, parent_id: i64) -> Result<Vec<ParentLink>> {
        self.list_parent_links_for_parent_impl(parent_id).await
    }

    // 班级模块
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    // 模板模块
    async fn find_template(
        &self,
        class_id: Option<i64>,
        kind: NotificationKind,
    ) -> Result<Option<SmsTemplate>> {
        self.find_template_impl(class_id, kind).await
    }

    async fn list_templates(&self, class_id: Option<i64>) -> Result<Vec<SmsTemplate>> {
        self.list_templates_impl(class_id).await
    }

    async fn upsert_template(&self, req: UpsertTemplateRequest) -> Result<SmsTemplate> {
        self.upsert_template_impl(req).await
    }

    async fn delete_template(&self, id: i64) -> Result<Option<SmsTemplate>> {
        self.delete_template_impl(id).await
    }

    // 常用消息模块
    async fn get_preset_by_id(&self, id: i64) -> Result<Option<SmsPreset>> {
        self.get_preset_by_id_impl(id).await
    }

    async fn list_presets(&self, class_id: Option<i64>) -> Result<Vec<SmsPreset>> {
        self.list_presets_impl(class_id).await
    }

    async fn create_preset(&self, req: CreatePresetRequest) -> Result<SmsPreset> {
        self.create_preset_impl(req).await
    }

    async fn delete_preset(&self, id: i64) -> Result<bool> {
        self.delete_preset_impl(id).await
    }

    // 发送记录模块
    async fn insert_sms_log(&self, log: NewSmsLog) -> Result<()> {
        self.insert_sms_log_impl(log).await
    }

    async fn list_sms_logs_with_pagination(
        &self,
        query: SmsLogListQuery,
    ) -> Result<SmsLogListResponse> {
        self.list_sms_logs_with_pagination_impl(query).await
    }
}
