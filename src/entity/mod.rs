//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层查询这些实体，然后转换为 models 中的业务实体。

pub mod classes;
pub mod parent_students;
pub mod parents;
pub mod sms_logs;
pub mod sms_presets;
pub mod sms_templates;
pub mod students;
