use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "parent.ts")]
pub struct Parent {
    pub id: i64,
    pub full_name: String,
    pub phone: Option<String>,
    pub alternate_phone: Option<String>,
}

/// 家长与学生的关联
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "parent.ts")]
pub struct ParentLink {
    pub id: i64,
    pub parent_id: i64,
    pub student_id: i64,
    // mother / father / guardian ...
    pub relationship: String,
    pub contact_phone: Option<String>,
}
