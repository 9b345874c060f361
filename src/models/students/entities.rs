use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct Student {
    pub id: i64,
    pub full_name: String,
    pub class_id: Option<i64>,
    // 成年学员可以直接接收短信
    pub is_adult: bool,
    pub phone: Option<String>,
    pub primary_parent_id: Option<i64>,
    pub secondary_parent_id: Option<i64>,
}

impl Student {
    /// 名字的第一个词
    pub fn first_name(&self) -> &str {
        self.full_name
            .split_whitespace()
            .next()
            .unwrap_or(self.full_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_name() {
        let student = Student {
            id: 1,
            full_name: "  Yusuf Ahmed Khan".to_string(),
            class_id: None,
            is_adult: false,
            phone: None,
            primary_parent_id: None,
            secondary_parent_id: None,
        };
        assert_eq!(student.first_name(), "Yusuf");
    }
}
