//! 家长及家长-学生关联存储操作

use super::SeaOrmStorage;
use crate::entity::parent_students::{Column as LinkColumn, Entity as ParentStudents};
use crate::entity::parents::Entity as Parents;
use crate::errors::{PortalError, Result};
use crate::models::parents::entities::{Parent, ParentLink};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

impl SeaOrmStorage {
    pub async fn get_parent_by_id_impl(&self, id: i64) -> Result<Option<Parent>> {
        let result = Parents::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("Failed to query parent: {e}")))?;

        Ok(result.map(|m| m.into_parent()))
    }

    /// 按创建顺序返回，解析收件人时依赖这个顺序
    pub async fn list_parent_links_for_student_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<ParentLink>> {
        let links = ParentStudents::find()
            .filter(LinkColumn::StudentId.eq(student_id))
            .order_by_asc(LinkColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                PortalError::database_operation(format!("Failed to query parent links: {e}"))
            })?;

        Ok(links.into_iter().map(|m| m.into_parent_link()).collect())
    }

    pub async fn list_parent_links_for_parent_impl(
        &self,
        parent_id: i64,
    ) -> Result<Vec<ParentLink>> {
        let links = ParentStudents::find()
            .filter(LinkColumn::ParentId.eq(parent_id))
            .order_by_asc(LinkColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                PortalError::database_operation(format!("Failed to query parent links: {e}"))
            })?;

        Ok(links.into_iter().map(|m| m.into_parent_link()).collect())
    }
}
