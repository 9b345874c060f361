pub mod delete;
pub mod list;
pub mod upsert;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::{app_cache, app_storage};
use crate::cache::ObjectCache;
use crate::models::sms::requests::{ClassScopeQuery, UpsertTemplateRequest};
use crate::storage::Storage;

pub struct TemplateService {
    storage: Option<Arc<dyn Storage>>,
    cache: Option<Arc<dyn ObjectCache>>,
}

impl TemplateService {
    pub fn new_lazy() -> Self {
        Self {
            storage: None,
            cache: None,
        }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => app_storage(request),
        }
    }

    pub(crate) fn get_cache(&self, request: &HttpRequest) -> ActixResult<Arc<dyn ObjectCache>> {
        match &self.cache {
            Some(cache) => Ok(cache.clone()),
            None => app_cache(request),
        }
    }

    // 列出模板，附带内置默认模板与可用变量
    pub async fn list_templates(
        &self,
        request: &HttpRequest,
        query: ClassScopeQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_templates(self, request, query).await
    }

    // 保存模板
    pub async fn upsert_template(
        &self,
        request: &HttpRequest,
        req: UpsertTemplateRequest,
    ) -> ActixResult<HttpResponse> {
        upsert::upsert_template(self, request, req).await
    }

    pub async fn delete_template(
        &self,
        request: &HttpRequest,
        template_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_template(self, request, template_id).await
    }
}
