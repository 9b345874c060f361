pub mod create;
pub mod delete;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::app_storage;
use crate::models::sms::requests::{ClassScopeQuery, CreatePresetRequest};
use crate::storage::Storage;

pub struct PresetService {
    storage: Option<Arc<dyn Storage>>,
}

impl PresetService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => app_storage(request),
        }
    }

    pub async fn list_presets(
        &self,
        request: &HttpRequest,
        query: ClassScopeQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_presets(self, request, query).await
    }

    pub async fn create_preset(
        &self,
        request: &HttpRequest,
        req: CreatePresetRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_preset(self, request, req).await
    }

    pub async fn delete_preset(
        &self,
        request: &HttpRequest,
        preset_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_preset(self, request, preset_id).await
    }
}
