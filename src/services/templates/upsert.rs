use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::TemplateService;
use crate::models::sms::requests::UpsertTemplateRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::notify::{template_cache_key, validate_template_body};
use crate::services::error_response;

pub async fn upsert_template(
    service: &TemplateService,
    request: &HttpRequest,
    req: UpsertTemplateRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_template_body(&req.body) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    let storage = service.get_storage(request)?;
    let cache = service.get_cache(request)?;

    // 班级模板要求班级存在
    if let Some(class_id) = req.class_id {
        match storage.get_class_by_id(class_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::ClassNotFound,
                    format!("Class {class_id} not found"),
                )));
            }
            Err(e) => return Ok(error_response(&e, "Failed to load class")),
        }
    }

    let key = template_cache_key(req.class_id, req.kind);
    match storage.upsert_template(req).await {
        Ok(template) => {
            cache.remove(&key).await;
            info!(
                "Saved {} template {} (class {:?})",
                template.kind, template.id, template.class_id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                template,
                "Template saved successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, "Failed to save template")),
    }
}
