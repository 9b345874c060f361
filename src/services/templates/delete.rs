use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::TemplateService;
use crate::models::{ApiResponse, ErrorCode};
use crate::notify::template_cache_key;
use crate::services::error_response;

pub async fn delete_template(
    service: &TemplateService,
    request: &HttpRequest,
    template_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let cache = service.get_cache(request)?;

    match storage.delete_template(template_id).await {
        Ok(Some(template)) => {
            cache
                .remove(&template_cache_key(template.class_id, template.kind))
                .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Template deleted successfully")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TemplateNotFound,
            "Template not found",
        ))),
        Err(e) => Ok(error_response(&e, "Failed to delete template")),
    }
}
