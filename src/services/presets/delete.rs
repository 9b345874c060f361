use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::PresetService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn delete_preset(
    service: &PresetService,
    request: &HttpRequest,
    preset_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.delete_preset(preset_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Preset deleted successfully"))),
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::PresetNotFound,
            "Preset not found",
        ))),
        Err(e) => Ok(error_response(&e, "Failed to delete preset")),
    }
}
