use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::PresetService;
use crate::models::sms::requests::CreatePresetRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::utils::validate::validate_preset;

pub async fn create_preset(
    service: &PresetService,
    request: &HttpRequest,
    mut req: CreatePresetRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_preset(&req.title, &req.body) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }
    req.title = req.title.trim().to_string();

    let storage = service.get_storage(request)?;

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

    match storage.create_preset(req).await {
        Ok(preset) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(preset, "Preset created successfully"))),
        Err(e) => Ok(error_response(&e, "Failed to create preset")),
    }
}
