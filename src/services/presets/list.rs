use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::PresetService;
use crate::models::ApiResponse;
use crate::models::sms::requests::ClassScopeQuery;
use crate::models::sms::responses::PresetListResponse;
use crate::services::error_response;

pub async fn list_presets(
    service: &PresetService,
    request: &HttpRequest,
    query: ClassScopeQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.list_presets(query.class_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            PresetListResponse { items },
            "Presets retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, "Failed to list presets")),
    }
}
