pub mod presets;
pub mod sms;
pub mod templates;

pub use presets::PresetService;
pub use sms::SmsService;
pub use templates::TemplateService;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, error, web};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::errors::PortalError;
use crate::models::{ApiResponse, ErrorCode};
use crate::sms::SmsProvider;
use crate::storage::Storage;

// 从 app_data 中取出共享组件
pub(crate) fn app_storage(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| error::ErrorInternalServerError("Storage not found in app data"))
}

pub(crate) fn app_cache(request: &HttpRequest) -> ActixResult<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| error::ErrorInternalServerError("Cache not found in app data"))
}

pub(crate) fn app_sms_provider(request: &HttpRequest) -> ActixResult<Arc<dyn SmsProvider>> {
    request
        .app_data::<web::Data<Arc<dyn SmsProvider>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| error::ErrorInternalServerError("SMS provider not found in app data"))
}

/// 业务错误转换为 HTTP 响应
pub(crate) fn error_response(err: &PortalError, context: &str) -> HttpResponse {
    match err {
        PortalError::StudentNotFound(msg) => HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::StudentNotFound, msg.as_str())),
        PortalError::ClassNotFound(msg) => HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::ClassNotFound, msg.as_str())),
        PortalError::PresetNotFound(msg) => HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::PresetNotFound, msg.as_str())),
        PortalError::NotFound(msg) => HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::NotFound, msg.as_str())),
        PortalError::Validation(msg) => HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg.as_str())),
        PortalError::DateParse(msg) => HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            format!("Invalid date, expected YYYY-MM-DD: {msg}"),
        )),
        _ => HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            format!("{context}: {err}"),
        )),
    }
}
