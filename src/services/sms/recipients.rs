use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SmsService;
use crate::models::ApiResponse;
use crate::services::error_response;

pub async fn get_recipients(
    service: &SmsService,
    request: &HttpRequest,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let notifier = service.notifier(request)?;

    match notifier.student_recipients(student_id).await {
        Ok(recipients) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            recipients,
            "Recipients retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, "Failed to resolve recipients")),
    }
}
