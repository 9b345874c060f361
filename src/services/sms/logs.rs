use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SmsService;
use crate::models::ApiResponse;
use crate::models::sms::requests::SmsLogListQuery;
use crate::services::error_response;

pub async fn list_logs(
    service: &SmsService,
    request: &HttpRequest,
    query: SmsLogListQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.list_sms_logs_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "SMS logs retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, "Failed to list SMS logs")),
    }
}
