use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::TemplateService;
use crate::models::ApiResponse;
use crate::models::sms::entities::NotificationKind;
use crate::models::sms::requests::ClassScopeQuery;
use crate::models::sms::responses::{DefaultTemplate, TemplateListResponse};
use crate::notify::template::{TEMPLATE_VARIABLES, default_template};
use crate::services::error_response;

pub async fn list_templates(
    service: &TemplateService,
    request: &HttpRequest,
    query: ClassScopeQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let items = match storage.list_templates(query.class_id).await {
        Ok(items) => items,
        Err(e) => return Ok(error_response(&e, "Failed to list templates")),
    };

    let defaults = NotificationKind::ALL
        .iter()
        .map(|kind| DefaultTemplate {
            kind: *kind,
            body: default_template(*kind).to_string(),
        })
        .collect();

    let response = TemplateListResponse {
        items,
        defaults,
        variables: TEMPLATE_VARIABLES.iter().map(|v| v.to_string()).collect(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Templates retrieved successfully",
    )))
}
