use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::SmsService;
use crate::errors::Result;
use crate::models::sms::requests::{
    AttendanceNotificationRequest, HomeworkNotificationRequest, LessonNotificationRequest,
};
use crate::models::sms::responses::NotificationReport;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn notify_lesson(
    service: &SmsService,
    request: &HttpRequest,
    req: LessonNotificationRequest,
) -> ActixResult<HttpResponse> {
    let notifier = service.notifier(request)?;
    Ok(report_response(notifier.notify_lesson(req).await))
}

pub async fn notify_attendance(
    service: &SmsService,
    request: &HttpRequest,
    req: AttendanceNotificationRequest,
) -> ActixResult<HttpResponse> {
    if req.records.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "records must not be empty",
        )));
    }

    let notifier = service.notifier(request)?;
    Ok(report_response(notifier.notify_attendance(req).await))
}

pub async fn notify_homework(
    service: &SmsService,
    request: &HttpRequest,
    req: HomeworkNotificationRequest,
) -> ActixResult<HttpResponse> {
    if req.student_ids.as_ref().is_some_and(|ids| ids.is_empty()) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "student_ids must not be empty when provided",
        )));
    }

    let notifier = service.notifier(request)?;
    Ok(report_response(notifier.notify_homework(req).await))
}

/// 报告转换为响应
///
/// 部分失败仍返回 200，由 code 区分；全部失败返回 502。
pub(crate) fn report_response(result: Result<NotificationReport>) -> HttpResponse {
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            error!("SMS notification failed: {}", e);
            return error_response(&e, "Failed to send notification");
        }
    };

    if report.is_unaddressed() {
        if report.errors.is_empty() && report.students_without_recipients.is_empty() {
            return HttpResponse::Ok().json(ApiResponse::success(report, "Nothing to send"));
        }
        return HttpResponse::UnprocessableEntity().json(ApiResponse::error(
            ErrorCode::NoRecipients,
            report,
            "No valid recipients found",
        ));
    }

    // 预览不会调用服务商，预检失败的条目只在 data 中体现
    if report.dry_run {
        let message = format!("{} message(s) previewed", report.total);
        return HttpResponse::Ok().json(ApiResponse::success(report, message));
    }

    if report.all_failed() {
        return HttpResponse::BadGateway().json(ApiResponse::error(
            ErrorCode::SmsDispatchFailed,
            report,
            "All messages failed to send",
        ));
    }

    if report.partially_failed() {
        let message = format!("{} of {} messages failed", report.failed, report.total);
        return HttpResponse::Ok().json(ApiResponse::error(
            ErrorCode::SmsPartiallySent,
            report,
            message,
        ));
    }

    let message = format!("{} message(s) sent", report.sent);
    HttpResponse::Ok().json(ApiResponse::success(report, message))
}
