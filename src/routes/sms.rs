use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, middleware, web};
use once_cell::sync::Lazy;

use crate::middlewares::RateLimit;
use crate::models::sms::requests::{
    AttendanceNotificationRequest, ClassScopeQuery, CreatePresetRequest,
    HomeworkNotificationRequest, LessonNotificationRequest, SmsLogListQuery,
    UpsertTemplateRequest,
};
use crate::services::{PresetService, SmsService, TemplateService};
use crate::utils::SafeIDI64;

// 懒加载的全局服务实例
static SMS_SERVICE: Lazy<SmsService> = Lazy::new(SmsService::new_lazy);
static TEMPLATE_SERVICE: Lazy<TemplateService> = Lazy::new(TemplateService::new_lazy);
static PRESET_SERVICE: Lazy<PresetService> = Lazy::new(PresetService::new_lazy);

// 课程结果通知
pub async fn notify_lesson(
    req: HttpRequest,
    body: web::Json<LessonNotificationRequest>,
) -> ActixResult<HttpResponse> {
    SMS_SERVICE.notify_lesson(&req, body.into_inner()).await
}

// 考勤通知
pub async fn notify_attendance(
    req: HttpRequest,
    body: web::Json<AttendanceNotificationRequest>,
) -> ActixResult<HttpResponse> {
    SMS_SERVICE.notify_attendance(&req, body.into_inner()).await
}

// 作业通知
pub async fn notify_homework(
    req: HttpRequest,
    body: web::Json<HomeworkNotificationRequest>,
) -> ActixResult<HttpResponse> {
    SMS_SERVICE.notify_homework(&req, body.into_inner()).await
}

pub async fn get_student_recipients(
    req: HttpRequest,
    path: SafeIDI64,
) -> ActixResult<HttpResponse> {
    SMS_SERVICE.get_recipients(&req, path.0).await
}

pub async fn list_templates(
    req: HttpRequest,
    query: web::Query<ClassScopeQuery>,
) -> ActixResult<HttpResponse> {
    TEMPLATE_SERVICE
        .list_templates(&req, query.into_inner())
        .await
}

pub async fn upsert_template(
    req: HttpRequest,
    body: web::Json<UpsertTemplateRequest>,
) -> ActixResult<HttpResponse> {
    TEMPLATE_SERVICE
        .upsert_template(&req, body.into_inner())
        .await
}

pub async fn delete_template(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    TEMPLATE_SERVICE.delete_template(&req, path.0).await
}

pub async fn list_presets(
    req: HttpRequest,
    query: web::Query<ClassScopeQuery>,
) -> ActixResult<HttpResponse> {
    PRESET_SERVICE.list_presets(&req, query.into_inner()).await
}

pub async fn create_preset(
    req: HttpRequest,
    body: web::Json<CreatePresetRequest>,
) -> ActixResult<HttpResponse> {
    PRESET_SERVICE.create_preset(&req, body.into_inner()).await
}

pub async fn delete_preset(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    PRESET_SERVICE.delete_preset(&req, path.0).await
}

// 发送记录
pub async fn list_logs(
    req: HttpRequest,
    query: web::Query<SmsLogListQuery>,
) -> ActixResult<HttpResponse> {
    SMS_SERVICE.list_logs(&req, query.into_inner()).await
}

// 配置路由
pub fn configure_sms_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/sms")
            .wrap(middleware::Compress::default())
            .service(
                // 发送端点共用一个限流计数
                web::scope("/notify")
                    .wrap(RateLimit::sms_dispatch())
                    .route("/lesson", web::post().to(notify_lesson))
                    .route("/attendance", web::post().to(notify_attendance))
                    .route("/homework", web::post().to(notify_homework)),
            )
            .route(
                "/students/{student_id}/recipients",
                web::get().to(get_student_recipients),
            )
            .service(
                web::resource("/templates")
                    .route(web::get().to(list_templates))
                    .route(web::put().to(upsert_template)),
            )
            .route("/templates/{template_id}", web::delete().to(delete_template))
            .service(
                web::resource("/presets")
                    .route(web::get().to(list_presets))
                    .route(web::post().to(create_preset)),
            )
            .route("/presets/{preset_id}", web::delete().to(delete_preset))
            .route("/logs", web::get().to(list_logs)),
    );
}
