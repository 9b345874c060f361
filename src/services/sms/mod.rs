pub mod logs;
pub mod notify;
pub mod recipients;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::{app_cache, app_sms_provider, app_storage};
use crate::cache::ObjectCache;
use crate::config::AppConfig;
use crate::models::sms::requests::{
    AttendanceNotificationRequest, HomeworkNotificationRequest, LessonNotificationRequest,
    SmsLogListQuery,
};
use crate::notify::{Notifier, NotifySettings};
use crate::sms::SmsProvider;
use crate::storage::Storage;

pub struct SmsService {
    storage: Option<Arc<dyn Storage>>,
    cache: Option<Arc<dyn ObjectCache>>,
    provider: Option<Arc<dyn SmsProvider>>,
}

impl SmsService {
    pub fn new_lazy() -> Self {
        Self {
            storage: None,
            cache: None,
            provider: None,
        }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => app_storage(request),
        }
    }

    pub(crate) fn get_cache(&self, request: &HttpRequest) -> ActixResult<Arc<dyn ObjectCache>> {
        match &self.cache {
            Some(cache) => Ok(cache.clone()),
            None => app_cache(request),
        }
    }

    pub(crate) fn get_provider(&self, request: &HttpRequest) -> ActixResult<Arc<dyn SmsProvider>> {
        match &self.provider {
            Some(provider) => Ok(provider.clone()),
            None => app_sms_provider(request),
        }
    }

    /// 按当前配置组装通知编排器
    pub(crate) fn notifier(&self, request: &HttpRequest) -> ActixResult<Notifier> {
        Ok(Notifier::new(
            self.get_storage(request)?,
            self.get_cache(request)?,
            self.get_provider(request)?,
            NotifySettings::from_config(AppConfig::get()),
        ))
    }

    // 课程结果通知
    pub async fn notify_lesson(
        &self,
        request: &HttpRequest,
        req: LessonNotificationRequest,
    ) -> ActixResult<HttpResponse> {
        notify::notify_lesson(self, request, req).await
    }

    // 考勤通知
    pub async fn notify_attendance(
        &self,
        request: &HttpRequest,
        req: AttendanceNotificationRequest,
    ) -> ActixResult<HttpResponse> {
        notify::notify_attendance(self, request, req).await
    }

    // 作业通知
    pub async fn notify_homework(
        &self,
        request: &HttpRequest,
        req: HomeworkNotificationRequest,
    ) -> ActixResult<HttpResponse> {
        notify::notify_homework(self, request, req).await
    }

    // 查看学生的收件人
    pub async fn get_recipients(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        recipients::get_recipients(self, request, student_id).await
    }

    // 发送记录
    pub async fn list_logs(
        &self,
        request: &HttpRequest,
        query: SmsLogListQuery,
    ) -> ActixResult<HttpResponse> {
        logs::list_logs(self, request, query).await
    }
}
