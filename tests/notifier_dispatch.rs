mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use common::{MockStorage, ScriptedSmsProvider, memory_cache, notifier, student};
use rust_quran_portal::cache::ObjectCache;
use rust_quran_portal::models::sms::entities::{NotificationKind, TemplateSource};
use rust_quran_portal::models::sms::requests::{
    AttendanceNotificationRequest, AttendanceRecord, CreatePresetRequest,
    HomeworkNotificationRequest, LessonNotificationRequest,
};
use rust_quran_portal::models::sms::responses::SmsStatus;
use rust_quran_portal::notify::template_cache_key;
use rust_quran_portal::storage::Storage;

/// 班级 1：Yusuf 有两位家长，Maryam 没有联系方式，Zaid 有一位家长
fn seeded_storage() -> Arc<MockStorage> {
    let storage = MockStorage::new();
    storage.add_class(1, "Hifz A", Some("Ustadh Bilal"));
    storage.add_parent(10, "Khadija", Some("07700900001"), None);
    storage.add_parent(11, "Omar", Some("07700900002"), None);
    storage.add_parent(12, "Fatima", Some("07700900009"), None);

    let mut yusuf = student(1, "Yusuf Ahmed", Some(1));
    yusuf.primary_parent_id = Some(10);
    yusuf.secondary_parent_id = Some(11);
    storage.add_student(yusuf);
    storage.add_student(student(2, "Maryam", Some(1)));
    let mut zaid = student(3, "Zaid", Some(1));
    zaid.primary_parent_id = Some(12);
    storage.add_student(zaid);

    Arc::new(storage)
}

fn lesson_request() -> LessonNotificationRequest {
    LessonNotificationRequest {
        student_id: 1,
        date: Some("2025-03-01".to_string()),
        surah: Some("Al-Mulk".to_string()),
        from_verse: Some(1),
        to_verse: Some(5),
        outcome: Some("Excellent".to_string()),
        ..Default::default()
    }
}

fn homework_request() -> HomeworkNotificationRequest {
    HomeworkNotificationRequest {
        class_id: 1,
        homework_title: "Memorise Surah Al-Asr".to_string(),
        date: Some("2025-03-01".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn lesson_uses_default_template_for_every_parent() {
    let storage = seeded_storage();
    let provider = Arc::new(ScriptedSmsProvider::new());
    let notifier = notifier(storage.clone(), memory_cache(), provider.clone());

    let report = notifier.notify_lesson(lesson_request()).await.unwrap();

    assert_eq!(report.template_source, TemplateSource::Default);
    assert_eq!((report.sent, report.failed), (2, 0));
    assert_eq!(
        provider.sent(),
        vec![
            (
                "+447700900001".to_string(),
                "Assalamu alaikum Khadija. Yusuf Ahmed's lesson on 2025-03-01: Surah Al-Mulk, verses 1-5. Result: Excellent.".to_string()
            ),
            (
                "+447700900002".to_string(),
                "Assalamu alaikum Omar. Yusuf Ahmed's lesson on 2025-03-01: Surah Al-Mulk, verses 1-5. Result: Excellent.".to_string()
            ),
        ]
    );

    let logs = storage.logs();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|l| l.success && l.kind == "lesson_result"));
    // 未指定班级时使用学生所在班级
    assert!(logs.iter().all(|l| l.class_id == Some(1)));
}

#[tokio::test]
async fn dry_run_previews_without_sending_or_logging() {
    let storage = seeded_storage();
    let provider = Arc::new(ScriptedSmsProvider::new());
    let notifier = notifier(storage.clone(), memory_cache(), provider.clone());

    let mut req = homework_request();
    req.dry_run = true;
    let report = notifier.notify_homework(req).await.unwrap();

    assert!(report.dry_run);
    assert_eq!(report.total, 3);
    assert!(report.messages.iter().all(|m| m.status == SmsStatus::Preview));
    assert_eq!(report.students_without_recipients, vec!["Maryam"]);
    assert!(provider.sent().is_empty());
    assert!(storage.logs().is_empty());

    let zaid = report
        .messages
        .iter()
        .find(|m| m.student_name == "Zaid")
        .unwrap();
    assert_eq!(
        zaid.body,
        "Assalamu alaikum Fatima. Homework for Zaid (Hifz A): Memorise Surah Al-Asr."
    );
}

#[tokio::test]
async fn one_failing_number_does_not_stop_the_batch() {
    let storage = seeded_storage();
    let provider = Arc::new(ScriptedSmsProvider::new());
    provider.fail_for("+447700900009");
    let notifier = notifier(storage.clone(), memory_cache(), provider.clone());

    let report = notifier.notify_homework(homework_request()).await.unwrap();

    assert_eq!((report.sent, report.failed), (2, 1));
    assert!(report.partially_failed());
    assert!(
        report
            .errors
            .contains(&"+447700900009: Number rejected by carrier".to_string())
    );

    let logs = storage.logs();
    assert_eq!(logs.len(), 3);
    let failed: Vec<_> = logs.iter().filter(|l| !l.success).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].phone, "+447700900009");
    assert_eq!(failed[0].error.as_deref(), Some("Number rejected by carrier"));
}

#[tokio::test]
async fn storage_error_for_one_student_is_reported_not_raised() {
    let storage = seeded_storage();
    storage.broken_students.lock().unwrap().insert(3);
    let provider = Arc::new(ScriptedSmsProvider::new());
    let notifier = notifier(storage.clone(), memory_cache(), provider.clone());

    let mut req = homework_request();
    req.student_ids = Some(vec![1, 3, 404]);
    let report = notifier.notify_homework(req).await.unwrap();

    assert_eq!(report.sent, 2);
    assert!(report.errors.iter().any(|e| e.starts_with("Zaid: ")));
    assert!(report.errors.contains(&"Student 404 not found".to_string()));
}

#[tokio::test]
async fn attendance_only_notifies_configured_statuses() {
    let storage = seeded_storage();
    storage.add_template(
        Some(1),
        NotificationKind::Attendance,
        "Salaam {parent_name}, {student_first_name} was {status} today ({date}).",
        true,
    );
    let provider = Arc::new(ScriptedSmsProvider::new());
    let notifier = notifier(storage.clone(), memory_cache(), provider.clone());

    let report = notifier
        .notify_attendance(AttendanceNotificationRequest {
            class_id: 1,
            date: Some("2025-03-02".to_string()),
            records: vec![
                AttendanceRecord {
                    student_id: 1,
                    status: "Absent".to_string(),
                },
                AttendanceRecord {
                    student_id: 3,
                    status: "present".to_string(),
                },
                AttendanceRecord {
                    student_id: 99,
                    status: "late".to_string(),
                },
            ],
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(report.template_source, TemplateSource::Class);
    assert_eq!(report.sent, 2);
    assert_eq!(report.errors, vec!["Student 99 not found"]);
    let phones: HashSet<String> = provider.sent().into_iter().map(|(p, _)| p).collect();
    assert!(!phones.contains("+447700900009"));
    assert_eq!(
        provider.sent()[0].1,
        "Salaam Khadija, Yusuf was absent today (2025-03-02)."
    );
}

#[tokio::test]
async fn inactive_class_template_falls_back_to_global() {
    let storage = seeded_storage();
    storage.add_template(Some(1), NotificationKind::Homework, "Class: {homework_title}", false);
    storage.add_template(None, NotificationKind::Homework, "Global: {homework_title}", true);
    let provider = Arc::new(ScriptedSmsProvider::new());
    let notifier = notifier(storage.clone(), memory_cache(), provider.clone());

    let mut req = homework_request();
    req.student_ids = Some(vec![3]);
    let report = notifier.notify_homework(req).await.unwrap();

    assert_eq!(report.template_source, TemplateSource::Global);
    assert_eq!(provider.sent()[0].1, "Global: Memorise Surah Al-Asr");
}

#[tokio::test]
async fn template_lookups_are_cached_including_misses() {
    let storage = seeded_storage();
    let cache = memory_cache();
    let provider = Arc::new(ScriptedSmsProvider::new());
    let notifier = notifier(storage.clone(), cache.clone(), provider.clone());

    let first = notifier.notify_lesson(lesson_request()).await.unwrap();
    assert_eq!(first.template_source, TemplateSource::Default);
    // 班级 + 全局
    assert_eq!(storage.template_queries.load(Ordering::SeqCst), 2);

    // 直接写库，不经过缓存失效
    storage.add_template(
        Some(1),
        NotificationKind::LessonResult,
        "Lesson update for {student_name}",
        true,
    );
    let second = notifier.notify_lesson(lesson_request()).await.unwrap();
    assert_eq!(second.template_source, TemplateSource::Default);
    assert_eq!(storage.template_queries.load(Ordering::SeqCst), 2);

    cache
        .remove(&template_cache_key(Some(1), NotificationKind::LessonResult))
        .await;
    let third = notifier.notify_lesson(lesson_request()).await.unwrap();
    assert_eq!(third.template_source, TemplateSource::Class);
    assert_eq!(storage.template_queries.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn custom_message_beats_preset_and_templates() {
    let storage = seeded_storage();
    storage.add_template(Some(1), NotificationKind::LessonResult, "Class template", true);
    let preset = storage
        .create_preset(CreatePresetRequest {
            class_id: None,
            title: "Eid".to_string(),
            body: "No class on {date}, Eid Mubarak.".to_string(),
        })
        .await
        .unwrap();
    let provider = Arc::new(ScriptedSmsProvider::new());
    let notifier = notifier(storage.clone(), memory_cache(), provider.clone());

    let mut req = lesson_request();
    req.custom_message = Some("Jazakallah {parent_name}! {unknown}".to_string());
    req.preset_id = Some(preset.id);
    let report = notifier.notify_lesson(req).await.unwrap();
    assert_eq!(report.template_source, TemplateSource::Custom);
    assert_eq!(report.messages[0].body, "Jazakallah Khadija! {unknown}");

    let mut req = lesson_request();
    req.preset_id = Some(preset.id);
    let report = notifier.notify_lesson(req).await.unwrap();
    assert_eq!(report.template_source, TemplateSource::Preset);
    assert_eq!(report.messages[0].body, "No class on 2025-03-01, Eid Mubarak.");
}

#[tokio::test]
async fn request_level_errors() {
    let storage = seeded_storage();
    let provider = Arc::new(ScriptedSmsProvider::new());
    let notifier = notifier(storage.clone(), memory_cache(), provider.clone());

    let mut req = lesson_request();
    req.student_id = 404;
    assert_eq!(notifier.notify_lesson(req).await.unwrap_err().code(), "E012");

    let mut req = lesson_request();
    req.preset_id = Some(77);
    assert_eq!(notifier.notify_lesson(req).await.unwrap_err().code(), "E014");

    let mut req = homework_request();
    req.class_id = 9;
    assert_eq!(notifier.notify_homework(req).await.unwrap_err().code(), "E013");

    let mut req = homework_request();
    req.homework_title = "  ".to_string();
    assert_eq!(notifier.notify_homework(req).await.unwrap_err().code(), "E007");

    let mut req = lesson_request();
    req.date = Some("1 March".to_string());
    assert_eq!(notifier.notify_lesson(req).await.unwrap_err().code(), "E011");

    assert!(provider.sent().is_empty());
}

#[tokio::test]
async fn student_without_contacts_is_reported() {
    let storage = seeded_storage();
    let provider = Arc::new(ScriptedSmsProvider::new());
    let notifier = notifier(storage.clone(), memory_cache(), provider.clone());

    let mut req = lesson_request();
    req.student_id = 2;
    let report = notifier.notify_lesson(req).await.unwrap();

    assert!(report.is_unaddressed());
    assert_eq!(report.students_without_recipients, vec!["Maryam"]);

    let recipients = notifier.student_recipients(1).await.unwrap();
    assert_eq!(recipients.recipients.len(), 2);
    assert_eq!(recipients.student_name, "Yusuf Ahmed");
}
