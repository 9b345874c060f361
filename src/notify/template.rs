//! 短信模板选择与变量替换

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

use crate::models::classes::entities::Class;
use crate::models::sms::entities::{NotificationKind, SmsPreset, SmsTemplate, TemplateSource};
use crate::models::sms::requests::{HomeworkNotificationRequest, LessonNotificationRequest};
use crate::models::students::entities::Student;

pub const MAX_TEMPLATE_LENGTH: usize = 1000;

/// 模板中允许出现的变量
pub const TEMPLATE_VARIABLES: &[&str] = &[
    "student_name",
    "student_first_name",
    "parent_name",
    "class_name",
    "teacher_name",
    "date",
    "surah",
    "from_verse",
    "to_verse",
    "verses",
    "pages",
    "lesson_type",
    "outcome",
    "grade",
    "notes",
    "status",
    "homework_title",
    "homework_details",
    "due_date",
];

// {{ name }} 或 {name}
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}|\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}")
        .expect("Invalid placeholder regex")
});

pub fn is_known_variable(name: &str) -> bool {
    TEMPLATE_VARIABLES.contains(&name)
}

/// 内置默认模板
pub fn default_template(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::LessonResult => {
            "Assalamu alaikum {parent_name}. {student_name}'s lesson on {date}: Surah {surah}, verses {verses}. Result: {outcome}. {notes}"
        }
        NotificationKind::Attendance => {
            "Assalamu alaikum {parent_name}. {student_name} was marked {status} for {class_name} on {date}."
        }
        NotificationKind::Homework => {
            "Assalamu alaikum {parent_name}. Homework for {student_name} ({class_name}): {homework_title}. {homework_details} Due: {due_date}."
        }
    }
}

/// 选中的模板及其来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedTemplate {
    pub body: String,
    pub source: TemplateSource,
}

/// 自定义消息优先于常用消息
pub fn pick_custom(
    custom_message: Option<&str>,
    preset: Option<&SmsPreset>,
) -> Option<SelectedTemplate> {
    if let Some(body) = custom_message
        && !body.trim().is_empty()
    {
        return Some(SelectedTemplate {
            body: body.to_string(),
            source: TemplateSource::Custom,
        });
    }

    preset
        .filter(|p| !p.body.trim().is_empty())
        .map(|p| SelectedTemplate {
            body: p.body.clone(),
            source: TemplateSource::Preset,
        })
}

/// 自定义消息 → 班级模板 → 全局模板 → 内置默认
pub fn select_template(
    custom: Option<SelectedTemplate>,
    class_template: Option<&SmsTemplate>,
    global_template: Option<&SmsTemplate>,
    kind: NotificationKind,
) -> SelectedTemplate {
    if let Some(custom) = custom
        && !custom.body.trim().is_empty()
    {
        return custom;
    }

    let stored = [
        (class_template, TemplateSource::Class),
        (global_template, TemplateSource::Global),
    ];
    for (template, source) in stored {
        if let Some(t) = template
            && t.is_active
            && t.kind == kind
            && !t.body.trim().is_empty()
        {
            return SelectedTemplate {
                body: t.body.clone(),
                source,
            };
        }
    }

    SelectedTemplate {
        body: default_template(kind).to_string(),
        source: TemplateSource::Default,
    }
}

/// 模板变量
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateVars {
    values: BTreeMap<&'static str, String>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// 空白值不写入，渲染时按空串处理
    pub fn set(&mut self, key: &'static str, value: impl AsRef<str>) -> &mut Self {
        let value = value.as_ref().trim();
        if value.is_empty() {
            self.values.remove(key);
        } else {
            self.values.insert(key, value.to_string());
        }
        self
    }

    pub fn set_opt<S: AsRef<str>>(&mut self, key: &'static str, value: Option<S>) -> &mut Self {
        match value {
            Some(v) => self.set(key, v),
            None => {
                self.values.remove(key);
                self
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn date(&mut self, date: &str) -> &mut Self {
        self.set("date", date)
    }

    pub fn class(&mut self, class: Option<&Class>) -> &mut Self {
        self.set_opt("class_name", class.map(|c| c.class_name.as_str()))
            .set_opt("teacher_name", class.and_then(|c| c.teacher_name.as_deref()))
    }

    pub fn student(&mut self, student: &Student) -> &mut Self {
        self.set("student_name", &student.full_name)
            .set("student_first_name", student.first_name())
    }

    pub fn parent_name(&mut self, name: Option<&str>) -> &mut Self {
        self.set_opt("parent_name", name)
    }

    pub fn lesson(&mut self, req: &LessonNotificationRequest) -> &mut Self {
        self.set_opt("surah", req.surah.as_deref())
            .set_opt("from_verse", req.from_verse.map(|v| v.to_string()))
            .set_opt("to_verse", req.to_verse.map(|v| v.to_string()))
            .set_opt("verses", format_verses(req.from_verse, req.to_verse))
            .set_opt("pages", req.pages.as_deref())
            .set_opt("lesson_type", req.lesson_type.as_deref())
            .set_opt("outcome", req.outcome.as_deref())
            .set_opt("grade", req.grade.as_deref())
            .set_opt("notes", req.notes.as_deref())
    }

    pub fn attendance_status(&mut self, status: &str) -> &mut Self {
        self.set("status", status)
    }

    pub fn homework(&mut self, req: &HomeworkNotificationRequest) -> &mut Self {
        self.set("homework_title", &req.homework_title)
            .set_opt("homework_details", req.homework_details.as_deref())
            .set_opt("due_date", req.due_date.as_deref())
    }
}

/// `1-5`，起止相同时只显示一个
pub fn format_verses(from: Option<i32>, to: Option<i32>) -> Option<String> {
    match (from, to) {
        (Some(a), Some(b)) if a == b => Some(a.to_string()),
        (Some(a), Some(b)) => Some(format!("{a}-{b}")),
        (Some(a), None) | (None, Some(a)) => Some(a.to_string()),
        (None, None) => None,
    }
}

/// 替换 `{name}` 与 `{{ name }}`
///
/// 已知变量缺值时替换为空串，未知占位符原样保留。
pub fn render_template(body: &str, vars: &TemplateVars) -> String {
    PLACEHOLDER_RE
        .replace_all(body, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_ascii_lowercase())
                .unwrap_or_default();
            if is_known_variable(&name) {
                vars.get(&name).unwrap_or_default().to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// 保存模板前校验
pub fn validate_template_body(body: &str) -> Result<(), String> {
    if body.trim().is_empty() {
        return Err("Template body must not be empty".to_string());
    }
    if body.chars().count() > MAX_TEMPLATE_LENGTH {
        return Err(format!(
            "Template body must be at most {MAX_TEMPLATE_LENGTH} characters"
        ));
    }

    let unknown: Vec<String> = PLACEHOLDER_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_ascii_lowercase())
        .filter(|name| !is_known_variable(name))
        .collect();

    if !unknown.is_empty() {
        return Err(format!(
            "Unknown template variables: {}. Allowed: {}",
            unknown.join(", "),
            TEMPLATE_VARIABLES.join(", ")
        ));
    }
    Ok(())
}
