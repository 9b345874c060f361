use crate::notify::template::validate_template_body;

pub const MAX_PRESET_TITLE_LENGTH: usize = 100;

pub fn validate_preset_title(title: &str) -> Result<(), String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("Preset title must not be empty".to_string());
    }
    if title.chars().count() > MAX_PRESET_TITLE_LENGTH {
        return Err(format!(
            "Preset title must be at most {MAX_PRESET_TITLE_LENGTH} characters"
        ));
    }
    Ok(())
}

/// 常用消息与模板使用同样的变量规则
pub fn validate_preset(title: &str, body: &str) -> Result<(), String> {
    validate_preset_title(title)?;
    validate_template_body(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_title() {
        assert!(validate_preset_title("Eid holiday").is_ok());
        assert!(validate_preset_title("   ").is_err());
        assert!(validate_preset_title(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_preset_body_uses_template_rules() {
        assert!(validate_preset("Closure", "No class on {date}").is_ok());
        assert!(validate_preset("Closure", "No class on {weekday}").is_err());
        assert!(validate_preset("Closure", "").is_err());
    }
}
