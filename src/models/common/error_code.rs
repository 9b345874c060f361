use serde::Serialize;

/// 业务错误码，通过 `ApiResponse.code` 返回给前端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1xxx
    BadRequest = 1000,
    ValidationFailed = 1001,
    RateLimitExceeded = 1002,
    NotFound = 1004,

    // 资源错误 3xxx
    StudentNotFound = 3001,
    ClassNotFound = 3002,
    TemplateNotFound = 3003,
    PresetNotFound = 3004,

    // 短信发送 4xxx
    NoRecipients = 4001,
    SmsDispatchFailed = 4002,
    SmsPartiallySent = 4003,

    InternalServerError = 5000,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success as i32, 0);
        assert_eq!(ErrorCode::RateLimitExceeded as i32, 1002);
        assert_eq!(ErrorCode::SmsPartiallySent as i32, 4003);
    }
}
