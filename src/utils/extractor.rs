use actix_web::error::InternalError;
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

/// 路径中的正整数 ID
///
/// 取路由中第一个动态段，非正整数时直接返回 400。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeIDI64(pub i64);

fn bad_path(message: String) -> actix_web::Error {
    let response = HttpResponse::BadRequest()
        .json(ApiResponse::error_empty(ErrorCode::BadRequest, message.as_str()));
    InternalError::from_response(message, response).into()
}

pub(crate) fn parse_positive_id(raw: &str) -> Result<i64, String> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(format!("Invalid id '{raw}': must be a positive integer")),
    }
}

impl FromRequest for SafeIDI64 {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let raw = req
            .match_info()
            .iter()
            .next()
            .map(|(_, value)| value.to_string());

        let result = match raw {
            Some(raw) => parse_positive_id(&raw).map(SafeIDI64).map_err(bad_path),
            None => Err(bad_path("Missing id in path".to_string())),
        };
        ready(result)
    }
}
