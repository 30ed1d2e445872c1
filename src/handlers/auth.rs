use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use crate::domain::caller::Caller;
use crate::errors::AppError;

/// Set by the upstream gateway after it authenticates the request.
pub const USER_ID_HEADER: &str = "X-User-Id";
pub const STAFF_HEADER: &str = "X-User-Staff";

fn caller_from(req: &HttpRequest) -> Result<Caller, AppError> {
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .ok_or(AppError::Unauthorized)?;

    let is_staff = req
        .headers()
        .get(STAFF_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));

    Ok(Caller { user_id, is_staff })
}

impl FromRequest for Caller {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(caller_from(req))
    }
}
