//! Caller identity as asserted by the authentication gateway in front of the service.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::HeaderMap;
use actix_web::{FromRequest, HttpRequest};

use crate::domain::profile::Identity;
use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_NAME_HEADER: &str = "X-User-Name";
pub const USER_EMAIL_HEADER: &str = "X-User-Email";
pub const USER_PHONE_HEADER: &str = "X-User-Phone";

/// Extractor for the current caller; `None` when the request is anonymous.
///
/// Never rejects: operations that need a signed-in user report
/// `Unauthenticated` themselves.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Identity>);

impl Caller {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl FromRequest for Caller {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let headers = req.headers();
        let identity = header(headers, USER_ID_HEADER).map(|user_id| Identity {
            user_id,
            display_name: header(headers, USER_NAME_HEADER),
            email: header(headers, USER_EMAIL_HEADER),
            phone: header(headers, USER_PHONE_HEADER),
        });
        ready(Ok(Caller(identity)))
    }
}
