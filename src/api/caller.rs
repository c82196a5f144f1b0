//! Caller identity from the fronting auth proxy / 调用者身份
//!
//! The proxy authenticates the request and forwards `X-User-Groups`
//! (comma separated) and `X-User-Role`. Requests without either header are
//! anonymous.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
};
use std::convert::Infallible;

use taalmap_backend::models::Caller;

use super::{api_error, ApiResponseError};

pub const GROUPS_HEADER: &str = "x-user-groups";
pub const ROLE_HEADER: &str = "x-user-role";

const ADMIN_ROLE: &str = "admin";

/// Extracted caller / 请求调用者
pub struct Auth(pub Caller);

impl Auth {
    /// 仅管理员可操作
    pub fn require_admin(&self) -> Result<(), ApiResponseError> {
        if self.0.is_admin {
            Ok(())
        } else {
            Err(ApiResponseError(api_error(StatusCode::FORBIDDEN, "admin role required")))
        }
    }
}

pub fn caller_from_headers(headers: &HeaderMap) -> Caller {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let role = header(ROLE_HEADER);
    let groups = header(GROUPS_HEADER);
    if role.is_none() && groups.is_none() {
        return Caller::anonymous();
    }

    let groups: Vec<String> = groups
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let mut caller = Caller::user(groups);
    caller.is_admin = role.map(|r| r.eq_ignore_ascii_case(ADMIN_ROLE)).unwrap_or(false);
    caller
}

#[async_trait]
impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Auth(caller_from_headers(&parts.headers)))
    }
}
