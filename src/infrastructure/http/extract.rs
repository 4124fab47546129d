//! Request Extractors
//!
//! `X-User-Id` 请求头解析为当前操作用户

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use super::error::ApiError;
use crate::domain::character::UserId;

/// 用户标识请求头
pub const USER_ID_HEADER: &str = "x-user-id";

/// 当前操作用户
#[derive(Debug, Clone, Copy)]
pub struct ActingUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?
            .to_str()
            .map_err(|_| ApiError::bad_request("X-User-Id header is not valid text"))?;

        let uuid = Uuid::parse_str(raw.trim())
            .map_err(|e| ApiError::bad_request(format!("Invalid X-User-Id header: {}", e)))?;
        if uuid.is_nil() {
            return Err(ApiError::bad_request("X-User-Id cannot be the nil UUID"));
        }

        Ok(ActingUser(UserId::from_uuid(uuid)))
    }
}
