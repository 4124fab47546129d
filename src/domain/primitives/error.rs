//! Domain Error - 业务失败值
//!
//! 错误码为稳定的点分字符串（如 `Character.Name.Invalid`），
//! 调用方据此分支；message 仅供展示。

use std::borrow::Cow;
use thiserror::Error;

/// 领域错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct DomainError {
    code: Cow<'static, str>,
    message: String,
}

/// 领域操作结果
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn new(code: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// 错误码以 `NotFound` 结尾
    pub fn is_not_found(&self) -> bool {
        self.code.ends_with("NotFound")
    }
}
