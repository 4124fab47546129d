//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{ImageStorageError, RepositoryError};
use crate::application::unit_of_work::UnitOfWorkError;
use crate::domain::DomainError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 业务规则失败（错误码原样保留）
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// 并发冲突或唯一约束冲突
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 图片存储错误
    #[error(transparent)]
    Storage(#[from] ImageStorageError),

    /// 请求已取消
    #[error("Operation cancelled")]
    Cancelled,

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// 业务错误码（仅 Domain / Storage 业务错误有）
    pub fn code(&self) -> Option<&str> {
        match self {
            ApplicationError::Domain(e) => Some(e.code()),
            ApplicationError::Storage(e) => Some(e.code()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            ApplicationError::Domain(e) => e.is_not_found(),
            ApplicationError::Storage(ImageStorageError::NotFound(_)) => true,
            _ => false,
        }
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) | RepositoryError::Duplicate(_) => {
                Self::Conflict(err.to_string())
            }
            RepositoryError::Cancelled => Self::Cancelled,
            other => Self::RepositoryError(other.to_string()),
        }
    }
}

impl From<UnitOfWorkError> for ApplicationError {
    fn from(err: UnitOfWorkError) -> Self {
        match err {
            UnitOfWorkError::Persistence(e) => e.into(),
            UnitOfWorkError::Cancelled => Self::Cancelled,
        }
    }
}
