//! Image Storage Port - 出站端口
//!
//! 图片二进制内容存放在外部对象存储中，按 ImageId 寻址。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

use crate::domain::character::ImageId;

/// 上传地址默认有效期（5 分钟）
pub const DEFAULT_UPLOAD_URL_TTL: Duration = Duration::from_secs(5 * 60);

/// 图片存储错误
#[derive(Debug, Error)]
pub enum ImageStorageError {
    #[error("Image not found in storage: {0}")]
    NotFound(ImageId),

    #[error("Invalid content type for image {image_id}: {content_type}")]
    InvalidContentType {
        image_id: ImageId,
        content_type: String,
    },

    #[error("Cannot generate upload URL: {0}")]
    UploadUrlUnavailable(String),

    #[error("Invalid or expired upload token for image {0}")]
    InvalidUploadToken(ImageId),

    #[error("IO error: {0}")]
    IoError(String),
}

impl ImageStorageError {
    /// 业务错误码
    pub fn code(&self) -> &'static str {
        match self {
            ImageStorageError::NotFound(_) => "Storage.Image.NotFound",
            ImageStorageError::InvalidContentType { .. } => "Storage.Image.InvalidType",
            ImageStorageError::UploadUrlUnavailable(_) => "Storage.Image.CannotGenerateSas",
            ImageStorageError::InvalidUploadToken(_) => "Storage.Image.InvalidToken",
            ImageStorageError::IoError(_) => "Storage.Image.Io",
        }
    }
}

/// 限时只写上传地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// 删除结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// 对象本就不存在（幂等删除）
    NotFound,
}

/// Image Storage Port
#[async_trait]
pub trait ImageStoragePort: Send + Sync {
    /// 读取地址；对象不存在时返回 NotFound
    async fn download_url(&self, image_id: ImageId) -> Result<String, ImageStorageError>;

    /// 生成限时只写上传地址
    async fn upload_url(&self, image_id: ImageId, ttl: Duration) -> Result<UploadUrl, ImageStorageError>;

    /// 校验已上传对象存在且内容类型为 `image/*`
    async fn validate(&self, image_id: ImageId) -> Result<(), ImageStorageError>;

    /// 删除对象
    async fn delete(&self, image_id: ImageId) -> Result<DeleteOutcome, ImageStorageError>;
}
