//! File Image Storage - 文件系统图片存储实现
//!
//! 实现 ImageStoragePort trait
//!
//! 目录结构:
//! - `{base_dir}/{image_id}`       图片内容
//! - `{base_dir}/{image_id}.json`  元数据（content_type、大小、上传时间）
//!
//! 上传地址为限时签名 URL：
//! `{public_base_url}/api/images/{id}/upload?expires={unix}&signature={md5}`

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::application::ports::{DeleteOutcome, ImageStorageError, ImageStoragePort, UploadUrl};
use crate::domain::character::ImageId;

/// 文件存储配置
#[derive(Debug, Clone)]
pub struct FileImageStorageConfig {
    /// 存储根目录
    pub base_dir: PathBuf,
    /// 对外访问地址（生成 URL 用）
    pub public_base_url: String,
    /// 上传签名密钥
    pub signing_secret: String,
}

/// 存储对象元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageObjectMetadata {
    pub content_type: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// 文件系统图片存储
pub struct FileImageStorage {
    base_dir: PathBuf,
    public_base_url: String,
    signing_secret: String,
}

impl FileImageStorage {
    /// 创建新的文件存储
    pub async fn new(config: FileImageStorageConfig) -> Result<Self, ImageStorageError> {
        // 确保目录存在
        fs::create_dir_all(&config.base_dir)
            .await
            .map_err(|e| ImageStorageError::IoError(e.to_string()))?;

        Ok(Self {
            base_dir: config.base_dir,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            signing_secret: config.signing_secret,
        })
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn object_path(&self, image_id: ImageId) -> PathBuf {
        self.base_dir.join(image_id.to_string())
    }

    fn metadata_path(&self, image_id: ImageId) -> PathBuf {
        self.base_dir.join(format!("{}.json", image_id))
    }

    fn sign(&self, image_id: ImageId, expires: i64) -> String {
        let payload = format!("{}:{}:{}", self.signing_secret, image_id, expires);
        format!("{:x}", md5::compute(payload.as_bytes()))
    }

    /// 校验上传签名（未过期且签名匹配）
    pub fn verify_upload_signature(
        &self,
        image_id: ImageId,
        expires: i64,
        signature: &str,
    ) -> Result<(), ImageStorageError> {
        if self.signing_secret.is_empty()
            || Utc::now().timestamp() > expires
            || self.sign(image_id, expires) != signature
        {
            return Err(ImageStorageError::InvalidUploadToken(image_id));
        }
        Ok(())
    }

    /// 写入上传内容及元数据
    pub async fn save_upload(
        &self,
        image_id: ImageId,
        content_type: &str,
        data: &[u8],
    ) -> Result<ImageObjectMetadata, ImageStorageError> {
        fs::write(self.object_path(image_id), data)
            .await
            .map_err(|e| ImageStorageError::IoError(e.to_string()))?;

        let metadata = ImageObjectMetadata {
            content_type: content_type.to_string(),
            size: data.len() as u64,
            uploaded_at: Utc::now(),
        };
        let json = serde_json::to_vec(&metadata)
            .map_err(|e| ImageStorageError::IoError(e.to_string()))?;
        fs::write(self.metadata_path(image_id), json)
            .await
            .map_err(|e| ImageStorageError::IoError(e.to_string()))?;

        tracing::debug!(
            image_id = %image_id,
            content_type = %content_type,
            size = data.len(),
            "Image content stored"
        );

        Ok(metadata)
    }

    /// 读取元数据
    pub async fn metadata(&self, image_id: ImageId) -> Result<ImageObjectMetadata, ImageStorageError> {
        let raw = match fs::read(self.metadata_path(image_id)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ImageStorageError::NotFound(image_id))
            }
            Err(e) => return Err(ImageStorageError::IoError(e.to_string())),
        };
        serde_json::from_slice(&raw).map_err(|e| ImageStorageError::IoError(e.to_string()))
    }

    /// 打开图片内容
    pub async fn open_content(
        &self,
        image_id: ImageId,
    ) -> Result<(fs::File, ImageObjectMetadata), ImageStorageError> {
        let metadata = self.metadata(image_id).await?;
        let file = match fs::File::open(self.object_path(image_id)).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ImageStorageError::NotFound(image_id))
            }
            Err(e) => return Err(ImageStorageError::IoError(e.to_string())),
        };
        Ok((file, metadata))
    }

    async fn remove_if_exists(path: &Path) -> Result<bool, ImageStorageError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ImageStorageError::IoError(e.to_string())),
        }
    }
}

#[async_trait]
impl ImageStoragePort for FileImageStorage {
    async fn download_url(&self, image_id: ImageId) -> Result<String, ImageStorageError> {
        if !self.object_path(image_id).exists() {
            return Err(ImageStorageError::NotFound(image_id));
        }
        Ok(format!("{}/api/images/{}/content", self.public_base_url, image_id))
    }

    async fn upload_url(&self, image_id: ImageId, ttl: Duration) -> Result<UploadUrl, ImageStorageError> {
        if self.signing_secret.is_empty() {
            return Err(ImageStorageError::UploadUrlUnavailable(
                "signing secret is not configured".to_string(),
            ));
        }
        let ttl = ChronoDuration::from_std(ttl)
            .map_err(|e| ImageStorageError::UploadUrlUnavailable(e.to_string()))?;

        let expires_at = Utc::now() + ttl;
        let expires = expires_at.timestamp();
        let url = format!(
            "{}/api/images/{}/upload?expires={}&signature={}",
            self.public_base_url,
            image_id,
            expires,
            self.sign(image_id, expires)
        );

        Ok(UploadUrl { url, expires_at })
    }

    async fn validate(&self, image_id: ImageId) -> Result<(), ImageStorageError> {
        let metadata = self.metadata(image_id).await?;
        if !self.object_path(image_id).exists() {
            return Err(ImageStorageError::NotFound(image_id));
        }
        if !metadata.content_type.starts_with("image/") {
            return Err(ImageStorageError::InvalidContentType {
                image_id,
                content_type: metadata.content_type,
            });
        }
        Ok(())
    }

    async fn delete(&self, image_id: ImageId) -> Result<DeleteOutcome, ImageStorageError> {
        let removed_object = Self::remove_if_exists(&self.object_path(image_id)).await?;
        let removed_metadata = Self::remove_if_exists(&self.metadata_path(image_id)).await?;

        if removed_object || removed_metadata {
            tracing::debug!(image_id = %image_id, "Deleted image object");
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }
}
