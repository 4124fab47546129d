//! Image Cleanup Handler
//!
//! 图片移除（以及可选的上传失败）后删除存储中的对象。
//! 存储删除失败只记录日志，角色变更已经提交，不会回滚。

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::ports::{
    DeleteOutcome, DomainEventHandler, HandlerError, ImageStoragePort,
};
use crate::domain::character::{CharacterId, DomainEvent, ImageId};

/// 图片存储清理处理器
pub struct ImageCleanupHandler {
    storage: Arc<dyn ImageStoragePort>,
    /// 上传失败时是否同时删除已上传的对象
    cleanup_failed_uploads: bool,
}

impl ImageCleanupHandler {
    pub const NAME: &'static str = "ImageCleanupHandler";

    pub fn new(storage: Arc<dyn ImageStoragePort>, cleanup_failed_uploads: bool) -> Self {
        Self {
            storage,
            cleanup_failed_uploads,
        }
    }

    async fn delete(&self, character_id: CharacterId, image_id: ImageId) -> Result<(), HandlerError> {
        match self.storage.delete(image_id).await {
            Ok(DeleteOutcome::Deleted) => {
                tracing::info!(
                    character_id = %character_id,
                    image_id = %image_id,
                    "Image deleted from storage"
                );
                Ok(())
            }
            Ok(DeleteOutcome::NotFound) => {
                tracing::warn!(
                    character_id = %character_id,
                    image_id = %image_id,
                    "Image not found in storage, nothing to delete"
                );
                Ok(())
            }
            // 由事件总线统一记录
            Err(e) => Err(HandlerError::new(
                Self::NAME,
                format!("failed to delete image {} of character {}: {}", image_id, character_id, e),
            )),
        }
    }
}

#[async_trait]
impl DomainEventHandler for ImageCleanupHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn event_names(&self) -> Vec<&'static str> {
        let mut names = vec![DomainEvent::IMAGE_REMOVED];
        if self.cleanup_failed_uploads {
            names.push(DomainEvent::IMAGE_UPLOAD_FAILED);
        }
        names
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        match event {
            DomainEvent::ImageRemoved(e) => self.delete(e.character_id(), e.image_id()).await,
            DomainEvent::ImageUploadFailed(e) if self.cleanup_failed_uploads => {
                self.delete(e.character_id(), e.image_id()).await
            }
            DomainEvent::ImageUploadFailed(_) => Ok(()),
        }
    }
}
