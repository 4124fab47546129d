//! Image Command Handlers
//!
//! 上传流程:
//! 1. AddCharacterImage: 新建 Pending 图片并返回限时上传地址
//! 2. 客户端直接向存储上传
//! 3. ConfirmImageUpload: 校验存储对象，进入 Completed 或 Failed

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::application::commands::{
    AddCharacterImage, ConfirmImageUpload, MarkImageFailed, RemoveCharacterImage,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    CharacterRepositoryPort, ImageStorageError, ImageStoragePort, UploadUrl,
};
use crate::application::queries::ImageView;
use crate::application::unit_of_work::UnitOfWorkFactory;
use crate::domain::character::{errors, Character, ImageId};

// ============================================================================
// AddCharacterImage
// ============================================================================

/// 添加图片响应
#[derive(Debug, Clone)]
pub struct AddCharacterImageResponse {
    pub image: ImageView,
    pub upload: UploadUrl,
}

/// AddCharacterImage Handler
pub struct AddCharacterImageHandler {
    character_repo: Arc<dyn CharacterRepositoryPort>,
    storage: Arc<dyn ImageStoragePort>,
    uow: UnitOfWorkFactory,
    upload_url_ttl: Duration,
}

impl AddCharacterImageHandler {
    pub fn new(
        character_repo: Arc<dyn CharacterRepositoryPort>,
        storage: Arc<dyn ImageStoragePort>,
        uow: UnitOfWorkFactory,
        upload_url_ttl: Duration,
    ) -> Self {
        Self {
            character_repo,
            storage,
            uow,
            upload_url_ttl,
        }
    }

    pub async fn handle(
        &self,
        command: AddCharacterImage,
        cancel: &CancellationToken,
    ) -> Result<AddCharacterImageResponse, ApplicationError> {
        let mut character = self
            .character_repo
            .find_by_id(command.character_id)
            .await?
            .ok_or_else(|| errors::character::not_found(command.character_id))?;

        let image = character.add_image(command.name, command.requested_by)?;

        // 先生成上传地址，失败则不落库
        let upload = self.storage.upload_url(image.id(), self.upload_url_ttl).await?;

        let mut uow = self.uow.begin();
        uow.update_character(character);
        uow.commit(cancel).await?;

        tracing::info!(
            character_id = %command.character_id,
            image_id = %image.id(),
            expires_at = %upload.expires_at,
            "Image added, awaiting upload"
        );

        Ok(AddCharacterImageResponse {
            image: ImageView::from(&image),
            upload,
        })
    }
}

// ============================================================================
// ConfirmImageUpload
// ============================================================================

/// 确认上传响应
#[derive(Debug, Clone)]
pub struct ConfirmImageUploadResponse {
    pub image: ImageView,
    /// 校验失败原因（图片已进入 Failed）
    pub failure_reason: Option<String>,
}

/// ConfirmImageUpload Handler
pub struct ConfirmImageUploadHandler {
    character_repo: Arc<dyn CharacterRepositoryPort>,
    storage: Arc<dyn ImageStoragePort>,
    uow: UnitOfWorkFactory,
}

impl ConfirmImageUploadHandler {
    pub fn new(
        character_repo: Arc<dyn CharacterRepositoryPort>,
        storage: Arc<dyn ImageStoragePort>,
        uow: UnitOfWorkFactory,
    ) -> Self {
        Self {
            character_repo,
            storage,
            uow,
        }
    }

    pub async fn handle(
        &self,
        command: ConfirmImageUpload,
        cancel: &CancellationToken,
    ) -> Result<ConfirmImageUploadResponse, ApplicationError> {
        let by = command.requested_by;
        let mut character = self
            .character_repo
            .find_by_id(command.character_id)
            .await?
            .ok_or_else(|| errors::character::not_found(command.character_id))?;

        character.set_image_processing(command.image_id, by)?;

        let failure_reason = match self.storage.validate(command.image_id).await {
            Ok(()) => {
                character.set_image_completed(command.image_id, by)?;
                None
            }
            Err(e @ (ImageStorageError::NotFound(_) | ImageStorageError::InvalidContentType { .. })) => {
                character.set_image_failed(command.image_id, by)?;
                Some(e.to_string())
            }
            Err(e) => return Err(e.into()),
        };

        let image = current_image(&character, command.image_id)?;
        let mut uow = self.uow.begin();
        uow.update_character(character);
        uow.commit(cancel).await?;

        match &failure_reason {
            None => tracing::info!(
                character_id = %command.character_id,
                image_id = %command.image_id,
                "Image upload completed"
            ),
            Some(reason) => tracing::warn!(
                character_id = %command.character_id,
                image_id = %command.image_id,
                reason = %reason,
                "Image upload rejected"
            ),
        }

        Ok(ConfirmImageUploadResponse {
            image,
            failure_reason,
        })
    }
}

fn current_image(
    character: &Character,
    image_id: ImageId,
) -> Result<ImageView, ApplicationError> {
    character
        .image(image_id)
        .map(ImageView::from)
        .ok_or_else(|| errors::character::image_not_found(image_id).into())
}

// ============================================================================
// MarkImageFailed
// ============================================================================

/// MarkImageFailed Handler
pub struct MarkImageFailedHandler {
    character_repo: Arc<dyn CharacterRepositoryPort>,
    uow: UnitOfWorkFactory,
}

impl MarkImageFailedHandler {
    pub fn new(character_repo: Arc<dyn CharacterRepositoryPort>, uow: UnitOfWorkFactory) -> Self {
        Self {
            character_repo,
            uow,
        }
    }

    pub async fn handle(
        &self,
        command: MarkImageFailed,
        cancel: &CancellationToken,
    ) -> Result<ImageView, ApplicationError> {
        let mut character = self
            .character_repo
            .find_by_id(command.character_id)
            .await?
            .ok_or_else(|| errors::character::not_found(command.character_id))?;

        character.set_image_failed(command.image_id, command.requested_by)?;
        let image = current_image(&character, command.image_id)?;

        let mut uow = self.uow.begin();
        uow.update_character(character);
        uow.commit(cancel).await?;

        tracing::info!(
            character_id = %command.character_id,
            image_id = %command.image_id,
            "Image marked as failed"
        );

        Ok(image)
    }
}

// ============================================================================
// RemoveCharacterImage
// ============================================================================

/// RemoveCharacterImage Handler
///
/// 存储对象由订阅 ImageRemovedDomainEvent 的清理处理器在提交后删除。
pub struct RemoveCharacterImageHandler {
    character_repo: Arc<dyn CharacterRepositoryPort>,
    uow: UnitOfWorkFactory,
}

impl RemoveCharacterImageHandler {
    pub fn new(character_repo: Arc<dyn CharacterRepositoryPort>, uow: UnitOfWorkFactory) -> Self {
        Self {
            character_repo,
            uow,
        }
    }

    pub async fn handle(
        &self,
        command: RemoveCharacterImage,
        cancel: &CancellationToken,
    ) -> Result<(), ApplicationError> {
        let mut character = self
            .character_repo
            .find_by_id(command.character_id)
            .await?
            .ok_or_else(|| errors::character::not_found(command.character_id))?;

        character.remove_image(command.image_id, command.requested_by)?;

        let mut uow = self.uow.begin();
        uow.update_character(character);
        let outcome = uow.commit(cancel).await?;

        tracing::info!(
            character_id = %command.character_id,
            image_id = %command.image_id,
            events_published = outcome.published,
            "Image removed"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::DEFAULT_UPLOAD_URL_TTL;
    use crate::application::test_support::TestContext;
    use crate::domain::character::{CharacterId, UploadStatus};

    fn add_handler(ctx: &TestContext) -> AddCharacterImageHandler {
        AddCharacterImageHandler::new(
            ctx.store.clone(),
            ctx.storage.clone(),
            ctx.uow(),
            DEFAULT_UPLOAD_URL_TTL,
        )
    }

    async fn add_image(ctx: &TestContext, character_id: CharacterId) -> ImageId {
        add_handler(ctx)
            .handle(
                AddCharacterImage {
                    requested_by: ctx.user,
                    character_id,
                    name: "portrait.png".into(),
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap()
            .image
            .id
    }

    fn confirm(ctx: &TestContext, character_id: CharacterId, image_id: ImageId) -> ConfirmImageUpload {
        ConfirmImageUpload {
            requested_by: ctx.user,
            character_id,
            image_id,
        }
    }

    #[tokio::test]
    async fn test_add_image_returns_upload_url() {
        let ctx = TestContext::new();
        let character_id = ctx.seed_character("Aria");

        let response = add_handler(&ctx)
            .handle(
                AddCharacterImage {
                    requested_by: ctx.user,
                    character_id,
                    name: "portrait.png".into(),
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(response.image.status, UploadStatus::Pending);
        assert!(response.upload.url.contains(&response.image.id.to_string()));
        let stored = ctx.store.character(character_id).unwrap();
        assert_eq!(stored.images().len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_upload_completes_valid_image() {
        let ctx = TestContext::new();
        let character_id = ctx.seed_character("Aria");
        let image_id = add_image(&ctx, character_id).await;
        ctx.storage.put(image_id, "image/png");

        let handler = ConfirmImageUploadHandler::new(ctx.store.clone(), ctx.storage.clone(), ctx.uow());
        let response = handler
            .handle(confirm(&ctx, character_id, image_id), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.image.status, UploadStatus::Completed);
        assert!(response.failure_reason.is_none());

        // 再次确认：Completed 不能回到 Processing
        let err = handler
            .handle(confirm(&ctx, character_id, image_id), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("Image.SetProcessing.InvalidStatus"));
    }

    #[tokio::test]
    async fn test_confirm_upload_rejects_non_image_content() {
        let ctx = TestContext::new();
        let character_id = ctx.seed_character("Aria");
        let image_id = add_image(&ctx, character_id).await;
        ctx.storage.put(image_id, "application/pdf");

        let response = ConfirmImageUploadHandler::new(ctx.store.clone(), ctx.storage.clone(), ctx.uow())
            .handle(confirm(&ctx, character_id, image_id), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.image.status, UploadStatus::Failed);
        assert!(response.failure_reason.is_some());
        assert_eq!(ctx.publisher.names(), vec!["ImageUploadFailedDomainEvent"]);
    }

    #[tokio::test]
    async fn test_confirm_upload_missing_object_fails_image() {
        let ctx = TestContext::new();
        let character_id = ctx.seed_character("Aria");
        let image_id = add_image(&ctx, character_id).await;

        let response = ConfirmImageUploadHandler::new(ctx.store.clone(), ctx.storage.clone(), ctx.uow())
            .handle(confirm(&ctx, character_id, image_id), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.image.status, UploadStatus::Failed);
    }

    #[tokio::test]
    async fn test_mark_failed_after_completed_is_rejected() {
        let ctx = TestContext::new();
        let character_id = ctx.seed_character("Aria");
        let image_id = add_image(&ctx, character_id).await;
        ctx.storage.put(image_id, "image/jpeg");
        ConfirmImageUploadHandler::new(ctx.store.clone(), ctx.storage.clone(), ctx.uow())
            .handle(confirm(&ctx, character_id, image_id), &CancellationToken::new())
            .await
            .unwrap();

        let err = MarkImageFailedHandler::new(ctx.store.clone(), ctx.uow())
            .handle(
                MarkImageFailed {
                    requested_by: ctx.user,
                    character_id,
                    image_id,
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some("Image.SetFailed.InvalidStatus"));
        assert!(ctx.publisher.events().is_empty());
    }

    #[tokio::test]
    async fn test_remove_image_publishes_event_after_commit() {
        let ctx = TestContext::new();
        let character_id = ctx.seed_character("Aria");
        let image_id = add_image(&ctx, character_id).await;
        let handler = RemoveCharacterImageHandler::new(ctx.store.clone(), ctx.uow());
        let command = RemoveCharacterImage {
            requested_by: ctx.user,
            character_id,
            image_id,
        };

        *ctx.store.fail_next_persist.lock().unwrap() = true;
        assert!(handler
            .handle(command.clone(), &CancellationToken::new())
            .await
            .is_err());
        assert!(ctx.publisher.events().is_empty());
        assert_eq!(ctx.store.character(character_id).unwrap().images().len(), 1);

        handler.handle(command.clone(), &CancellationToken::new()).await.unwrap();
        assert_eq!(ctx.publisher.names(), vec!["ImageRemovedDomainEvent"]);
        assert!(ctx.store.character(character_id).unwrap().images().is_empty());

        let err = handler.handle(command, &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.code(), Some("Character.Image.NotFound"));
    }
}
