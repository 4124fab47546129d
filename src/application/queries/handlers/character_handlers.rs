//! Character Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{CharacterRepositoryPort, ImageRepositoryPort, ImageStoragePort};
use crate::application::queries::{
    CharacterView, GetCharacter, GetImageDownloadUrl, GetImagesByIds, ImageView, ListCharacters,
};
use crate::domain::character::{errors, ImageId};

// ============================================================================
// Response DTOs
// ============================================================================

/// 图片读取地址
#[derive(Debug, Clone)]
pub struct ImageUrlResponse {
    pub image_id: ImageId,
    pub url: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GetCharacter Handler
pub struct GetCharacterHandler {
    character_repo: Arc<dyn CharacterRepositoryPort>,
}

impl GetCharacterHandler {
    pub fn new(character_repo: Arc<dyn CharacterRepositoryPort>) -> Self {
        Self { character_repo }
    }

    pub async fn handle(&self, query: GetCharacter) -> Result<CharacterView, ApplicationError> {
        let character = self
            .character_repo
            .find_by_id(query.character_id)
            .await?
            .ok_or_else(|| errors::character::not_found(query.character_id))?;

        Ok(CharacterView::from(&character))
    }
}

/// ListCharacters Handler
pub struct ListCharactersHandler {
    character_repo: Arc<dyn CharacterRepositoryPort>,
}

impl ListCharactersHandler {
    pub fn new(character_repo: Arc<dyn CharacterRepositoryPort>) -> Self {
        Self { character_repo }
    }

    pub async fn handle(&self, query: ListCharacters) -> Result<Vec<CharacterView>, ApplicationError> {
        let characters = match query.created_by {
            Some(user_id) => self.character_repo.find_by_created_by(user_id).await?,
            None => self.character_repo.find_all().await?,
        };
        Ok(characters.iter().map(CharacterView::from).collect())
    }
}

/// GetImagesByIds Handler
///
/// 空输入返回空列表；任一 ID 不存在时报告全部缺失 ID。
pub struct GetImagesByIdsHandler {
    image_repo: Arc<dyn ImageRepositoryPort>,
}

impl GetImagesByIdsHandler {
    pub fn new(image_repo: Arc<dyn ImageRepositoryPort>) -> Self {
        Self { image_repo }
    }

    pub async fn handle(&self, query: GetImagesByIds) -> Result<Vec<ImageView>, ApplicationError> {
        if query.image_ids.is_empty() {
            return Ok(Vec::new());
        }

        let images = self.image_repo.find_by_ids(&query.image_ids).await?;
        let mut missing: Vec<ImageId> = Vec::new();
        for id in &query.image_ids {
            if !images.iter().any(|i| i.id() == *id) && !missing.contains(id) {
                missing.push(*id);
            }
        }
        if !missing.is_empty() {
            return Err(errors::image::not_found_many(&missing).into());
        }

        Ok(images.iter().map(ImageView::from).collect())
    }
}

/// GetImageDownloadUrl Handler
pub struct GetImageDownloadUrlHandler {
    character_repo: Arc<dyn CharacterRepositoryPort>,
    storage: Arc<dyn ImageStoragePort>,
}

impl GetImageDownloadUrlHandler {
    pub fn new(
        character_repo: Arc<dyn CharacterRepositoryPort>,
        storage: Arc<dyn ImageStoragePort>,
    ) -> Self {
        Self {
            character_repo,
            storage,
        }
    }

    pub async fn handle(&self, query: GetImageDownloadUrl) -> Result<ImageUrlResponse, ApplicationError> {
        let character = self
            .character_repo
            .find_by_id(query.character_id)
            .await?
            .ok_or_else(|| errors::character::not_found(query.character_id))?;

        if character.image(query.image_id).is_none() {
            return Err(errors::character::image_not_found(query.image_id).into());
        }

        let url = self.storage.download_url(query.image_id).await?;

        Ok(ImageUrlResponse {
            image_id: query.image_id,
            url,
        })
    }
}
