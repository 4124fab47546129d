//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::application::{
    // Command handlers
    AddCharacterImageHandler, AddCharacterPronounHandler, ConfirmImageUploadHandler,
    CreateCharacterHandler, CreatePronounHandler, DeleteCharacterHandler, MarkImageFailedHandler,
    RemoveCharacterImageHandler, RemoveCharacterPronounHandler, UpdateCharacterHandler,
    // Query handlers
    GetCharacterHandler, GetImageDownloadUrlHandler, GetImagesByIdsHandler, GetPronounHandler,
    GetPronounsByIdsHandler, ListCharactersHandler, ListPronounsHandler,
    // Ports
    CharacterRepositoryPort, ImageRepositoryPort, PronounRepositoryPort, UnitOfWorkFactory,
};
use crate::infrastructure::adapters::FileImageStorage;

/// 状态构建依赖
pub struct AppDependencies {
    pub character_repo: Arc<dyn CharacterRepositoryPort>,
    pub pronoun_repo: Arc<dyn PronounRepositoryPort>,
    pub image_repo: Arc<dyn ImageRepositoryPort>,
    pub image_storage: Arc<FileImageStorage>,
    pub unit_of_work: UnitOfWorkFactory,
    pub upload_url_ttl: Duration,
    pub max_upload_size: u64,
    /// 服务关闭时取消进行中的提交
    pub shutdown: CancellationToken,
}

/// 应用状态
pub struct AppState {
    // ========== Infrastructure ==========
    pub image_storage: Arc<FileImageStorage>,
    pub max_upload_size: u64,
    pub shutdown: CancellationToken,

    // ========== Command Handlers ==========
    pub create_character_handler: CreateCharacterHandler,
    pub update_character_handler: UpdateCharacterHandler,
    pub delete_character_handler: DeleteCharacterHandler,
    pub add_character_pronoun_handler: AddCharacterPronounHandler,
    pub remove_character_pronoun_handler: RemoveCharacterPronounHandler,
    pub add_character_image_handler: AddCharacterImageHandler,
    pub confirm_image_upload_handler: ConfirmImageUploadHandler,
    pub mark_image_failed_handler: MarkImageFailedHandler,
    pub remove_character_image_handler: RemoveCharacterImageHandler,
    pub create_pronoun_handler: CreatePronounHandler,

    // ========== Query Handlers ==========
    pub get_character_handler: GetCharacterHandler,
    pub list_characters_handler: ListCharactersHandler,
    pub get_images_by_ids_handler: GetImagesByIdsHandler,
    pub get_image_download_url_handler: GetImageDownloadUrlHandler,
    pub get_pronoun_handler: GetPronounHandler,
    pub list_pronouns_handler: ListPronounsHandler,
    pub get_pronouns_by_ids_handler: GetPronounsByIdsHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(deps: AppDependencies) -> Self {
        let AppDependencies {
            character_repo,
            pronoun_repo,
            image_repo,
            image_storage,
            unit_of_work: uow,
            upload_url_ttl,
            max_upload_size,
            shutdown,
        } = deps;

        Self {
            image_storage: image_storage.clone(),
            max_upload_size,
            shutdown,

            // Command handlers
            create_character_handler: CreateCharacterHandler::new(pronoun_repo.clone(), uow.clone()),
            update_character_handler: UpdateCharacterHandler::new(
                character_repo.clone(),
                pronoun_repo.clone(),
                uow.clone(),
            ),
            delete_character_handler: DeleteCharacterHandler::new(character_repo.clone(), uow.clone()),
            add_character_pronoun_handler: AddCharacterPronounHandler::new(
                character_repo.clone(),
                pronoun_repo.clone(),
                uow.clone(),
            ),
            remove_character_pronoun_handler: RemoveCharacterPronounHandler::new(
                character_repo.clone(),
                uow.clone(),
            ),
            add_character_image_handler: AddCharacterImageHandler::new(
                character_repo.clone(),
                image_storage.clone(),
                uow.clone(),
                upload_url_ttl,
            ),
            confirm_image_upload_handler: ConfirmImageUploadHandler::new(
                character_repo.clone(),
                image_storage.clone(),
                uow.clone(),
            ),
            mark_image_failed_handler: MarkImageFailedHandler::new(character_repo.clone(), uow.clone()),
            remove_character_image_handler: RemoveCharacterImageHandler::new(
                character_repo.clone(),
                uow.clone(),
            ),
            create_pronoun_handler: CreatePronounHandler::new(pronoun_repo.clone(), uow),

            // Query handlers
            get_character_handler: GetCharacterHandler::new(character_repo.clone()),
            list_characters_handler: ListCharactersHandler::new(character_repo.clone()),
            get_images_by_ids_handler: GetImagesByIdsHandler::new(image_repo),
            get_image_download_url_handler: GetImageDownloadUrlHandler::new(
                character_repo,
                image_storage,
            ),
            get_pronoun_handler: GetPronounHandler::new(pronoun_repo.clone()),
            list_pronouns_handler: ListPronounsHandler::new(pronoun_repo.clone()),
            get_pronouns_by_ids_handler: GetPronounsByIdsHandler::new(pronoun_repo),
        }
    }
}
