//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Repository、ChangeStore、EventBus、ImageStorage）
//! - unit_of_work: 提交边界，持久化成功后发布领域事件
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - event_handlers: 领域事件处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod event_handlers;
pub mod ports;
pub mod queries;
pub mod unit_of_work;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use commands::{
    AddCharacterImage, AddCharacterPronoun, ConfirmImageUpload, CreateCharacter, CreatePronoun,
    DeleteCharacter, MarkImageFailed, PronounInput, RemoveCharacterImage, RemoveCharacterPronoun,
    UpdateCharacter,
    // Handlers
    handlers::{
        AddCharacterImageHandler, AddCharacterImageResponse, AddCharacterPronounHandler,
        ConfirmImageUploadHandler, ConfirmImageUploadResponse, CreateCharacterHandler,
        CreatePronounHandler, DeleteCharacterHandler, MarkImageFailedHandler,
        RemoveCharacterImageHandler, RemoveCharacterPronounHandler, UpdateCharacterHandler,
    },
};

pub use error::ApplicationError;

pub use event_handlers::ImageCleanupHandler;

pub use ports::{
    ChangeSet, ChangeStorePort, CharacterChange, CharacterRepositoryPort, DeleteOutcome,
    DomainEventHandler, DomainEventPublisherPort, HandlerError, ImageRepositoryPort,
    ImageStorageError, ImageStoragePort, PronounChange, PronounRepositoryPort, PublishError,
    RepositoryError, UploadUrl, DEFAULT_UPLOAD_URL_TTL,
};

pub use queries::{
    CharacterView, GetCharacter, GetImageDownloadUrl, GetImagesByIds, GetPronoun,
    GetPronounsByIds, ImageView, ListCharacters, ListPronouns, PronounView,
    // Handlers
    handlers::{
        GetCharacterHandler, GetImageDownloadUrlHandler, GetImagesByIdsHandler, GetPronounHandler,
        GetPronounsByIdsHandler, ImageUrlResponse, ListCharactersHandler, ListPronounsHandler,
    },
};

pub use unit_of_work::{CommitOutcome, UnitOfWork, UnitOfWorkError, UnitOfWorkFactory};
