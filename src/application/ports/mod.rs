//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod change_store;
mod event_bus;
mod image_storage;
mod repositories;

pub use change_store::{ChangeSet, ChangeStorePort, CharacterChange, PronounChange};
pub use event_bus::{DomainEventHandler, DomainEventPublisherPort, HandlerError, PublishError};
pub use image_storage::{
    DeleteOutcome, ImageStorageError, ImageStoragePort, UploadUrl, DEFAULT_UPLOAD_URL_TTL,
};
pub use repositories::{
    CharacterRepositoryPort, ImageRepositoryPort, PronounRepositoryPort, RepositoryError,
};
