//! Character Context - 角色限界上下文
//!
//! 职责:
//! - Character 聚合管理（名称、描述、审计信息）
//! - 代词组与图片子实体
//! - 图片移除 / 上传失败领域事件

mod aggregate;
mod entities;
pub mod errors;
mod events;
mod value_objects;

pub use aggregate::{Character, CharacterSnapshot};
pub use entities::{Image, Pronoun};
pub use events::{DomainEvent, ImageRemovedDomainEvent, ImageUploadFailedDomainEvent};
pub use value_objects::{CharacterId, EventId, ImageId, PronounId, UploadStatus, UserId};
