//! Character Context - Domain Events
//!
//! 事件只能由 Character 聚合在状态变更校验通过后构造。

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{CharacterId, EventId, ImageId};

/// 图片已从角色中移除
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRemovedDomainEvent {
    id: EventId,
    character_id: CharacterId,
    image_id: ImageId,
    occurred_on: DateTime<Utc>,
}

impl ImageRemovedDomainEvent {
    pub(crate) fn new(character_id: CharacterId, image_id: ImageId) -> Self {
        Self {
            id: EventId::new(),
            character_id,
            image_id,
            occurred_on: Utc::now(),
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn character_id(&self) -> CharacterId {
        self.character_id
    }

    pub fn image_id(&self) -> ImageId {
        self.image_id
    }

    pub fn occurred_on(&self) -> DateTime<Utc> {
        self.occurred_on
    }
}

/// 图片上传失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageUploadFailedDomainEvent {
    id: EventId,
    character_id: CharacterId,
    image_id: ImageId,
    occurred_on: DateTime<Utc>,
}

impl ImageUploadFailedDomainEvent {
    pub(crate) fn new(character_id: CharacterId, image_id: ImageId) -> Self {
        Self {
            id: EventId::new(),
            character_id,
            image_id,
            occurred_on: Utc::now(),
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn character_id(&self) -> CharacterId {
        self.character_id
    }

    pub fn image_id(&self) -> ImageId {
        self.image_id
    }

    pub fn occurred_on(&self) -> DateTime<Utc> {
        self.occurred_on
    }
}

/// Character 聚合产生的领域事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum DomainEvent {
    ImageRemoved(ImageRemovedDomainEvent),
    ImageUploadFailed(ImageUploadFailedDomainEvent),
}

impl DomainEvent {
    pub const IMAGE_REMOVED: &'static str = "ImageRemovedDomainEvent";
    pub const IMAGE_UPLOAD_FAILED: &'static str = "ImageUploadFailedDomainEvent";

    /// 事件名（事件总线按此路由）
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::ImageRemoved(_) => Self::IMAGE_REMOVED,
            DomainEvent::ImageUploadFailed(_) => Self::IMAGE_UPLOAD_FAILED,
        }
    }

    pub fn id(&self) -> EventId {
        match self {
            DomainEvent::ImageRemoved(e) => e.id(),
            DomainEvent::ImageUploadFailed(e) => e.id(),
        }
    }

    pub fn aggregate_id(&self) -> CharacterId {
        match self {
            DomainEvent::ImageRemoved(e) => e.character_id(),
            DomainEvent::ImageUploadFailed(e) => e.character_id(),
        }
    }

    pub fn occurred_on(&self) -> DateTime<Utc> {
        match self {
            DomainEvent::ImageRemoved(e) => e.occurred_on(),
            DomainEvent::ImageUploadFailed(e) => e.occurred_on(),
        }
    }
}

impl From<ImageRemovedDomainEvent> for DomainEvent {
    fn from(event: ImageRemovedDomainEvent) -> Self {
        DomainEvent::ImageRemoved(event)
    }
}

impl From<ImageUploadFailedDomainEvent> for DomainEvent {
    fn from(event: ImageUploadFailedDomainEvent) -> Self {
        DomainEvent::ImageUploadFailed(event)
    }
}
