//! Event Bus Ports - 领域事件发布与订阅
//!
//! 发布发生在提交成功之后；处理器失败只记录日志，不回滚已提交的变更。

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::character::DomainEvent;

/// 事件发布错误
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Event bus closed")]
    Closed,

    #[error("Publish failed: {0}")]
    Failed(String),
}

/// 事件处理器错误
#[derive(Debug, Error)]
#[error("{handler} failed: {message}")]
pub struct HandlerError {
    pub handler: &'static str,
    pub message: String,
}

impl HandlerError {
    pub fn new(handler: &'static str, message: impl Into<String>) -> Self {
        Self {
            handler,
            message: message.into(),
        }
    }
}

/// Domain Event Publisher Port
#[async_trait]
pub trait DomainEventPublisherPort: Send + Sync {
    /// 将单个事件投递给所有订阅该事件名的处理器
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError>;
}

/// Domain Event Handler
#[async_trait]
pub trait DomainEventHandler: Send + Sync {
    /// 处理器名称（日志用）
    fn name(&self) -> &'static str;

    /// 订阅的事件名，见 `DomainEvent::name`
    fn event_names(&self) -> Vec<&'static str>;

    async fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError>;
}
