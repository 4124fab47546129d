//! In-Process Event Bus
//!
//! 实现 DomainEventPublisherPort：
//! - 按事件名注册处理器，按注册顺序依次投递
//! - 每个事件同时广播到 broadcast 通道，供观察者订阅

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::application::ports::{DomainEventHandler, DomainEventPublisherPort, PublishError};
use crate::domain::character::DomainEvent;

/// 进程内事件总线
pub struct InProcessEventBus {
    /// event name -> handlers（注册顺序）
    handlers: DashMap<&'static str, Vec<Arc<dyn DomainEventHandler>>>,
    /// 全局广播通道
    channel: broadcast::Sender<DomainEvent>,
}

impl InProcessEventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            handlers: DashMap::new(),
            channel: tx,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 注册处理器到其声明的所有事件名
    pub fn subscribe(&self, handler: Arc<dyn DomainEventHandler>) {
        for name in handler.event_names() {
            tracing::debug!(handler = handler.name(), event = name, "Event handler registered");
            self.handlers.entry(name).or_default().push(handler.clone());
        }
    }

    /// 订阅所有已发布事件
    pub fn subscribe_all(&self) -> broadcast::Receiver<DomainEvent> {
        self.channel.subscribe()
    }

    /// 某事件名下的处理器数量
    pub fn handler_count(&self, event_name: &str) -> usize {
        self.handlers.get(event_name).map(|h| h.len()).unwrap_or(0)
    }
}

#[async_trait]
impl DomainEventPublisherPort for InProcessEventBus {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
        // 先克隆出处理器列表，避免跨 await 持有 DashMap 锁
        let handlers: Vec<Arc<dyn DomainEventHandler>> = self
            .handlers
            .get(event.name())
            .map(|h| h.value().clone())
            .unwrap_or_default();

        let mut failures = Vec::new();
        for handler in &handlers {
            if let Err(e) = handler.handle(event).await {
                tracing::error!(
                    event = event.name(),
                    event_id = %event.id(),
                    character_id = %event.aggregate_id(),
                    handler = handler.name(),
                    error = %e,
                    "Domain event handler failed"
                );
                failures.push(e.to_string());
            }
        }

        if let Err(e) = self.channel.send(event.clone()) {
            tracing::debug!(
                event = event.name(),
                event_id = %event.id(),
                error = %e,
                "Domain event not broadcast (no receivers)"
            );
        }

        tracing::debug!(
            event = event.name(),
            event_id = %event.id(),
            aggregate_id = %event.aggregate_id(),
            handlers = handlers.len(),
            "Domain event dispatched"
        );

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PublishError::Failed(failures.join("; ")))
        }
    }
}
