//! Unit of Work - 提交边界
//!
//! 提交流程:
//! 1. 取出所有已登记聚合的待发布领域事件（聚合按登记顺序，事件按产生顺序）
//! 2. 通过 ChangeStorePort 原子持久化全部变更
//! 3. 仅在持久化成功后逐个发布事件
//!
//! 持久化失败时不发布任何事件；`commit` 消费 self，已取出的事件随之丢弃。
//! 取消令牌只在发出 COMMIT 之前生效；一旦提交成功，取出的事件全部发布。
//! 提交后、发布前进程崩溃会丢失事件（无 outbox）。

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    ChangeSet, ChangeStorePort, CharacterChange, DomainEventPublisherPort, PronounChange,
    RepositoryError,
};
use crate::domain::character::{Character, DomainEvent, Pronoun};
use crate::domain::AggregateRoot;

/// Unit of Work 错误
#[derive(Debug, Error)]
pub enum UnitOfWorkError {
    /// 持久化失败，没有任何变更生效，也没有事件被发布
    #[error("Persistence failed: {0}")]
    Persistence(#[from] RepositoryError),

    /// 发出 COMMIT 前被取消，事务已回滚
    #[error("Commit cancelled before persistence completed")]
    Cancelled,
}

/// 提交结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    /// 持久化的变更数
    pub persisted: usize,
    /// 成功发布的事件数
    pub published: usize,
    /// 未送达的事件数（发布失败）
    pub undelivered: usize,
}

/// 创建 Unit of Work
#[derive(Clone)]
pub struct UnitOfWorkFactory {
    store: Arc<dyn ChangeStorePort>,
    publisher: Arc<dyn DomainEventPublisherPort>,
}

impl UnitOfWorkFactory {
    pub fn new(
        store: Arc<dyn ChangeStorePort>,
        publisher: Arc<dyn DomainEventPublisherPort>,
    ) -> Self {
        Self { store, publisher }
    }

    /// 每个请求一个 Unit of Work
    pub fn begin(&self) -> UnitOfWork {
        UnitOfWork {
            store: self.store.clone(),
            publisher: self.publisher.clone(),
            changes: ChangeSet::default(),
        }
    }
}

/// Unit of Work
pub struct UnitOfWork {
    store: Arc<dyn ChangeStorePort>,
    publisher: Arc<dyn DomainEventPublisherPort>,
    changes: ChangeSet,
}

impl UnitOfWork {
    pub fn add_character(&mut self, character: Character) {
        self.changes.characters.push(CharacterChange::Added(character));
    }

    pub fn update_character(&mut self, character: Character) {
        self.changes.characters.push(CharacterChange::Updated(character));
    }

    pub fn delete_character(&mut self, character: Character) {
        self.changes.characters.push(CharacterChange::Deleted(character));
    }

    pub fn add_pronoun(&mut self, pronoun: Pronoun) {
        self.changes.pronouns.push(PronounChange::Added(pronoun));
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// 持久化全部变更，成功后发布领域事件
    pub async fn commit(mut self, cancel: &CancellationToken) -> Result<CommitOutcome, UnitOfWorkError> {
        if self.changes.is_empty() {
            return Ok(CommitOutcome::default());
        }

        let events = self.drain_events();

        let persisted = self.changes.len();
        // 不与取消令牌竞争；令牌只由存储在 COMMIT 前检查
        match self.store.persist(&self.changes, cancel).await {
            Ok(()) => {}
            Err(RepositoryError::Cancelled) => {
                tracing::warn!(
                    changes = persisted,
                    dropped_events = events.len(),
                    "Unit of work cancelled before persistence"
                );
                return Err(UnitOfWorkError::Cancelled);
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    dropped_events = events.len(),
                    "Unit of work persistence failed, no events published"
                );
                return Err(e.into());
            }
        }

        let (published, undelivered) = self.dispatch(&events).await;

        tracing::debug!(
            changes = persisted,
            published = published,
            undelivered = undelivered,
            "Unit of work committed"
        );

        Ok(CommitOutcome {
            persisted,
            published,
            undelivered,
        })
    }

    fn drain_events(&mut self) -> Vec<DomainEvent> {
        let mut events = Vec::new();
        for change in self.changes.characters.iter_mut() {
            let character = change.character_mut();
            if character.has_domain_events() {
                events.extend(character.take_domain_events());
            }
        }
        events
    }

    /// 逐个发布，返回 (已发布, 未送达)
    ///
    /// 失败已由发布方记录，这里只计数。
    async fn dispatch(&self, events: &[DomainEvent]) -> (usize, usize) {
        let mut published = 0;
        let mut failed = 0;

        for event in events {
            match self.publisher.publish(event).await {
                Ok(()) => published += 1,
                Err(e) => {
                    failed += 1;
                    tracing::debug!(
                        event_id = %event.id(),
                        event = event.name(),
                        error = %e,
                        "Domain event undelivered"
                    );
                }
            }
        }

        (published, failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::PublishError;
    use crate::domain::character::{CharacterId, UserId};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeStore {
        fail: bool,
        calls: AtomicUsize,
        persisted: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl ChangeStorePort for FakeStore {
        async fn persist(
            &self,
            changes: &ChangeSet,
            cancel: &CancellationToken,
        ) -> Result<(), RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if cancel.is_cancelled() {
                return Err(RepositoryError::Cancelled);
            }
            if self.fail {
                return Err(RepositoryError::DatabaseError("disk full".into()));
            }
            self.persisted.lock().unwrap().push(changes.len());
            Ok(())
        }
    }

    /// 提交后迟迟不返回的存储
    #[derive(Default)]
    struct SlowAckStore {
        committed: AtomicBool,
    }

    #[async_trait]
    impl ChangeStorePort for SlowAckStore {
        async fn persist(
            &self,
            _changes: &ChangeSet,
            cancel: &CancellationToken,
        ) -> Result<(), RepositoryError> {
            if cancel.is_cancelled() {
                return Err(RepositoryError::Cancelled);
            }
            self.committed.store(true, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<DomainEvent>>,
        fail_first: bool,
        cancel_after_first: Option<CancellationToken>,
    }

    #[async_trait]
    impl DomainEventPublisherPort for RecordingPublisher {
        async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
            let mut published = self.published.lock().unwrap();
            if self.fail_first && published.is_empty() {
                published.push(event.clone());
                return Err(PublishError::Failed("handler panicked".into()));
            }
            published.push(event.clone());
            if let Some(token) = &self.cancel_after_first {
                token.cancel();
            }
            Ok(())
        }
    }

    fn character_with_removed_images(count: usize) -> Character {
        let user = UserId::new();
        let mut character = Character::create(CharacterId::new(), "Aria", None, user).unwrap();
        for n in 0..count {
            let image = character.add_image(format!("{n}.png"), user).unwrap();
            character.remove_image(image.id(), user).unwrap();
        }
        character
    }

    fn factory(store: Arc<FakeStore>, publisher: Arc<RecordingPublisher>) -> UnitOfWorkFactory {
        UnitOfWorkFactory::new(store, publisher)
    }

    #[tokio::test]
    async fn test_persistence_failure_publishes_nothing() {
        let store = Arc::new(FakeStore {
            fail: true,
            ..Default::default()
        });
        let publisher = Arc::new(RecordingPublisher::default());

        let mut uow = factory(store.clone(), publisher.clone()).begin();
        uow.update_character(character_with_removed_images(1));

        let err = uow.commit(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, UnitOfWorkError::Persistence(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_publishes_each_event_once_in_order() {
        let store = Arc::new(FakeStore::default());
        let publisher = Arc::new(RecordingPublisher::default());

        let first = character_with_removed_images(2);
        let second = character_with_removed_images(1);
        let expected: Vec<_> = first
            .domain_events()
            .iter()
            .chain(second.domain_events())
            .map(DomainEvent::id)
            .collect();

        let mut uow = factory(store.clone(), publisher.clone()).begin();
        uow.update_character(first);
        uow.add_character(character_with_removed_images(0));
        uow.update_character(second);

        let outcome = uow.commit(&CancellationToken::new()).await.unwrap();
        assert_eq!(
            outcome,
            CommitOutcome {
                persisted: 3,
                published: 3,
                undelivered: 0
            }
        );

        let published: Vec<_> = publisher
            .published
            .lock()
            .unwrap()
            .iter()
            .map(DomainEvent::id)
            .collect();
        assert_eq!(published, expected);
        assert_eq!(*store.persisted.lock().unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn test_empty_unit_of_work_skips_store() {
        let store = Arc::new(FakeStore::default());
        let publisher = Arc::new(RecordingPublisher::default());

        let uow = factory(store.clone(), publisher).begin();
        assert!(uow.is_empty());
        let outcome = uow.commit(&CancellationToken::new()).await.unwrap();

        assert_eq!(outcome, CommitOutcome::default());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_persist() {
        let store = Arc::new(FakeStore::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut uow = factory(store.clone(), publisher.clone()).begin();
        uow.update_character(character_with_removed_images(1));

        let err = uow.commit(&cancel).await.unwrap_err();
        assert!(matches!(err, UnitOfWorkError::Cancelled));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert!(store.persisted.lock().unwrap().is_empty());
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_after_commit_issued_still_publishes() {
        let store = Arc::new(SlowAckStore::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let mut uow = UnitOfWorkFactory::new(store.clone(), publisher.clone()).begin();
        uow.update_character(character_with_removed_images(1));

        let outcome = uow.commit(&cancel).await.unwrap();
        assert!(cancel.is_cancelled());
        assert!(store.committed.load(Ordering::SeqCst));
        assert_eq!(outcome.published, 1);
        assert_eq!(publisher.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_during_dispatch_publishes_remaining() {
        let cancel = CancellationToken::new();
        let store = Arc::new(FakeStore::default());
        let publisher = Arc::new(RecordingPublisher {
            cancel_after_first: Some(cancel.clone()),
            ..Default::default()
        });

        let mut uow = factory(store, publisher.clone()).begin();
        uow.update_character(character_with_removed_images(3));

        let outcome = uow.commit(&cancel).await.unwrap();
        assert_eq!(outcome.published, 3);
        assert_eq!(outcome.undelivered, 0);
        assert_eq!(publisher.published.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_stop_dispatch() {
        let store = Arc::new(FakeStore::default());
        let publisher = Arc::new(RecordingPublisher {
            fail_first: true,
            ..Default::default()
        });

        let mut uow = factory(store, publisher.clone()).begin();
        uow.update_character(character_with_removed_images(2));

        let outcome = uow.commit(&CancellationToken::new()).await.unwrap();
        assert_eq!(outcome.published, 1);
        assert_eq!(outcome.undelivered, 1);
        assert_eq!(publisher.published.lock().unwrap().len(), 2);
    }
}
