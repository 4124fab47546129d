//! 测试替身：内存仓储 / 记录型发布器 / 内存图片存储

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    ChangeSet, ChangeStorePort, CharacterChange, CharacterRepositoryPort, DeleteOutcome,
    DomainEventPublisherPort, ImageRepositoryPort, ImageStorageError, ImageStoragePort,
    PronounChange, PronounRepositoryPort, PublishError, RepositoryError, UploadUrl,
};
use crate::application::unit_of_work::UnitOfWorkFactory;
use crate::domain::character::{
    Character, CharacterId, DomainEvent, Image, ImageId, Pronoun, PronounId, UserId,
};

// ============================================================================
// InMemoryStore
// ============================================================================

#[derive(Default)]
pub struct InMemoryStore {
    characters: Mutex<Vec<Character>>,
    pronouns: Mutex<Vec<Pronoun>>,
    pub fail_next_persist: Mutex<bool>,
}

impl InMemoryStore {
    pub fn character(&self, id: CharacterId) -> Option<Character> {
        self.characters
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id() == id)
            .cloned()
    }

    pub fn character_count(&self) -> usize {
        self.characters.lock().unwrap().len()
    }

    fn register_pronoun(pronouns: &mut Vec<Pronoun>, pronoun: &Pronoun) {
        if !pronouns.iter().any(|p| p.id() == pronoun.id()) {
            pronouns.push(pronoun.clone());
        }
    }
}

#[async_trait]
impl CharacterRepositoryPort for InMemoryStore {
    async fn find_by_id(&self, id: CharacterId) -> Result<Option<Character>, RepositoryError> {
        Ok(self.character(id))
    }

    async fn find_by_created_by(&self, user_id: UserId) -> Result<Vec<Character>, RepositoryError> {
        Ok(self
            .characters
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.created_by() == user_id)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Character>, RepositoryError> {
        Ok(self.characters.lock().unwrap().clone())
    }
}

#[async_trait]
impl PronounRepositoryPort for InMemoryStore {
    async fn exists(&self, subject: &str, object: &str, possessive: &str) -> Result<bool, RepositoryError> {
        Ok(self.find_by_value(subject, object, possessive).await?.is_some())
    }

    async fn find_by_value(
        &self,
        subject: &str,
        object: &str,
        possessive: &str,
    ) -> Result<Option<Pronoun>, RepositoryError> {
        Ok(self
            .pronouns
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.matches(subject, object, possessive))
            .cloned())
    }

    async fn find_by_id(&self, id: PronounId) -> Result<Option<Pronoun>, RepositoryError> {
        Ok(self.pronouns.lock().unwrap().iter().find(|p| p.id() == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[PronounId]) -> Result<Vec<Pronoun>, RepositoryError> {
        Ok(self
            .pronouns
            .lock()
            .unwrap()
            .iter()
            .filter(|p| ids.contains(&p.id()))
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Pronoun>, RepositoryError> {
        Ok(self.pronouns.lock().unwrap().clone())
    }
}

#[async_trait]
impl ImageRepositoryPort for InMemoryStore {
    async fn find_by_id(&self, id: ImageId) -> Result<Option<Image>, RepositoryError> {
        Ok(self
            .characters
            .lock()
            .unwrap()
            .iter()
            .find_map(|c| c.image(id).cloned()))
    }

    async fn find_by_ids(&self, ids: &[ImageId]) -> Result<Vec<Image>, RepositoryError> {
        Ok(self
            .characters
            .lock()
            .unwrap()
            .iter()
            .flat_map(|c| c.images().iter())
            .filter(|i| ids.contains(&i.id()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ChangeStorePort for InMemoryStore {
    async fn persist(
        &self,
        changes: &ChangeSet,
        cancel: &CancellationToken,
    ) -> Result<(), RepositoryError> {
        if cancel.is_cancelled() {
            return Err(RepositoryError::Cancelled);
        }
        {
            let mut fail = self.fail_next_persist.lock().unwrap();
            if *fail {
                *fail = false;
                return Err(RepositoryError::DatabaseError("simulated failure".into()));
            }
        }

        let mut characters = self.characters.lock().unwrap().clone();
        let mut pronouns = self.pronouns.lock().unwrap().clone();

        for change in &changes.pronouns {
            let PronounChange::Added(pronoun) = change;
            if pronouns.iter().any(|p| p.same_value_as(pronoun)) {
                return Err(RepositoryError::Duplicate(pronoun.to_string()));
            }
            pronouns.push(pronoun.clone());
        }

        for change in &changes.characters {
            let character = change.character();
            let position = characters.iter().position(|c| c.id() == character.id());
            match (change, position) {
                (CharacterChange::Added(_), None) => {
                    characters.push(bump_version(character));
                }
                (CharacterChange::Added(_), Some(_)) => {
                    return Err(RepositoryError::Duplicate(character.id().to_string()));
                }
                (CharacterChange::Updated(_), Some(index))
                    if characters[index].version() == character.version() =>
                {
                    characters[index] = bump_version(character);
                }
                (CharacterChange::Deleted(_), Some(index))
                    if characters[index].version() == character.version() =>
                {
                    characters.remove(index);
                }
                _ => return Err(RepositoryError::Conflict(character.id().to_string())),
            }
            if !matches!(change, CharacterChange::Deleted(_)) {
                for pronoun in character.pronouns() {
                    Self::register_pronoun(&mut pronouns, pronoun);
                }
            }
        }

        *self.characters.lock().unwrap() = characters;
        *self.pronouns.lock().unwrap() = pronouns;
        Ok(())
    }
}

fn bump_version(character: &Character) -> Character {
    let mut snapshot = character.to_snapshot();
    snapshot.version += 1;
    Character::restore(snapshot).unwrap()
}

// ============================================================================
// RecordingPublisher
// ============================================================================

#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(DomainEvent::name).collect()
    }
}

#[async_trait]
impl DomainEventPublisherPort for RecordingPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

// ============================================================================
// InMemoryImageStorage
// ============================================================================

/// image_id -> content type
#[derive(Default)]
pub struct InMemoryImageStorage {
    objects: Mutex<HashMap<ImageId, String>>,
    pub delete_calls: AtomicUsize,
}

impl InMemoryImageStorage {
    pub fn put(&self, image_id: ImageId, content_type: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert(image_id, content_type.to_string());
    }

    pub fn contains(&self, image_id: ImageId) -> bool {
        self.objects.lock().unwrap().contains_key(&image_id)
    }
}

#[async_trait]
impl ImageStoragePort for InMemoryImageStorage {
    async fn download_url(&self, image_id: ImageId) -> Result<String, ImageStorageError> {
        if !self.contains(image_id) {
            return Err(ImageStorageError::NotFound(image_id));
        }
        Ok(format!("memory://images/{image_id}"))
    }

    async fn upload_url(&self, image_id: ImageId, ttl: Duration) -> Result<UploadUrl, ImageStorageError> {
        let ttl = ChronoDuration::from_std(ttl)
            .map_err(|e| ImageStorageError::UploadUrlUnavailable(e.to_string()))?;
        Ok(UploadUrl {
            url: format!("memory://images/{image_id}/upload"),
            expires_at: Utc::now() + ttl,
        })
    }

    async fn validate(&self, image_id: ImageId) -> Result<(), ImageStorageError> {
        let objects = self.objects.lock().unwrap();
        match objects.get(&image_id) {
            None => Err(ImageStorageError::NotFound(image_id)),
            Some(ct) if !ct.starts_with("image/") => Err(ImageStorageError::InvalidContentType {
                image_id,
                content_type: ct.clone(),
            }),
            Some(_) => Ok(()),
        }
    }

    async fn delete(&self, image_id: ImageId) -> Result<DeleteOutcome, ImageStorageError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        match self.objects.lock().unwrap().remove(&image_id) {
            Some(_) => Ok(DeleteOutcome::Deleted),
            None => Ok(DeleteOutcome::NotFound),
        }
    }
}

// ============================================================================
// TestContext
// ============================================================================

pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub publisher: Arc<RecordingPublisher>,
    pub storage: Arc<InMemoryImageStorage>,
    pub user: UserId,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::default()),
            publisher: Arc::new(RecordingPublisher::default()),
            storage: Arc::new(InMemoryImageStorage::default()),
            user: UserId::new(),
        }
    }

    pub fn uow(&self) -> UnitOfWorkFactory {
        UnitOfWorkFactory::new(self.store.clone(), self.publisher.clone())
    }

    pub fn seed_pronoun(&self, subject: &str, object: &str, possessive: &str) -> Pronoun {
        let pronoun = Pronoun::create(subject, object, possessive).unwrap();
        self.store.pronouns.lock().unwrap().push(pronoun.clone());
        pronoun
    }

    pub fn seed_character(&self, name: &str) -> CharacterId {
        self.seed_character_with_images(name, &[])
    }

    pub fn seed_character_with_images(&self, name: &str, images: &[&str]) -> CharacterId {
        let mut character = Character::create(CharacterId::new(), name, None, self.user).unwrap();
        for image in images {
            character.add_image(*image, self.user).unwrap();
        }
        let id = character.id();
        self.store
            .characters
            .lock()
            .unwrap()
            .push(bump_version(&character));
        id
    }
}
