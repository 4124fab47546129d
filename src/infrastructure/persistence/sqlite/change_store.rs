//! SQLite Change Store - Unit of Work 的事务实现
//!
//! 一个 ChangeSet 对应一个事务。更新 / 删除按 (id, version) 匹配，
//! 影响行数为 0 即并发冲突；子集合（代词关联、图片）整体替换。

use async_trait::async_trait;
use sqlx::{Sqlite, Transaction};
use tokio_util::sync::CancellationToken;

use super::{db_err, pronoun_key, write_err, DbPool};
use crate::application::ports::{
    ChangeSet, ChangeStorePort, CharacterChange, PronounChange, RepositoryError,
};
use crate::domain::character::{Character, Pronoun};

/// SQLite Change Store
pub struct SqliteChangeStore {
    pool: DbPool,
}

impl SqliteChangeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChangeStorePort for SqliteChangeStore {
    async fn persist(
        &self,
        changes: &ChangeSet,
        cancel: &CancellationToken,
    ) -> Result<(), RepositoryError> {
        if cancel.is_cancelled() {
            return Err(RepositoryError::Cancelled);
        }

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        for change in &changes.pronouns {
            match change {
                PronounChange::Added(pronoun) => insert_pronoun(&mut tx, pronoun).await?,
            }
        }

        for change in &changes.characters {
            match change {
                CharacterChange::Added(character) => {
                    insert_character(&mut tx, character).await?;
                    replace_children(&mut tx, character).await?;
                }
                CharacterChange::Updated(character) => {
                    update_character(&mut tx, character).await?;
                    replace_children(&mut tx, character).await?;
                }
                CharacterChange::Deleted(character) => {
                    delete_character(&mut tx, character).await?;
                }
            }
        }

        // 未提交的事务在 drop 时回滚；COMMIT 发出后不再响应取消
        if cancel.is_cancelled() {
            tracing::warn!(
                characters = changes.characters.len(),
                pronouns = changes.pronouns.len(),
                "Change set cancelled before commit, rolling back"
            );
            return Err(RepositoryError::Cancelled);
        }
        tx.commit().await.map_err(db_err)?;

        tracing::debug!(
            characters = changes.characters.len(),
            pronouns = changes.pronouns.len(),
            "Change set persisted"
        );

        Ok(())
    }
}

async fn insert_pronoun(tx: &mut Transaction<'_, Sqlite>, pronoun: &Pronoun) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO pronouns (id, subject, object, possessive, value_key) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(pronoun.id().to_string())
    .bind(pronoun.subject())
    .bind(pronoun.object())
    .bind(pronoun.possessive())
    .bind(pronoun_key(pronoun.subject(), pronoun.object(), pronoun.possessive()))
    .execute(&mut **tx)
    .await
    .map_err(write_err)?;
    Ok(())
}

async fn insert_character(
    tx: &mut Transaction<'_, Sqlite>,
    character: &Character,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        INSERT INTO characters
            (id, name, description, created_by, created_on, modified_by, modified_on, version)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(character.id().to_string())
    .bind(character.name())
    .bind(character.description())
    .bind(character.created_by().to_string())
    .bind(character.created_on().to_rfc3339())
    .bind(character.modified_by().map(|u| u.to_string()))
    .bind(character.modified_on().map(|t| t.to_rfc3339()))
    .bind(character.version() + 1)
    .execute(&mut **tx)
    .await
    .map_err(write_err)?;
    Ok(())
}

async fn update_character(
    tx: &mut Transaction<'_, Sqlite>,
    character: &Character,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r#"
        UPDATE characters SET
            name = ?,
            description = ?,
            modified_by = ?,
            modified_on = ?,
            version = version + 1
        WHERE id = ? AND version = ?
        "#,
    )
    .bind(character.name())
    .bind(character.description())
    .bind(character.modified_by().map(|u| u.to_string()))
    .bind(character.modified_on().map(|t| t.to_rfc3339()))
    .bind(character.id().to_string())
    .bind(character.version())
    .execute(&mut **tx)
    .await
    .map_err(write_err)?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::Conflict(format!(
            "character {} was modified or deleted concurrently (version {})",
            character.id(),
            character.version()
        )));
    }
    Ok(())
}

async fn delete_character(
    tx: &mut Transaction<'_, Sqlite>,
    character: &Character,
) -> Result<(), RepositoryError> {
    let id = character.id().to_string();

    sqlx::query("DELETE FROM character_pronouns WHERE character_id = ?")
        .bind(&id)
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;

    sqlx::query("DELETE FROM images WHERE character_id = ?")
        .bind(&id)
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;

    let result = sqlx::query("DELETE FROM characters WHERE id = ? AND version = ?")
        .bind(&id)
        .bind(character.version())
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::Conflict(format!(
            "character {} was modified or deleted concurrently (version {})",
            character.id(),
            character.version()
        )));
    }
    Ok(())
}

async fn replace_children(
    tx: &mut Transaction<'_, Sqlite>,
    character: &Character,
) -> Result<(), RepositoryError> {
    let id = character.id().to_string();

    sqlx::query("DELETE FROM character_pronouns WHERE character_id = ?")
        .bind(&id)
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;

    for (position, pronoun) in character.pronouns().iter().enumerate() {
        // 新建的代词组同时写入目录
        sqlx::query(
            r#"
            INSERT INTO pronouns (id, subject, object, possessive, value_key)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(pronoun.id().to_string())
        .bind(pronoun.subject())
        .bind(pronoun.object())
        .bind(pronoun.possessive())
        .bind(pronoun_key(pronoun.subject(), pronoun.object(), pronoun.possessive()))
        .execute(&mut **tx)
        .await
        .map_err(write_err)?;

        sqlx::query(
            "INSERT INTO character_pronouns (character_id, pronoun_id, position) VALUES (?, ?, ?)",
        )
        .bind(&id)
        .bind(pronoun.id().to_string())
        .bind(position as i64)
        .execute(&mut **tx)
        .await
        .map_err(write_err)?;
    }

    sqlx::query("DELETE FROM images WHERE character_id = ?")
        .bind(&id)
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;

    for (position, image) in character.images().iter().enumerate() {
        sqlx::query(
            "INSERT INTO images (id, character_id, name, status, position) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(image.id().to_string())
        .bind(&id)
        .bind(image.name())
        .bind(image.status().as_str())
        .bind(position as i64)
        .execute(&mut **tx)
        .await
        .map_err(write_err)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        CharacterRepositoryPort, ImageRepositoryPort, PronounRepositoryPort,
    };
    use crate::domain::character::{CharacterId, UploadStatus, UserId};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteCharacterRepository,
        SqliteImageRepository, SqlitePronounRepository,
    };

    async fn setup() -> DbPool {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn added(character: Character) -> ChangeSet {
        ChangeSet {
            characters: vec![CharacterChange::Added(character)],
            pronouns: Vec::new(),
        }
    }

    fn updated(character: Character) -> ChangeSet {
        ChangeSet {
            characters: vec![CharacterChange::Updated(character)],
            pronouns: Vec::new(),
        }
    }

    fn cancel() -> CancellationToken {
        CancellationToken::new()
    }

    #[tokio::test]
    async fn test_round_trip_through_repositories() {
        let pool = setup().await;
        let store = SqliteChangeStore::new(pool.clone());
        let characters = SqliteCharacterRepository::new(pool.clone());
        let pronouns = SqlitePronounRepository::new(pool.clone());
        let images = SqliteImageRepository::new(pool.clone());

        let user = UserId::new();
        let mut character =
            Character::create(CharacterId::new(), "Aria", Some("A bard".into()), user).unwrap();
        character.add_pronoun("she", "her", "hers", user).unwrap();
        character.add_pronoun("they", "them", "theirs", user).unwrap();
        let image = character.add_image("portrait.png", user).unwrap();
        let id = character.id();

        store.persist(&added(character), &cancel()).await.unwrap();

        let loaded = characters.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(loaded.name(), "Aria");
        assert_eq!(loaded.description(), Some("A bard"));
        assert_eq!(loaded.version(), 1);
        let subjects: Vec<_> = loaded.pronouns().iter().map(|p| p.subject()).collect();
        assert_eq!(subjects, vec!["she", "they"]);
        assert_eq!(loaded.images()[0].status(), UploadStatus::Pending);

        assert!(pronouns.exists("SHE", "her", "HERS").await.unwrap());
        assert_eq!(pronouns.find_all().await.unwrap().len(), 2);
        assert_eq!(images.find_by_ids(&[image.id()]).await.unwrap().len(), 1);
        assert_eq!(characters.find_by_created_by(user).await.unwrap().len(), 1);
        assert!(characters
            .find_by_created_by(UserId::new())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let pool = setup().await;
        let store = SqliteChangeStore::new(pool.clone());
        let characters = SqliteCharacterRepository::new(pool.clone());

        let user = UserId::new();
        let character = Character::create(CharacterId::new(), "Aria", None, user).unwrap();
        let id = character.id();
        store.persist(&added(character), &cancel()).await.unwrap();

        let mut first = characters.find_by_id(id).await.unwrap().unwrap();
        let mut second = characters.find_by_id(id).await.unwrap().unwrap();

        first.change_name("Aria Vale", user).unwrap();
        store.persist(&updated(first), &cancel()).await.unwrap();

        second.change_name("Aria Stone", user).unwrap();
        let err = store.persist(&updated(second), &cancel()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let loaded = characters.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(loaded.name(), "Aria Vale");
        assert_eq!(loaded.version(), 2);
    }

    #[tokio::test]
    async fn test_failed_change_set_rolls_back_everything() {
        let pool = setup().await;
        let store = SqliteChangeStore::new(pool.clone());
        let characters = SqliteCharacterRepository::new(pool.clone());
        let pronouns = SqlitePronounRepository::new(pool.clone());

        let user = UserId::new();
        let existing = Character::create(CharacterId::new(), "Aria", None, user).unwrap();
        store.persist(&added(existing.clone()), &cancel()).await.unwrap();

        // 新角色 + 目录新增 + 重复插入已有角色，整体失败
        let fresh = Character::create(CharacterId::new(), "Bram", None, user).unwrap();
        let fresh_id = fresh.id();
        let changes = ChangeSet {
            characters: vec![CharacterChange::Added(fresh), CharacterChange::Added(existing)],
            pronouns: vec![PronounChange::Added(Pronoun::create("xe", "xem", "xyr").unwrap())],
        };
        let err = store.persist(&changes, &cancel()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(_)));

        assert!(characters.find_by_id(fresh_id).await.unwrap().is_none());
        assert!(!pronouns.exists("xe", "xem", "xyr").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_removes_children() {
        let pool = setup().await;
        let store = SqliteChangeStore::new(pool.clone());
        let characters = SqliteCharacterRepository::new(pool.clone());
        let images = SqliteImageRepository::new(pool.clone());
        let pronouns = SqlitePronounRepository::new(pool.clone());

        let user = UserId::new();
        let mut character = Character::create(CharacterId::new(), "Aria", None, user).unwrap();
        character.add_pronoun("she", "her", "hers", user).unwrap();
        let image = character.add_image("a.png", user).unwrap();
        let id = character.id();
        store.persist(&added(character), &cancel()).await.unwrap();

        let loaded = characters.find_by_id(id).await.unwrap().unwrap();
        store
            .persist(
                &ChangeSet {
                    characters: vec![CharacterChange::Deleted(loaded)],
                    pronouns: Vec::new(),
                },
                &cancel(),
            )
            .await
            .unwrap();

        assert!(characters.find_by_id(id).await.unwrap().is_none());
        assert!(images.find_by_id(image.id()).await.unwrap().is_none());
        // 目录中的代词组保留
        assert!(pronouns.exists("she", "her", "hers").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_catalog_pronoun_rejected() {
        let pool = setup().await;
        let store = SqliteChangeStore::new(pool.clone());

        let first = ChangeSet {
            characters: Vec::new(),
            pronouns: vec![PronounChange::Added(Pronoun::create("xe", "xem", "xyr").unwrap())],
        };
        store.persist(&first, &cancel()).await.unwrap();

        let second = ChangeSet {
            characters: Vec::new(),
            pronouns: vec![PronounChange::Added(Pronoun::create("XE", "xem", "xyr").unwrap())],
        };
        let err = store.persist(&second, &cancel()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_catalog_matches_non_ascii_case() {
        let pool = setup().await;
        let store = SqliteChangeStore::new(pool.clone());
        let pronouns = SqlitePronounRepository::new(pool.clone());

        let first = ChangeSet {
            characters: Vec::new(),
            pronouns: vec![PronounChange::Added(Pronoun::create("élan", "élan", "élans").unwrap())],
        };
        store.persist(&first, &cancel()).await.unwrap();

        let found = pronouns.find_by_value("ÉLAN", "Élan", "ÉLANS").await.unwrap();
        assert_eq!(found.map(|p| p.subject().to_string()), Some("élan".to_string()));

        let second = ChangeSet {
            characters: Vec::new(),
            pronouns: vec![PronounChange::Added(Pronoun::create("ÉLAN", "élan", "élans").unwrap())],
        };
        let err = store.persist(&second, &cancel()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(_)));
        assert_eq!(pronouns.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_token_writes_nothing() {
        let pool = setup().await;
        let store = SqliteChangeStore::new(pool.clone());
        let characters = SqliteCharacterRepository::new(pool.clone());

        let character = Character::create(CharacterId::new(), "Aria", None, UserId::new()).unwrap();
        let id = character.id();
        let token = CancellationToken::new();
        token.cancel();

        let err = store.persist(&added(character), &token).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Cancelled));
        assert!(characters.find_by_id(id).await.unwrap().is_none());
    }
}
