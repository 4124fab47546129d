//! SQLite Character Repository
//!
//! 读取时完整重建聚合：角色行 + 代词组（按 position）+ 图片（按 position）

use async_trait::async_trait;
use sqlx::FromRow;

use super::image_repo::ImageRow;
use super::pronoun_repo::PronounRow;
use super::{db_err, parse_time, parse_uuid, DbPool};
use crate::application::ports::{CharacterRepositoryPort, RepositoryError};
use crate::domain::character::{
    Character, CharacterId, CharacterSnapshot, Image, Pronoun, UserId,
};

/// SQLite Character Repository
pub struct SqliteCharacterRepository {
    pool: DbPool,
}

impl SqliteCharacterRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn hydrate(&self, row: CharacterRow) -> Result<Character, RepositoryError> {
        let pronoun_rows: Vec<PronounRow> = sqlx::query_as(
            r#"
            SELECT p.id, p.subject, p.object, p.possessive
            FROM character_pronouns cp
            JOIN pronouns p ON p.id = cp.pronoun_id
            WHERE cp.character_id = ?
            ORDER BY cp.position
            "#,
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let image_rows: Vec<ImageRow> = sqlx::query_as(
            "SELECT id, character_id, name, status FROM images WHERE character_id = ? ORDER BY position",
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let pronouns = pronoun_rows
            .into_iter()
            .map(Pronoun::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let images = image_rows
            .into_iter()
            .map(Image::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let snapshot = CharacterSnapshot {
            id: CharacterId::from_uuid(parse_uuid(&row.id)?),
            name: row.name,
            description: row.description,
            created_by: UserId::from_uuid(parse_uuid(&row.created_by)?),
            created_on: parse_time(&row.created_on)?,
            modified_by: row
                .modified_by
                .as_deref()
                .map(parse_uuid)
                .transpose()?
                .map(UserId::from_uuid),
            modified_on: row.modified_on.as_deref().map(parse_time).transpose()?,
            version: row.version,
            pronouns,
            images,
        };

        Character::restore(snapshot).map_err(|e| RepositoryError::SerializationError(e.to_string()))
    }

    async fn hydrate_all(&self, rows: Vec<CharacterRow>) -> Result<Vec<Character>, RepositoryError> {
        let mut characters = Vec::with_capacity(rows.len());
        for row in rows {
            characters.push(self.hydrate(row).await?);
        }
        Ok(characters)
    }
}

#[derive(FromRow)]
struct CharacterRow {
    id: String,
    name: String,
    description: Option<String>,
    created_by: String,
    created_on: String,
    modified_by: Option<String>,
    modified_on: Option<String>,
    version: i64,
}

const SELECT_CHARACTER: &str = "SELECT id, name, description, created_by, created_on, modified_by, modified_on, version FROM characters";

#[async_trait]
impl CharacterRepositoryPort for SqliteCharacterRepository {
    async fn find_by_id(&self, id: CharacterId) -> Result<Option<Character>, RepositoryError> {
        let row: Option<CharacterRow> = sqlx::query_as(&format!("{SELECT_CHARACTER} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_created_by(&self, user_id: UserId) -> Result<Vec<Character>, RepositoryError> {
        let rows: Vec<CharacterRow> = sqlx::query_as(&format!(
            "{SELECT_CHARACTER} WHERE created_by = ? ORDER BY created_on DESC"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        self.hydrate_all(rows).await
    }

    async fn find_all(&self) -> Result<Vec<Character>, RepositoryError> {
        let rows: Vec<CharacterRow> =
            sqlx::query_as(&format!("{SELECT_CHARACTER} ORDER BY created_on DESC"))
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;

        self.hydrate_all(rows).await
    }
}
