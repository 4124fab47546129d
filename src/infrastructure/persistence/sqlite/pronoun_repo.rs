//! SQLite Pronoun Repository

use async_trait::async_trait;
use sqlx::FromRow;

use super::{db_err, parse_uuid, placeholders, pronoun_key, DbPool};
use crate::application::ports::{PronounRepositoryPort, RepositoryError};
use crate::domain::character::{Pronoun, PronounId};

/// SQLite Pronoun Repository
pub struct SqlitePronounRepository {
    pool: DbPool,
}

impl SqlitePronounRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
pub(super) struct PronounRow {
    pub id: String,
    pub subject: String,
    pub object: String,
    pub possessive: String,
}

impl TryFrom<PronounRow> for Pronoun {
    type Error = RepositoryError;

    fn try_from(row: PronounRow) -> Result<Self, Self::Error> {
        Pronoun::restore(
            PronounId::from_uuid(parse_uuid(&row.id)?),
            row.subject,
            row.object,
            row.possessive,
        )
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
    }
}

#[async_trait]
impl PronounRepositoryPort for SqlitePronounRepository {
    async fn exists(
        &self,
        subject: &str,
        object: &str,
        possessive: &str,
    ) -> Result<bool, RepositoryError> {
        Ok(self.find_by_value(subject, object, possessive).await?.is_some())
    }

    async fn find_by_value(
        &self,
        subject: &str,
        object: &str,
        possessive: &str,
    ) -> Result<Option<Pronoun>, RepositoryError> {
        let row: Option<PronounRow> = sqlx::query_as(
            r#"
            SELECT id, subject, object, possessive FROM pronouns
            WHERE value_key = ?
            "#,
        )
        .bind(pronoun_key(subject, object, possessive))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(Pronoun::try_from).transpose()
    }

    async fn find_by_id(&self, id: PronounId) -> Result<Option<Pronoun>, RepositoryError> {
        let row: Option<PronounRow> =
            sqlx::query_as("SELECT id, subject, object, possessive FROM pronouns WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        row.map(Pronoun::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[PronounId]) -> Result<Vec<Pronoun>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id, subject, object, possessive FROM pronouns WHERE id IN ({})",
            placeholders(ids.len())
        );
        let mut query = sqlx::query_as::<_, PronounRow>(&sql);
        for id in ids {
            query = query.bind(id.to_string());
        }
        let rows = query.fetch_all(&self.pool).await.map_err(db_err)?;

        rows.into_iter().map(Pronoun::try_from).collect()
    }

    async fn find_all(&self) -> Result<Vec<Pronoun>, RepositoryError> {
        let rows: Vec<PronounRow> = sqlx::query_as(
            "SELECT id, subject, object, possessive FROM pronouns ORDER BY subject, object, possessive",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(Pronoun::try_from).collect()
    }
}
