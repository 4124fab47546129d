//! SQLite Image Repository

use async_trait::async_trait;
use sqlx::FromRow;

use super::{db_err, parse_uuid, placeholders, DbPool};
use crate::application::ports::{ImageRepositoryPort, RepositoryError};
use crate::domain::character::{errors, CharacterId, Image, ImageId, UploadStatus};

/// SQLite Image Repository
pub struct SqliteImageRepository {
    pool: DbPool,
}

impl SqliteImageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
pub(super) struct ImageRow {
    pub id: String,
    pub character_id: String,
    pub name: String,
    pub status: String,
}

impl TryFrom<ImageRow> for Image {
    type Error = RepositoryError;

    fn try_from(row: ImageRow) -> Result<Self, Self::Error> {
        let status = UploadStatus::from_str(&row.status).ok_or_else(|| {
            RepositoryError::SerializationError(errors::image::status_invalid(&row.status).to_string())
        })?;

        Image::restore(
            ImageId::from_uuid(parse_uuid(&row.id)?),
            CharacterId::from_uuid(parse_uuid(&row.character_id)?),
            row.name,
            status,
        )
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
    }
}

#[async_trait]
impl ImageRepositoryPort for SqliteImageRepository {
    async fn find_by_id(&self, id: ImageId) -> Result<Option<Image>, RepositoryError> {
        let row: Option<ImageRow> =
            sqlx::query_as("SELECT id, character_id, name, status FROM images WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        row.map(Image::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[ImageId]) -> Result<Vec<Image>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id, character_id, name, status FROM images WHERE id IN ({}) ORDER BY character_id, position",
            placeholders(ids.len())
        );
        let mut query = sqlx::query_as::<_, ImageRow>(&sql);
        for id in ids {
            query = query.bind(id.to_string());
        }
        let rows = query.fetch_all(&self.pool).await.map_err(db_err)?;

        rows.into_iter().map(Image::try_from).collect()
    }
}
