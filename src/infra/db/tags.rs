use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CreateTagParams, RepoError, TagsRepo, TagsWriteRepo};
use crate::domain::entities::TagRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct TagRow {
    id: Uuid,
    name: String,
    slug: String,
    created_at: OffsetDateTime,
}

impl From<TagRow> for TagRecord {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl TagsRepo for PostgresRepositories {
    async fn list_tags(&self) -> Result<Vec<TagRecord>, RepoError> {
        let rows = sqlx::query_as::<_, TagRow>(
            "SELECT id, name, slug, created_at FROM tags ORDER BY lower(name), id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TagRecord::from).collect())
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<TagRecord>, RepoError> {
        let rows = sqlx::query_as::<_, TagRow>(
            "SELECT t.id, t.name, t.slug, t.created_at \
             FROM post_tags pt INNER JOIN tags t ON t.id = pt.tag_id \
             WHERE pt.post_id = $1 \
             ORDER BY lower(t.name), t.id",
        )
        .bind(post_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TagRecord::from).collect())
    }

    async fn find_tag(&self, id: Uuid) -> Result<Option<TagRecord>, RepoError> {
        let row = sqlx::query_as::<_, TagRow>(
            "SELECT id, name, slug, created_at FROM tags WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(TagRecord::from))
    }

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError> {
        let row = sqlx::query_as::<_, TagRow>(
            "SELECT id, name, slug, created_at FROM tags WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(TagRecord::from))
    }
}

#[async_trait]
impl TagsWriteRepo for PostgresRepositories {
    async fn create_tag(&self, params: CreateTagParams) -> Result<TagRecord, RepoError> {
        let row = sqlx::query_as::<_, TagRow>(
            "INSERT INTO tags (id, name, slug) VALUES ($1, $2, $3) \
             RETURNING id, name, slug, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&params.name)
        .bind(&params.slug)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(TagRecord::from(row))
    }

    async fn attach_tag(&self, post_id: Uuid, tag_id: Uuid) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO post_tags (post_id, tag_id) VALUES ($1, $2) \
             ON CONFLICT (post_id, tag_id) DO NOTHING",
        )
        .bind(post_id)
        .bind(tag_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn detach_tag(&self, post_id: Uuid, tag_id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM post_tags WHERE post_id = $1 AND tag_id = $2")
            .bind(post_id)
            .bind(tag_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
