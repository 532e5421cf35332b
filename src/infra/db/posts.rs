use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{OffsetPage, PageRequest};
use crate::application::repos::{
    CoverUpdate, CreatePostParams, PostQueryFilter, PostSort, PostsRepo, PostsWriteRepo,
    RepoError, UpdatePostParams,
};
use crate::domain::entities::{CoverRecord, PostRecord};
use crate::domain::types::PostStatus;

use super::{PostgresRepositories, map_sqlx_error};

const SELECT_POSTS: &str = "SELECT p.id, p.category_id, c.name AS category_name, p.title, \
     p.slug, p.content, p.status, p.cover_path, p.cover_filename, p.cover_content_type, \
     p.cover_size_bytes, p.cover_checksum, p.created_at, p.updated_at \
     FROM posts p LEFT JOIN categories c ON c.id = p.category_id \
     WHERE p.deleted_at IS NULL";

const COUNT_POSTS: &str = "SELECT COUNT(*) FROM posts p \
     LEFT JOIN categories c ON c.id = p.category_id \
     WHERE p.deleted_at IS NULL";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    category_id: Option<Uuid>,
    category_name: Option<String>,
    title: String,
    slug: String,
    content: String,
    status: bool,
    cover_path: Option<String>,
    cover_filename: Option<String>,
    cover_content_type: Option<String>,
    cover_size_bytes: Option<i64>,
    cover_checksum: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        let cover = match (row.cover_path, row.cover_filename, row.cover_content_type) {
            (Some(stored_path), Some(filename), Some(content_type)) => Some(CoverRecord {
                stored_path,
                filename,
                content_type,
                size_bytes: row.cover_size_bytes.unwrap_or_default(),
                checksum: row.cover_checksum.unwrap_or_default(),
            }),
            _ => None,
        };

        Self {
            id: row.id,
            category_id: row.category_id,
            category_name: row.category_name,
            title: row.title,
            slug: row.slug,
            content: row.content,
            status: PostStatus::from_flag(row.status),
            cover,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Postgres>, sort: PostSort) {
    match sort {
        PostSort::Newest => qb.push(" ORDER BY p.created_at DESC, p.id DESC"),
        PostSort::TitleAsc => qb.push(" ORDER BY p.title ASC, p.id ASC"),
        PostSort::TitleDesc => qb.push(" ORDER BY p.title DESC, p.id DESC"),
    };
}

fn push_cover_columns(qb: &mut QueryBuilder<'_, Postgres>, cover: Option<&CoverRecord>) {
    qb.push(", cover_path = ");
    qb.push_bind(cover.map(|c| c.stored_path.clone()));
    qb.push(", cover_filename = ");
    qb.push_bind(cover.map(|c| c.filename.clone()));
    qb.push(", cover_content_type = ");
    qb.push_bind(cover.map(|c| c.content_type.clone()));
    qb.push(", cover_size_bytes = ");
    qb.push_bind(cover.map(|c| c.size_bytes));
    qb.push(", cover_checksum = ");
    qb.push_bind(cover.map(|c| c.checksum.clone()));
}

impl PostgresRepositories {
    async fn fetch_post(&self, id: Uuid) -> Result<PostRecord, RepoError> {
        self.find_by_id(id).await?.ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_posts(
        &self,
        filter: &PostQueryFilter,
        sort: PostSort,
        page: PageRequest,
    ) -> Result<OffsetPage<PostRecord>, RepoError> {
        let total = self.count_posts(filter).await?;

        let mut qb = QueryBuilder::<Postgres>::new(SELECT_POSTS);
        Self::apply_post_filter(&mut qb, filter);
        push_order(&mut qb, sort);
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(page.per_page()));
        qb.push(" OFFSET ");
        qb.push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));

        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let items = rows.into_iter().map(PostRecord::from).collect();
        Ok(OffsetPage::new(items, total, page))
    }

    async fn count_posts(&self, filter: &PostQueryFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(COUNT_POSTS);
        Self::apply_post_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_POSTS);
        qb.push(" AND p.id = ");
        qb.push_bind(id);

        let row = qb
            .build_query_as::<PostRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_POSTS);
        qb.push(" AND p.slug = ");
        qb.push_bind(slug.to_string());

        let row = qb
            .build_query_as::<PostRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let id = Uuid::new_v4();
        let cover = params.cover.as_ref();

        sqlx::query(
            "INSERT INTO posts (id, category_id, title, slug, content, status, cover_path, \
             cover_filename, cover_content_type, cover_size_bytes, cover_checksum) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(id)
        .bind(params.category_id)
        .bind(&params.title)
        .bind(&params.slug)
        .bind(&params.content)
        .bind(params.status.is_published())
        .bind(cover.map(|c| c.stored_path.as_str()))
        .bind(cover.map(|c| c.filename.as_str()))
        .bind(cover.map(|c| c.content_type.as_str()))
        .bind(cover.map(|c| c.size_bytes))
        .bind(cover.map(|c| c.checksum.as_str()))
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        self.fetch_post(id).await
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE posts SET category_id = ");
        qb.push_bind(params.category_id);
        qb.push(", title = ");
        qb.push_bind(params.title.clone());
        qb.push(", slug = ");
        qb.push_bind(params.slug.clone());
        qb.push(", content = ");
        qb.push_bind(params.content.clone());
        qb.push(", status = ");
        qb.push_bind(params.status.is_published());
        qb.push(", updated_at = now()");

        match &params.cover {
            CoverUpdate::Keep => {}
            CoverUpdate::Replace(cover) => push_cover_columns(&mut qb, Some(cover)),
            CoverUpdate::Remove => push_cover_columns(&mut qb, None),
        }

        qb.push(" WHERE id = ");
        qb.push_bind(params.id);
        qb.push(" AND deleted_at IS NULL");

        let result = qb
            .build()
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        self.fetch_post(params.id).await
    }

    async fn toggle_post_status(&self, id: Uuid) -> Result<PostRecord, RepoError> {
        let toggled: Option<Uuid> = sqlx::query_scalar(
            "UPDATE posts SET status = NOT status, updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING id",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        match toggled {
            Some(id) => self.fetch_post(id).await,
            None => Err(RepoError::NotFound),
        }
    }

    async fn soft_delete_posts(&self, ids: &[Uuid]) -> Result<u64, RepoError> {
        let result = sqlx::query(
            "UPDATE posts SET deleted_at = now() \
             WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(ids)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
