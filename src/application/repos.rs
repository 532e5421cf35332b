//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::Date;
use uuid::Uuid;

use crate::application::pagination::{OffsetPage, PageRequest};
use crate::domain::entities::{CategoryRecord, CoverRecord, PostRecord, TagRecord};
use crate::domain::types::PostStatus;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Constraints applied to the admin post listing. All present constraints combine with AND;
/// soft-deleted posts are always excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQueryFilter {
    pub search: Option<String>,
    /// Every listed status must hold, so requesting both yields nothing.
    pub statuses: Vec<PostStatus>,
    pub category: Option<String>,
    pub created_from: Option<Date>,
    pub created_until: Option<Date>,
}

impl PostQueryFilter {
    pub fn with_status(mut self, status: PostStatus) -> Self {
        if !self.statuses.contains(&status) {
            self.statuses.push(status);
        }
        self
    }

    /// True when both statuses are demanded at once, which no post can satisfy.
    pub fn is_contradictory(&self) -> bool {
        self.statuses.contains(&PostStatus::Draft) && self.statuses.contains(&PostStatus::Published)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostSort {
    #[default]
    Newest,
    TitleAsc,
    TitleDesc,
}

impl PostSort {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::trim) {
            None | Some("") => Some(PostSort::Newest),
            Some("title") => Some(PostSort::TitleAsc),
            Some("-title") => Some(PostSort::TitleDesc),
            Some(_) => None,
        }
    }

    pub fn as_param(self) -> Option<&'static str> {
        match self {
            PostSort::Newest => None,
            PostSort::TitleAsc => Some("title"),
            PostSort::TitleDesc => Some("-title"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub category_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub status: PostStatus,
    pub cover: Option<CoverRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoverUpdate {
    Keep,
    Replace(CoverRecord),
    Remove,
}

#[derive(Debug, Clone)]
pub struct UpdatePostParams {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub status: PostStatus,
    pub cover: CoverUpdate,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn list_posts(
        &self,
        filter: &PostQueryFilter,
        sort: PostSort,
        page: PageRequest,
    ) -> Result<OffsetPage<PostRecord>, RepoError>;

    async fn count_posts(&self, filter: &PostQueryFilter) -> Result<u64, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError>;

    /// Flip the status of a live post in a single write.
    async fn toggle_post_status(&self, id: Uuid) -> Result<PostRecord, RepoError>;

    /// Soft-delete the given posts, returning how many live rows were affected.
    async fn soft_delete_posts(&self, ids: &[Uuid]) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError>;

    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateTagParams {
    pub name: String,
    pub slug: String,
}

#[async_trait]
pub trait TagsRepo: Send + Sync {
    async fn list_tags(&self) -> Result<Vec<TagRecord>, RepoError>;

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<TagRecord>, RepoError>;

    async fn find_tag(&self, id: Uuid) -> Result<Option<TagRecord>, RepoError>;

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError>;
}

#[async_trait]
pub trait TagsWriteRepo: Send + Sync {
    async fn create_tag(&self, params: CreateTagParams) -> Result<TagRecord, RepoError>;

    /// Attach a tag to a post; attaching twice is a no-op.
    async fn attach_tag(&self, post_id: Uuid, tag_id: Uuid) -> Result<(), RepoError>;

    /// Detach a tag, returning whether a link existed.
    async fn detach_tag(&self, post_id: Uuid, tag_id: Uuid) -> Result<bool, RepoError>;
}
