//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::types::PostStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub status: PostStatus,
    pub cover: Option<CoverRecord>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Media attachment stored alongside a post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverRecord {
    pub stored_path: String,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub checksum: String,
}

impl CoverRecord {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagRecord {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: OffsetDateTime,
}
