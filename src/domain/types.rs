//! Shared domain enumerations.

use serde::{Deserialize, Serialize};

/// Publication state of a post. Persisted as the boolean `posts.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn from_flag(published: bool) -> Self {
        if published {
            PostStatus::Published
        } else {
            PostStatus::Draft
        }
    }

    pub fn is_published(self) -> bool {
        matches!(self, PostStatus::Published)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PostStatus::Draft => "Draft",
            PostStatus::Published => "Published",
        }
    }
}

/// Roles understood by the admin surface.
pub const ADMIN_ROLE: &str = "admin";
