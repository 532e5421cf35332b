use thiserror::Error;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{CoverUpdate, PostSort, RepoError};
use crate::application::resource::filters::FilterState;
use crate::application::resource::form::{FormState, ValidationErrors};

#[derive(Debug, Error)]
pub enum AdminPostError {
    #[error("post form failed validation")]
    Validation(ValidationErrors),
    #[error("`{actor}` lacks the `{role}` role")]
    Forbidden { actor: String, role: &'static str },
    #[error("post `{0}` not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Submitted form plus what to do with the stored cover.
#[derive(Debug, Clone)]
pub struct SavePostCommand {
    pub form: FormState,
    pub cover: CoverUpdate,
}

#[derive(Debug, Clone, Default)]
pub struct PostListQuery {
    pub search: Option<String>,
    pub sort: PostSort,
    pub filters: FilterState,
    pub page: PageRequest,
}

pub(super) const SLUG_TAKEN: &str = "The slug has already been taken.";
pub(super) const CATEGORY_INVALID: &str = "The selected category is invalid.";
