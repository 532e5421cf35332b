use metrics::counter;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{CoverUpdate, CreatePostParams, RepoError, UpdatePostParams};
use crate::application::resource::form::{FormState, ValidationErrors};
use crate::application::viewer::Viewer;
use crate::domain::entities::PostRecord;
use crate::domain::types::{ADMIN_ROLE, PostStatus};

use super::service::AdminPostService;
use super::types::{AdminPostError, CATEGORY_INVALID, SLUG_TAKEN, SavePostCommand};

const POST_WRITES_TOTAL: &str = "postdesk_admin_post_writes_total";

/// Form values that passed validation, ready for persistence.
struct PreparedPost {
    category_id: Option<Uuid>,
    title: String,
    slug: String,
    content: String,
    status: PostStatus,
}

enum CategoryChoice {
    Unset,
    Existing(Uuid),
    Invalid,
}

impl AdminPostService {
    pub async fn create_post(
        &self,
        actor: &str,
        command: SavePostCommand,
    ) -> Result<PostRecord, AdminPostError> {
        let prepared = self.prepare(None, &command.form).await?;
        let cover = match command.cover {
            CoverUpdate::Replace(cover) => Some(cover),
            CoverUpdate::Keep | CoverUpdate::Remove => None,
        };

        let params = CreatePostParams {
            category_id: prepared.category_id,
            title: prepared.title,
            slug: prepared.slug,
            content: prepared.content,
            status: prepared.status,
            cover,
        };

        let post = self
            .writer
            .create_post(params)
            .await
            .map_err(slug_conflict_as_validation)?;

        counter!(POST_WRITES_TOTAL, "action" => "create").increment(1);
        info!(
            target = "postdesk::admin::posts",
            actor,
            post_id = %post.id,
            slug = %post.slug,
            "post created"
        );

        Ok(post)
    }

    pub async fn update_post(
        &self,
        actor: &str,
        id: Uuid,
        command: SavePostCommand,
    ) -> Result<PostRecord, AdminPostError> {
        self.require_post(id).await?;
        let prepared = self.prepare(Some(id), &command.form).await?;

        let params = UpdatePostParams {
            id,
            category_id: prepared.category_id,
            title: prepared.title,
            slug: prepared.slug,
            content: prepared.content,
            status: prepared.status,
            cover: command.cover,
        };

        let post = self
            .writer
            .update_post(params)
            .await
            .map_err(|err| match err {
                RepoError::NotFound => AdminPostError::NotFound(id),
                other => slug_conflict_as_validation(other),
            })?;

        counter!(POST_WRITES_TOTAL, "action" => "update").increment(1);
        info!(
            target = "postdesk::admin::posts",
            actor,
            post_id = %post.id,
            slug = %post.slug,
            "post updated"
        );

        Ok(post)
    }

    /// Flip a post between draft and published. Only admins may do this.
    pub async fn toggle_status(
        &self,
        viewer: &Viewer,
        id: Uuid,
    ) -> Result<PostRecord, AdminPostError> {
        if !viewer.is_admin() {
            return Err(AdminPostError::Forbidden {
                actor: viewer.actor().to_string(),
                role: ADMIN_ROLE,
            });
        }

        let post = self
            .writer
            .toggle_post_status(id)
            .await
            .map_err(|err| match err {
                RepoError::NotFound => AdminPostError::NotFound(id),
                other => AdminPostError::Repo(other),
            })?;

        counter!(POST_WRITES_TOTAL, "action" => "status").increment(1);
        info!(
            target = "postdesk::admin::posts",
            actor = viewer.actor(),
            post_id = %post.id,
            status = post.status.as_str(),
            "post status toggled"
        );

        Ok(post)
    }

    /// Soft-delete the selected posts, returning how many were still live.
    pub async fn bulk_delete(&self, actor: &str, ids: &[Uuid]) -> Result<u64, AdminPostError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let deleted = self.writer.soft_delete_posts(ids).await?;

        counter!(POST_WRITES_TOTAL, "action" => "delete").increment(deleted);
        info!(
            target = "postdesk::admin::posts",
            actor,
            requested = ids.len(),
            deleted,
            "posts soft-deleted"
        );

        Ok(deleted)
    }

    async fn prepare(
        &self,
        current: Option<Uuid>,
        form: &FormState,
    ) -> Result<PreparedPost, AdminPostError> {
        let mut errors = self
            .resource
            .form()
            .validate(form)
            .err()
            .unwrap_or_default();

        let category_id = match self.resolve_category(form.text("category_id")).await? {
            CategoryChoice::Unset => None,
            CategoryChoice::Existing(id) => Some(id),
            CategoryChoice::Invalid => {
                errors.insert("category_id", CATEGORY_INVALID);
                None
            }
        };

        let slug = form.text("slug").trim().to_string();
        if errors.get("slug").is_none()
            && let Some(existing) = self.reader.find_by_slug(&slug).await?
            && Some(existing.id) != current
        {
            errors.insert("slug", SLUG_TAKEN);
        }

        if !errors.is_empty() {
            return Err(AdminPostError::Validation(errors));
        }

        Ok(PreparedPost {
            category_id,
            title: form.text("title").trim().to_string(),
            slug,
            content: self.sanitizer.clean(form.text("content")).to_string(),
            status: PostStatus::from_flag(form.flag("status")),
        })
    }

    async fn resolve_category(&self, raw: &str) -> Result<CategoryChoice, AdminPostError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(CategoryChoice::Unset);
        }

        let Ok(id) = Uuid::parse_str(raw) else {
            return Ok(CategoryChoice::Invalid);
        };

        Ok(match self.categories.find_category(id).await? {
            Some(category) => CategoryChoice::Existing(category.id),
            None => CategoryChoice::Invalid,
        })
    }
}

/// A unique-index race on the slug surfaces as the same message the pre-check gives.
fn slug_conflict_as_validation(err: RepoError) -> AdminPostError {
    match err {
        RepoError::Duplicate { .. } => {
            let mut errors = ValidationErrors::default();
            errors.insert("slug", SLUG_TAKEN);
            AdminPostError::Validation(errors)
        }
        other => AdminPostError::Repo(other),
    }
}
