//! The tags relation manager attached to the post resource.

use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{CreateTagParams, PostsRepo, RepoError, TagsRepo, TagsWriteRepo};
use crate::domain::entities::TagRecord;
use crate::domain::slug::{SlugAsyncError, SlugError, generate_unique_slug_async};

const TAG_LINKS_TOTAL: &str = "postdesk_admin_tag_links_total";

#[derive(Debug, Error)]
pub enum AdminTagError {
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error("post `{0}` not found")]
    PostNotFound(Uuid),
    #[error("tag `{0}` not found")]
    TagNotFound(Uuid),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Tags attached to a post alongside the ones that could still be attached.
#[derive(Debug, Clone)]
pub struct PostTagsPanel {
    pub attached: Vec<TagRecord>,
    pub available: Vec<TagRecord>,
}

#[derive(Clone)]
pub struct AdminPostTagsService {
    posts: Arc<dyn PostsRepo>,
    reader: Arc<dyn TagsRepo>,
    writer: Arc<dyn TagsWriteRepo>,
}

impl AdminPostTagsService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        reader: Arc<dyn TagsRepo>,
        writer: Arc<dyn TagsWriteRepo>,
    ) -> Self {
        Self {
            posts,
            reader,
            writer,
        }
    }

    pub async fn panel(&self, post_id: Uuid) -> Result<PostTagsPanel, AdminTagError> {
        self.ensure_post(post_id).await?;

        let (mut attached, all) = tokio::try_join!(
            self.reader.list_for_post(post_id),
            self.reader.list_tags()
        )?;
        attached.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        let mut available: Vec<TagRecord> = all
            .into_iter()
            .filter(|tag| attached.iter().all(|linked| linked.id != tag.id))
            .collect();
        available.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        Ok(PostTagsPanel {
            attached,
            available,
        })
    }

    pub async fn attach(
        &self,
        actor: &str,
        post_id: Uuid,
        tag_id: Uuid,
    ) -> Result<TagRecord, AdminTagError> {
        self.ensure_post(post_id).await?;
        let tag = self
            .reader
            .find_tag(tag_id)
            .await?
            .ok_or(AdminTagError::TagNotFound(tag_id))?;

        self.writer.attach_tag(post_id, tag.id).await?;

        counter!(TAG_LINKS_TOTAL, "action" => "attach").increment(1);
        info!(
            target = "postdesk::admin::tags",
            actor,
            post_id = %post_id,
            tag = %tag.slug,
            "tag attached"
        );
        Ok(tag)
    }

    /// Create a tag from `name` with a fresh unique slug and attach it.
    pub async fn create_and_attach(
        &self,
        actor: &str,
        post_id: Uuid,
        name: &str,
    ) -> Result<TagRecord, AdminTagError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AdminTagError::ConstraintViolation("name"));
        }
        self.ensure_post(post_id).await?;

        let reader = self.reader.clone();
        let slug = match generate_unique_slug_async(name, move |candidate| {
            let reader = reader.clone();
            let candidate = candidate.to_string();
            async move {
                reader
                    .find_tag_by_slug(&candidate)
                    .await
                    .map(|existing| existing.is_none())
            }
        })
        .await
        {
            Ok(slug) => slug,
            Err(SlugAsyncError::Slug(SlugError::EmptyInput | SlugError::Unrepresentable { .. })) => {
                return Err(AdminTagError::ConstraintViolation("name"));
            }
            Err(SlugAsyncError::Slug(SlugError::Exhausted { .. })) => {
                return Err(AdminTagError::ConstraintViolation("slug"));
            }
            Err(SlugAsyncError::Predicate(err)) => return Err(AdminTagError::Repo(err)),
        };

        let tag = self
            .writer
            .create_tag(CreateTagParams {
                name: name.to_string(),
                slug,
            })
            .await?;
        self.writer.attach_tag(post_id, tag.id).await?;

        counter!(TAG_LINKS_TOTAL, "action" => "create").increment(1);
        info!(
            target = "postdesk::admin::tags",
            actor,
            post_id = %post_id,
            tag = %tag.slug,
            "tag created and attached"
        );
        Ok(tag)
    }

    pub async fn detach(
        &self,
        actor: &str,
        post_id: Uuid,
        tag_id: Uuid,
    ) -> Result<(), AdminTagError> {
        self.ensure_post(post_id).await?;

        if !self.writer.detach_tag(post_id, tag_id).await? {
            return Err(AdminTagError::TagNotFound(tag_id));
        }

        counter!(TAG_LINKS_TOTAL, "action" => "detach").increment(1);
        info!(
            target = "postdesk::admin::tags",
            actor,
            post_id = %post_id,
            tag_id = %tag_id,
            "tag detached"
        );
        Ok(())
    }

    async fn ensure_post(&self, post_id: Uuid) -> Result<(), AdminTagError> {
        match self.posts.find_by_id(post_id).await? {
            Some(_) => Ok(()),
            None => Err(AdminTagError::PostNotFound(post_id)),
        }
    }
}
