use uuid::Uuid;

use crate::application::pagination::OffsetPage;
use crate::application::repos::PostQueryFilter;
use crate::application::resource::badge::NavigationBadge;
use crate::domain::entities::{CategoryRecord, PostRecord};
use crate::domain::types::PostStatus;

use super::service::AdminPostService;
use super::types::{AdminPostError, PostListQuery};

impl AdminPostService {
    pub async fn list(&self, query: &PostListQuery) -> Result<OffsetPage<PostRecord>, AdminPostError> {
        let base = PostQueryFilter {
            search: query
                .search
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            ..PostQueryFilter::default()
        };
        let filter = self.resource.table().apply_filters(&query.filters, base);

        if filter.is_contradictory() {
            return Ok(OffsetPage::new(Vec::new(), 0, query.page));
        }

        self.reader
            .list_posts(&filter, query.sort, query.page)
            .await
            .map_err(AdminPostError::from)
    }

    pub async fn load_post(&self, id: Uuid) -> Result<Option<PostRecord>, AdminPostError> {
        self.reader
            .find_by_id(id)
            .await
            .map_err(AdminPostError::from)
    }

    pub async fn require_post(&self, id: Uuid) -> Result<PostRecord, AdminPostError> {
        self.load_post(id).await?.ok_or(AdminPostError::NotFound(id))
    }

    pub async fn published_count(&self) -> Result<u64, AdminPostError> {
        let filter = PostQueryFilter::default().with_status(PostStatus::Published);
        self.reader
            .count_posts(&filter)
            .await
            .map_err(AdminPostError::from)
    }

    pub async fn navigation_badge(&self) -> Result<NavigationBadge, AdminPostError> {
        let published = self.published_count().await?;
        Ok(self.resource.navigation_badge(published))
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryRecord>, AdminPostError> {
        self.categories
            .list_categories()
            .await
            .map_err(AdminPostError::from)
    }
}
