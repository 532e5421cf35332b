//! The stats overview widget shown above the post table.

use std::sync::Arc;

use serde::Serialize;

use crate::application::repos::{PostQueryFilter, PostsRepo, RepoError};
use crate::domain::types::PostStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub label: &'static str,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsOverview {
    pub cards: Vec<StatCard>,
}

#[derive(Clone)]
pub struct StatsOverviewService {
    posts: Arc<dyn PostsRepo>,
}

impl StatsOverviewService {
    pub fn new(posts: Arc<dyn PostsRepo>) -> Self {
        Self { posts }
    }

    pub async fn overview(&self) -> Result<StatsOverview, RepoError> {
        let total_filter = PostQueryFilter::default();
        let published_filter = PostQueryFilter::default().with_status(PostStatus::Published);
        let draft_filter = PostQueryFilter::default().with_status(PostStatus::Draft);

        let (total, published, drafts) = tokio::try_join!(
            self.posts.count_posts(&total_filter),
            self.posts.count_posts(&published_filter),
            self.posts.count_posts(&draft_filter),
        )?;

        Ok(StatsOverview {
            cards: vec![
                StatCard {
                    label: "Total posts",
                    value: total,
                },
                StatCard {
                    label: "Published",
                    value: published,
                },
                StatCard {
                    label: "Drafts",
                    value: drafts,
                },
            ],
        })
    }
}
