use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderName;

use crate::application::admin::{
    posts::AdminPostService, stats::StatsOverviewService, tags::AdminPostTagsService,
};
use crate::infra::{db::PostgresRepositories, uploads::MediaStorage};

/// Liveness probe for the backing database.
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    async fn ping(&self) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl DatabaseProbe for PostgresRepositories {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        self.health_check().await
    }
}

/// Names of the trusted headers carrying the viewer's identity.
#[derive(Debug, Clone)]
pub struct IdentityHeaders {
    pub user: HeaderName,
    pub roles: HeaderName,
}

impl Default for IdentityHeaders {
    fn default() -> Self {
        Self {
            user: HeaderName::from_static("x-postdesk-user"),
            roles: HeaderName::from_static("x-postdesk-roles"),
        }
    }
}

#[derive(Clone)]
pub struct AdminState {
    pub db: Arc<dyn DatabaseProbe>,
    pub posts: Arc<AdminPostService>,
    pub tags: Arc<AdminPostTagsService>,
    pub stats: Arc<StatsOverviewService>,
    pub media: Arc<MediaStorage>,
    pub upload_limit_bytes: u64,
    pub per_page: u32,
    pub identity: IdentityHeaders,
}
