#![allow(dead_code)]

use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use axum::Router;
use postdesk::{
    application::{
        admin::{
            posts::AdminPostService, stats::StatsOverviewService, tags::AdminPostTagsService,
        },
        pagination::{OffsetPage, PageRequest},
        repos::{
            CategoriesRepo, CoverUpdate, CreatePostParams, CreateTagParams, PostQueryFilter,
            PostSort, PostsRepo, PostsWriteRepo, RepoError, TagsRepo, TagsWriteRepo,
            UpdatePostParams,
        },
        resource::PostResource,
    },
    domain::{
        entities::{CategoryRecord, CoverRecord, PostRecord, TagRecord},
        types::PostStatus,
    },
    infra::{
        http::{AdminState, DatabaseProbe, IdentityHeaders, build_admin_router},
        uploads::MediaStorage,
    },
};
use time::{Duration, OffsetDateTime, macros::datetime};
use tokio::sync::Mutex;
use uuid::Uuid;

pub const ADMIN_USER: (&str, &str) = ("x-postdesk-user", "ada");
pub const ADMIN_ROLES: (&str, &str) = ("x-postdesk-roles", "admin");

const EPOCH: OffsetDateTime = datetime!(2024-01-01 09:00 UTC);

#[derive(Debug, Clone)]
struct StoredPost {
    record: PostRecord,
    deleted: bool,
}

#[derive(Default)]
struct StoreState {
    posts: Vec<StoredPost>,
    categories: Vec<CategoryRecord>,
    tags: Vec<TagRecord>,
    links: Vec<(Uuid, Uuid)>,
}

/// In-memory stand-in for every repository the admin reads and writes.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn add_category(&self, name: &str) -> CategoryRecord {
        let mut state = self.state.lock().await;
        let category = CategoryRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: EPOCH,
        };
        state.categories.push(category.clone());
        category
    }

    pub async fn add_tag(&self, name: &str, slug: &str) -> TagRecord {
        let mut state = self.state.lock().await;
        let tag = TagRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
            created_at: EPOCH,
        };
        state.tags.push(tag.clone());
        tag
    }

    /// Seed a post created `age_days` after the fixture epoch.
    pub async fn add_post(
        &self,
        title: &str,
        status: PostStatus,
        category: Option<&CategoryRecord>,
        age_days: i64,
    ) -> PostRecord {
        let mut state = self.state.lock().await;
        let created_at = EPOCH + Duration::days(age_days);
        let record = PostRecord {
            id: Uuid::new_v4(),
            category_id: category.map(|c| c.id),
            category_name: category.map(|c| c.name.clone()),
            title: title.to_string(),
            slug: slug::slugify(title),
            content: format!("<p>{title}</p>"),
            status,
            cover: None,
            created_at,
            updated_at: created_at,
        };
        state.posts.push(StoredPost {
            record: record.clone(),
            deleted: false,
        });
        record
    }

    pub async fn set_cover(&self, id: Uuid, cover: CoverRecord) {
        let mut state = self.state.lock().await;
        if let Some(post) = state.posts.iter_mut().find(|p| p.record.id == id) {
            post.record.cover = Some(cover);
        }
    }

    pub async fn post(&self, id: Uuid) -> Option<PostRecord> {
        let state = self.state.lock().await;
        state
            .posts
            .iter()
            .find(|p| p.record.id == id && !p.deleted)
            .map(|p| p.record.clone())
    }

    pub async fn live_posts(&self) -> Vec<PostRecord> {
        let state = self.state.lock().await;
        state
            .posts
            .iter()
            .filter(|p| !p.deleted)
            .map(|p| p.record.clone())
            .collect()
    }

    pub async fn tag_names_for(&self, post_id: Uuid) -> Vec<String> {
        let state = self.state.lock().await;
        let mut names: Vec<String> = state
            .links
            .iter()
            .filter(|(post, _)| *post == post_id)
            .filter_map(|(_, tag)| state.tags.iter().find(|t| t.id == *tag))
            .map(|tag| tag.name.clone())
            .collect();
        names.sort();
        names
    }

    fn category_name(state: &StoreState, id: Option<Uuid>) -> Option<String> {
        id.and_then(|id| state.categories.iter().find(|c| c.id == id))
            .map(|c| c.name.clone())
    }
}

fn matches_filter(record: &PostRecord, filter: &PostQueryFilter) -> bool {
    if let Some(search) = filter.search.as_deref()
        && !record
            .title
            .to_lowercase()
            .contains(&search.to_lowercase())
    {
        return false;
    }
    if !filter.statuses.iter().all(|status| *status == record.status) {
        return false;
    }
    if let Some(category) = filter.category.as_deref()
        && record.category_name.as_deref() != Some(category)
    {
        return false;
    }
    let created = record.created_at.date();
    if filter.created_from.is_some_and(|from| created < from) {
        return false;
    }
    if filter.created_until.is_some_and(|until| created > until) {
        return false;
    }
    true
}

#[async_trait]
impl PostsRepo for MemoryStore {
    async fn list_posts(
        &self,
        filter: &PostQueryFilter,
        sort: PostSort,
        page: PageRequest,
    ) -> Result<OffsetPage<PostRecord>, RepoError> {
        let state = self.state.lock().await;
        let mut items: Vec<PostRecord> = state
            .posts
            .iter()
            .filter(|p| !p.deleted && matches_filter(&p.record, filter))
            .map(|p| p.record.clone())
            .collect();

        match sort {
            PostSort::Newest => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            PostSort::TitleAsc => items.sort_by(|a, b| a.title.cmp(&b.title)),
            PostSort::TitleDesc => items.sort_by(|a, b| b.title.cmp(&a.title)),
        }

        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(OffsetPage::new(items, total, page))
    }

    async fn count_posts(&self, filter: &PostQueryFilter) -> Result<u64, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .posts
            .iter()
            .filter(|p| !p.deleted && matches_filter(&p.record, filter))
            .count() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        Ok(self.post(id).await)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .posts
            .iter()
            .find(|p| !p.deleted && p.record.slug == slug)
            .map(|p| p.record.clone()))
    }
}

#[async_trait]
impl PostsWriteRepo for MemoryStore {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let mut state = self.state.lock().await;
        if state
            .posts
            .iter()
            .any(|p| !p.deleted && p.record.slug == params.slug)
        {
            return Err(RepoError::Duplicate {
                constraint: "posts_slug_key".into(),
            });
        }

        let now = OffsetDateTime::now_utc();
        let record = PostRecord {
            id: Uuid::new_v4(),
            category_name: Self::category_name(&state, params.category_id),
            category_id: params.category_id,
            title: params.title,
            slug: params.slug,
            content: params.content,
            status: params.status,
            cover: params.cover,
            created_at: now,
            updated_at: now,
        };
        state.posts.push(StoredPost {
            record: record.clone(),
            deleted: false,
        });
        Ok(record)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let mut state = self.state.lock().await;
        let category_name = Self::category_name(&state, params.category_id);
        let post = state
            .posts
            .iter_mut()
            .find(|p| !p.deleted && p.record.id == params.id)
            .ok_or(RepoError::NotFound)?;

        let record = &mut post.record;
        record.category_id = params.category_id;
        record.category_name = category_name;
        record.title = params.title;
        record.slug = params.slug;
        record.content = params.content;
        record.status = params.status;
        match params.cover {
            CoverUpdate::Keep => {}
            CoverUpdate::Replace(cover) => record.cover = Some(cover),
            CoverUpdate::Remove => record.cover = None,
        }
        record.updated_at = OffsetDateTime::now_utc();
        Ok(record.clone())
    }

    async fn toggle_post_status(&self, id: Uuid) -> Result<PostRecord, RepoError> {
        let mut state = self.state.lock().await;
        let post = state
            .posts
            .iter_mut()
            .find(|p| !p.deleted && p.record.id == id)
            .ok_or(RepoError::NotFound)?;
        post.record.status = PostStatus::from_flag(!post.record.status.is_published());
        Ok(post.record.clone())
    }

    async fn soft_delete_posts(&self, ids: &[Uuid]) -> Result<u64, RepoError> {
        let mut state = self.state.lock().await;
        let mut deleted = 0;
        for post in state
            .posts
            .iter_mut()
            .filter(|p| !p.deleted && ids.contains(&p.record.id))
        {
            post.deleted = true;
            deleted += 1;
        }
        Ok(deleted)
    }
}

#[async_trait]
impl CategoriesRepo for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        let state = self.state.lock().await;
        let mut categories = state.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        let state = self.state.lock().await;
        Ok(state.categories.iter().find(|c| c.id == id).cloned())
    }
}

#[async_trait]
impl TagsRepo for MemoryStore {
    async fn list_tags(&self) -> Result<Vec<TagRecord>, RepoError> {
        let state = self.state.lock().await;
        Ok(state.tags.clone())
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<TagRecord>, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .links
            .iter()
            .filter(|(post, _)| *post == post_id)
            .filter_map(|(_, tag)| state.tags.iter().find(|t| t.id == *tag).cloned())
            .collect())
    }

    async fn find_tag(&self, id: Uuid) -> Result<Option<TagRecord>, RepoError> {
        let state = self.state.lock().await;
        Ok(state.tags.iter().find(|t| t.id == id).cloned())
    }

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError> {
        let state = self.state.lock().await;
        Ok(state.tags.iter().find(|t| t.slug == slug).cloned())
    }
}

#[async_trait]
impl TagsWriteRepo for MemoryStore {
    async fn create_tag(&self, params: CreateTagParams) -> Result<TagRecord, RepoError> {
        let mut state = self.state.lock().await;
        let tag = TagRecord {
            id: Uuid::new_v4(),
            name: params.name,
            slug: params.slug,
            created_at: OffsetDateTime::now_utc(),
        };
        state.tags.push(tag.clone());
        Ok(tag)
    }

    async fn attach_tag(&self, post_id: Uuid, tag_id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.lock().await;
        if !state.links.contains(&(post_id, tag_id)) {
            state.links.push((post_id, tag_id));
        }
        Ok(())
    }

    async fn detach_tag(&self, post_id: Uuid, tag_id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.state.lock().await;
        let before = state.links.len();
        state.links.retain(|link| *link != (post_id, tag_id));
        Ok(state.links.len() != before)
    }
}

#[async_trait]
impl DatabaseProbe for MemoryStore {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        if self.offline.load(Ordering::SeqCst) {
            Err(sqlx::Error::PoolTimedOut)
        } else {
            Ok(())
        }
    }
}

/// Admin state wired to `store`, with media kept under `media_root`.
pub fn admin_state(store: &Arc<MemoryStore>, media_root: &Path) -> AdminState {
    let resource = Arc::new(PostResource::new(3));
    let media = Arc::new(MediaStorage::new(media_root.to_path_buf()).expect("media root"));

    AdminState {
        db: store.clone(),
        posts: Arc::new(AdminPostService::new(
            resource,
            store.clone(),
            store.clone(),
            store.clone(),
        )),
        tags: Arc::new(AdminPostTagsService::new(
            store.clone(),
            store.clone(),
            store.clone(),
        )),
        stats: Arc::new(StatsOverviewService::new(store.clone())),
        media,
        upload_limit_bytes: 1024 * 1024,
        per_page: 15,
        identity: IdentityHeaders::default(),
    }
}

pub fn admin_router(store: &Arc<MemoryStore>, media_root: &Path) -> Router {
    build_admin_router(admin_state(store, media_root))
}
