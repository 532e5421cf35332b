//! Declarative description of the post admin resource.
//!
//! [`PostResource`] bundles everything the admin surface needs to know about posts: the
//! edit form, the listing table with its filters and actions, the navigation badge, the
//! relation managers and widgets, and where each page is mounted. It holds no state of
//! its own and is evaluated per request by the admin services.

pub mod badge;
pub mod filters;
pub mod form;
pub mod pages;
pub mod table;

use uuid::Uuid;

use crate::domain::entities::PostRecord;
use crate::domain::slug::slugify;
use crate::domain::types::{ADMIN_ROLE, PostStatus};

use self::badge::{DEFAULT_BADGE_THRESHOLD, NavigationBadge};
use self::filters::FilterSpec;
use self::form::{FieldSpec, FieldValue, FormSchema, FormState};
use self::pages::{NamedRoute, RelationManager, ResourcePage, RouteError, Widget};
use self::table::{BulkAction, CellValue, ColumnSpec, RowAction, TableSchema, Visibility};

/// Public prefix under which stored media is served.
pub const MEDIA_PREFIX: &str = "/media";

pub fn media_url(stored_path: &str) -> String {
    format!("{MEDIA_PREFIX}/{}", stored_path.trim_start_matches('/'))
}

#[derive(Debug, Clone)]
pub struct PostResource {
    form: FormSchema,
    table: TableSchema,
    badge_threshold: u64,
}

impl PostResource {
    pub const MODEL_LABEL: &'static str = "Post";
    pub const PLURAL_MODEL_LABEL: &'static str = "Posts";
    pub const RECORD_TITLE_ATTRIBUTE: &'static str = "title";
    pub const NAVIGATION_ICON: &'static str = "heroicon-o-collection";
    pub const BASE_PATH: &'static str = "/posts";
    pub const TITLE_LIMIT: usize = 50;

    pub fn new(badge_threshold: u64) -> Self {
        Self {
            form: Self::form_schema(),
            table: Self::table_schema(),
            badge_threshold,
        }
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::select("category_id", "category", "name").label("Category"),
            FieldSpec::text_input("title")
                .label("Title")
                .required()
                .after_state_updated(|set, title| {
                    set.set("slug", FieldValue::text(slugify(title.as_text())));
                }),
            FieldSpec::text_input("slug").label("Slug").required(),
            FieldSpec::file_upload("cover", "covers").label("Cover"),
            FieldSpec::rich_editor("content").label("Content"),
            FieldSpec::toggle("status").label("Status"),
        ])
    }

    fn table_schema() -> TableSchema {
        TableSchema::new()
            .columns(vec![
                ColumnSpec::row_index("No"),
                ColumnSpec::text("title", "Title", |post| CellValue::Text(post.title.clone()))
                    .limit(Self::TITLE_LIMIT)
                    .sortable()
                    .searchable(),
                ColumnSpec::text("category.name", "Category", |post| {
                    CellValue::Text(post.category_name.clone().unwrap_or_default())
                })
                .toggleable(true),
                ColumnSpec::image("cover", "Cover", |post| {
                    CellValue::Image(
                        post.cover
                            .as_ref()
                            .filter(|cover| cover.is_image())
                            .map(|cover| media_url(&cover.stored_path)),
                    )
                }),
                ColumnSpec::toggle("status", "Status", |post| {
                    CellValue::Toggle(post.status.is_published())
                })
                .visible_to(Visibility::RequiresRole(ADMIN_ROLE)),
            ])
            .filters(vec![
                FilterSpec::status("publish", "Publish", PostStatus::Published),
                FilterSpec::status("draft", "Draft", PostStatus::Draft),
                FilterSpec::select("category", "Category", "category", "name"),
                FilterSpec::date_range("created_at", "Created at"),
            ])
            .actions(vec![
                RowAction::new("edit", "Edit", |post| {
                    Self::page_url(ResourcePage::Edit, Some(post.id)).unwrap_or_default()
                }),
                RowAction::new("download", "Download", |post| {
                    NamedRoute::DownloadImage.url(post.id)
                })
                .color("info")
                .icon("heroicon-o-download")
                .open_url_in_new_tab(),
            ])
            .bulk_actions(vec![BulkAction::delete()])
    }

    pub fn form(&self) -> &FormSchema {
        &self.form
    }

    pub fn table(&self) -> &TableSchema {
        &self.table
    }

    pub fn navigation_badge(&self, published: u64) -> NavigationBadge {
        NavigationBadge::new(published, self.badge_threshold)
    }

    pub fn relations(&self) -> &'static [RelationManager] {
        &[RelationManager::Tags]
    }

    pub fn widgets(&self) -> &'static [Widget] {
        &[Widget::StatsOverview]
    }

    pub fn pages(&self) -> &'static [ResourcePage] {
        &ResourcePage::ALL
    }

    pub fn page_url(page: ResourcePage, record: Option<Uuid>) -> Result<String, RouteError> {
        page.url(Self::BASE_PATH, record)
    }

    pub fn record_title(record: &PostRecord) -> &str {
        &record.title
    }

    /// Hydrate form state from a stored record without triggering observers.
    pub fn fill_form(record: &PostRecord) -> FormState {
        let mut state = FormState::default();
        state.fill(
            "category_id",
            FieldValue::text(
                record
                    .category_id
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
            ),
        );
        state.fill("title", FieldValue::text(record.title.clone()));
        state.fill("slug", FieldValue::text(record.slug.clone()));
        state.fill("content", FieldValue::text(record.content.clone()));
        state.fill("status", FieldValue::Flag(record.status.is_published()));
        state
    }
}

impl Default for PostResource {
    fn default() -> Self {
        Self::new(DEFAULT_BADGE_THRESHOLD)
    }
}
