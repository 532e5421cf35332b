//! View models and askama templates for the post admin.

use askama::Template;

#[derive(Clone)]
pub struct AdminBadgeView {
    pub value: String,
    pub color: &'static str,
}

#[derive(Clone)]
pub struct AdminNavigationItemView {
    pub label: &'static str,
    pub href: String,
    pub icon: &'static str,
    pub is_active: bool,
    pub badge: Option<AdminBadgeView>,
}

#[derive(Clone)]
pub struct AdminChrome {
    pub title: String,
    pub viewer: String,
    pub navigation: Vec<AdminNavigationItemView>,
}

#[derive(Clone)]
pub struct AdminLayout<T> {
    pub chrome: AdminChrome,
    pub asset_version: String,
    pub content: T,
}

impl<T> AdminLayout<T> {
    pub fn new(chrome: AdminChrome, content: T) -> Self {
        Self {
            chrome,
            asset_version: asset_version(),
            content,
        }
    }
}

fn asset_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[derive(Clone)]
pub struct AdminStatCardView {
    pub label: &'static str,
    pub value: u64,
}

#[derive(Clone)]
pub struct AdminOptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone)]
pub struct AdminColumnHeaderView {
    pub label: &'static str,
    /// Present for sortable columns; toggles between ascending and descending.
    pub sort_href: Option<String>,
    pub sort_direction: Option<&'static str>,
}

#[derive(Clone)]
pub struct AdminColumnToggleView {
    pub name: &'static str,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Clone)]
pub struct AdminToggleCellView {
    pub on: bool,
    pub action: String,
}

#[derive(Clone)]
pub enum AdminCellView {
    Text(String),
    Image(Option<String>),
    Toggle(AdminToggleCellView),
}

#[derive(Clone)]
pub struct AdminRowActionView {
    pub label: &'static str,
    pub href: String,
    pub color: Option<&'static str>,
    pub icon: Option<&'static str>,
    pub new_tab: bool,
}

#[derive(Clone)]
pub struct AdminPostRowView {
    pub id: String,
    pub cells: Vec<AdminCellView>,
    pub actions: Vec<AdminRowActionView>,
}

#[derive(Clone)]
pub struct AdminBulkActionView {
    pub label: &'static str,
    pub action: String,
    pub confirm: bool,
}

#[derive(Clone)]
pub struct AdminFilterFormView {
    pub publish: bool,
    pub draft: bool,
    pub category: String,
    pub categories: Vec<AdminOptionView>,
    pub created_from: String,
    pub created_until: String,
}

#[derive(Clone)]
pub struct AdminPaginationView {
    pub page: u32,
    pub last_page: u32,
    pub total: u64,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
}

#[derive(Clone)]
pub struct AdminPostListView {
    pub heading: &'static str,
    pub create_href: String,
    pub stats: Vec<AdminStatCardView>,
    pub search: String,
    pub searchable: bool,
    pub sort: String,
    pub per_page: u32,
    pub filters: AdminFilterFormView,
    pub indicators: Vec<String>,
    pub toggles: Vec<AdminColumnToggleView>,
    pub columns: Vec<AdminColumnHeaderView>,
    pub rows: Vec<AdminPostRowView>,
    pub bulk_actions: Vec<AdminBulkActionView>,
    pub pagination: AdminPaginationView,
}

impl AdminPostListView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Template)]
#[template(path = "admin/posts.html")]
pub struct AdminPostsTemplate {
    pub view: AdminLayout<AdminPostListView>,
}

#[derive(Clone)]
pub struct AdminCoverView {
    pub filename: String,
    pub href: String,
    pub is_image: bool,
}

#[derive(Clone)]
pub struct AdminTagChipView {
    pub name: String,
    pub slug: String,
    pub detach_action: String,
}

#[derive(Clone)]
pub struct AdminTagsPanelView {
    pub label: &'static str,
    pub attached: Vec<AdminTagChipView>,
    pub available: Vec<AdminOptionView>,
    pub attach_action: String,
    pub create_action: String,
    pub message: Option<String>,
}

/// Standalone tags panel, patched in place after attach/detach.
#[derive(Template)]
#[template(path = "admin/post_tags_panel.html")]
pub struct AdminPostTagsPanelTemplate {
    pub panel: AdminTagsPanelView,
}

#[derive(Clone)]
pub struct AdminFieldErrorView {
    pub field: &'static str,
    pub message: String,
}

#[derive(Clone)]
pub struct AdminPostEditorView {
    pub heading: String,
    pub form_action: String,
    pub slug_action: String,
    pub categories: Vec<AdminOptionView>,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub status: bool,
    pub cover: Option<AdminCoverView>,
    pub errors: Vec<AdminFieldErrorView>,
    pub tags: Option<AdminTagsPanelView>,
    pub show_href: Option<String>,
    pub back_href: String,
}

impl AdminPostEditorView {
    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    /// Datastar signals seeded from the current title and slug.
    pub fn signals(&self) -> String {
        serde_json::json!({ "title": self.title, "slug": self.slug }).to_string()
    }
}

#[derive(Template)]
#[template(path = "admin/post_editor.html")]
pub struct AdminPostEditorTemplate {
    pub view: AdminLayout<AdminPostEditorView>,
}

#[derive(Clone)]
pub struct AdminPostDetailView {
    pub title: String,
    pub slug: String,
    pub category: Option<String>,
    pub status_label: &'static str,
    /// Already sanitized when stored.
    pub content_html: String,
    pub cover: Option<AdminCoverView>,
    pub created_at: String,
    pub updated_at: String,
    pub edit_href: String,
    pub download_href: Option<String>,
    pub back_href: String,
    pub tags: Option<AdminTagsPanelView>,
}

#[derive(Template)]
#[template(path = "admin/post_show.html")]
pub struct AdminPostShowTemplate {
    pub view: AdminLayout<AdminPostDetailView>,
}
