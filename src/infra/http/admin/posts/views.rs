//! Builders turning resource output into admin view models.

use uuid::Uuid;

use crate::{
    application::{
        admin::{stats::StatsOverview, tags::PostTagsPanel},
        pagination::OffsetPage,
        repos::PostSort,
        resource::{
            PostResource,
            form::{FormState, ValidationErrors},
            pages::{NamedRoute, RelationManager, ResourcePage},
            table::CellValue,
        },
        viewer::Viewer,
    },
    domain::entities::{CategoryRecord, PostRecord},
    presentation::admin::views as admin_views,
};

use super::super::shared::{category_options, cover_view, format_timestamp};
use super::forms::ResolvedIndexQuery;

pub(crate) const SLUG_ACTION: &str = "/posts/form/slug";

pub(crate) fn status_action(id: Uuid) -> String {
    format!("{}/{id}/status", PostResource::BASE_PATH)
}

pub(crate) fn bulk_action_path(name: &str) -> String {
    format!("{}/bulk/{name}", PostResource::BASE_PATH)
}

fn tag_action(post_id: Uuid, action: &str) -> String {
    format!("{}/{post_id}/tags/{action}", PostResource::BASE_PATH)
}

fn detach_action(post_id: Uuid, tag_id: Uuid) -> String {
    format!("{}/{post_id}/tags/{tag_id}/detach", PostResource::BASE_PATH)
}

fn page_href(page: ResourcePage, record: Option<Uuid>) -> String {
    PostResource::page_url(page, record).unwrap_or_else(|_| PostResource::BASE_PATH.to_string())
}

pub(crate) struct PostListInput<'a> {
    pub(crate) resource: &'a PostResource,
    pub(crate) viewer: &'a Viewer,
    pub(crate) query: &'a ResolvedIndexQuery,
    pub(crate) page: OffsetPage<PostRecord>,
    pub(crate) stats: StatsOverview,
    pub(crate) categories: &'a [CategoryRecord],
}

pub(crate) fn build_post_list_view(input: PostListInput<'_>) -> admin_views::AdminPostListView {
    let PostListInput {
        resource,
        viewer,
        query,
        page,
        stats,
        categories,
    } = input;

    let base = PostResource::BASE_PATH;
    let table = resource.table();
    let list = &query.list;
    let columns = table.visible_columns(viewer, &query.toggled);

    let headers = columns
        .iter()
        .map(|column| {
            let (next_sort, direction) = match (column.is_sortable(), list.sort) {
                (false, _) => (None, None),
                (true, PostSort::TitleAsc) => (Some(PostSort::TitleDesc), Some("asc")),
                (true, PostSort::TitleDesc) => (Some(PostSort::TitleAsc), Some("desc")),
                (true, PostSort::Newest) => (Some(PostSort::TitleAsc), None),
            };
            admin_views::AdminColumnHeaderView {
                label: column.label(),
                sort_href: next_sort.map(|sort| query.href(base, 1, sort)),
                sort_direction: direction,
            }
        })
        .collect();

    let rows = page
        .items
        .iter()
        .zip(1u64..)
        .map(|(record, iteration)| admin_views::AdminPostRowView {
            id: record.id.to_string(),
            cells: columns
                .iter()
                .map(|column| match column.render(record, list.page, iteration) {
                    CellValue::Text(text) => admin_views::AdminCellView::Text(text),
                    CellValue::Image(src) => admin_views::AdminCellView::Image(src),
                    CellValue::Toggle(on) => {
                        admin_views::AdminCellView::Toggle(admin_views::AdminToggleCellView {
                            on,
                            action: status_action(record.id),
                        })
                    }
                })
                .collect(),
            actions: table
                .row_actions()
                .iter()
                .map(|action| admin_views::AdminRowActionView {
                    label: action.label(),
                    href: action.url_for(record),
                    color: action.action_color(),
                    icon: action.action_icon(),
                    new_tab: action.opens_in_new_tab(),
                })
                .collect(),
        })
        .collect();

    let last_page = page.last_page();
    let pagination = admin_views::AdminPaginationView {
        page: page.page,
        last_page,
        total: page.total,
        previous_href: page
            .has_previous()
            .then(|| query.href(base, page.page - 1, list.sort)),
        next_href: page
            .has_next()
            .then(|| query.href(base, page.page + 1, list.sort)),
    };

    admin_views::AdminPostListView {
        heading: PostResource::PLURAL_MODEL_LABEL,
        create_href: page_href(ResourcePage::Create, None),
        stats: stats
            .cards
            .into_iter()
            .map(|card| admin_views::AdminStatCardView {
                label: card.label,
                value: card.value,
            })
            .collect(),
        search: list.search.clone().unwrap_or_default(),
        searchable: table.is_searchable(),
        sort: list.sort.as_param().unwrap_or("").to_string(),
        per_page: list.page.per_page(),
        filters: admin_views::AdminFilterFormView {
            publish: list.filters.publish,
            draft: list.filters.draft,
            category: list.filters.category.clone().unwrap_or_default(),
            categories: category_options(
                categories,
                list.filters.category.as_deref().unwrap_or(""),
                |category| category.name.clone(),
            ),
            created_from: list
                .filters
                .created
                .from
                .map(|date| date.to_string())
                .unwrap_or_default(),
            created_until: list
                .filters
                .created
                .until
                .map(|date| date.to_string())
                .unwrap_or_default(),
        },
        indicators: table
            .indicators(&list.filters)
            .into_iter()
            .map(|indicator| indicator.label)
            .collect(),
        toggles: table
            .toggleable_columns()
            .map(|column| admin_views::AdminColumnToggleView {
                name: column.name(),
                label: column.label(),
                active: query.toggled.contains(column.name()),
            })
            .collect(),
        columns: headers,
        rows,
        bulk_actions: table
            .all_bulk_actions()
            .iter()
            .map(|action| admin_views::AdminBulkActionView {
                label: action.label,
                action: bulk_action_path(action.name),
                confirm: action.requires_confirmation,
            })
            .collect(),
        pagination,
    }
}

pub(crate) fn build_tags_panel_view(
    post_id: Uuid,
    panel: PostTagsPanel,
    message: Option<String>,
) -> admin_views::AdminTagsPanelView {
    admin_views::AdminTagsPanelView {
        label: RelationManager::Tags.label(),
        attached: panel
            .attached
            .into_iter()
            .map(|tag| admin_views::AdminTagChipView {
                detach_action: detach_action(post_id, tag.id),
                name: tag.name,
                slug: tag.slug,
            })
            .collect(),
        available: panel
            .available
            .into_iter()
            .map(|tag| admin_views::AdminOptionView {
                value: tag.id.to_string(),
                label: tag.name,
                selected: false,
            })
            .collect(),
        attach_action: tag_action(post_id, "attach"),
        create_action: tag_action(post_id, "create"),
        message,
    }
}

pub(crate) struct EditorInput<'a> {
    pub(crate) record: Option<&'a PostRecord>,
    pub(crate) form: &'a FormState,
    pub(crate) errors: Option<&'a ValidationErrors>,
    pub(crate) categories: &'a [CategoryRecord],
    pub(crate) tags: Option<admin_views::AdminTagsPanelView>,
}

pub(crate) fn build_editor_view(input: EditorInput<'_>) -> admin_views::AdminPostEditorView {
    let EditorInput {
        record,
        form,
        errors,
        categories,
        tags,
    } = input;

    let (heading, form_action, show_href) = match record {
        Some(record) => (
            format!("Edit {}", PostResource::record_title(record)),
            page_href(ResourcePage::Edit, Some(record.id)),
            Some(page_href(ResourcePage::Show, Some(record.id))),
        ),
        None => (
            format!("Create {}", PostResource::MODEL_LABEL),
            page_href(ResourcePage::Create, None),
            None,
        ),
    };

    admin_views::AdminPostEditorView {
        heading,
        form_action,
        slug_action: SLUG_ACTION.to_string(),
        categories: category_options(categories, form.text("category_id"), |category| {
            category.id.to_string()
        }),
        title: form.text("title").to_string(),
        slug: form.text("slug").to_string(),
        content: form.text("content").to_string(),
        status: form.flag("status"),
        cover: record.and_then(|record| record.cover.as_ref()).map(cover_view),
        errors: errors
            .map(|errors| {
                errors
                    .iter()
                    .map(|(field, message)| admin_views::AdminFieldErrorView {
                        field,
                        message: message.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        tags,
        show_href,
        back_href: page_href(ResourcePage::Index, None),
    }
}

pub(crate) fn build_detail_view(
    record: &PostRecord,
    tags: Option<admin_views::AdminTagsPanelView>,
) -> admin_views::AdminPostDetailView {
    admin_views::AdminPostDetailView {
        title: PostResource::record_title(record).to_string(),
        slug: record.slug.clone(),
        category: record.category_name.clone(),
        status_label: record.status.label(),
        content_html: record.content.clone(),
        cover: record.cover.as_ref().map(cover_view),
        created_at: format_timestamp(record.created_at),
        updated_at: format_timestamp(record.updated_at),
        edit_href: page_href(ResourcePage::Edit, Some(record.id)),
        download_href: record
            .cover
            .as_ref()
            .map(|_| NamedRoute::DownloadImage.url(record.id)),
        back_href: page_href(ResourcePage::Index, None),
        tags,
    }
}
