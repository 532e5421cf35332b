use axum::{
    extract::{Extension, Form, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Multipart;
use datastar::axum::ReadSignals;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::{
    application::{
        admin::{
            posts::{AdminPostError, SavePostCommand},
            stats::StatsOverview,
        },
        error::HttpError,
        repos::CoverUpdate,
        resource::{
            PostResource,
            form::{FieldValue, FormState, ValidationErrors},
            pages::{RelationManager, ResourcePage, Widget},
            table::BulkActionKind,
        },
        stream::StreamBuilder,
        viewer::Viewer,
    },
    domain::entities::{CoverRecord, PostRecord},
    infra::uploads::MediaStorageError,
    presentation::{
        admin::views as admin_views,
        views::{render_template_response, render_with_report},
    },
};

use super::super::{
    AdminState,
    shared::{load_chrome, see_other},
    tags::load_tags_panel,
};
use super::{
    errors::admin_post_error,
    forms::{
        AdminPostIndexQuery, AdminSlugSignals, SubmissionError, collect_ids, read_post_submission,
    },
    views::{EditorInput, PostListInput, build_detail_view, build_editor_view, build_post_list_view},
};

const SOURCE: &str = "infra::http::admin::posts";

fn index_path() -> String {
    PostResource::page_url(ResourcePage::Index, None)
        .unwrap_or_else(|_| PostResource::BASE_PATH.to_string())
}

fn edit_path(id: Uuid) -> String {
    PostResource::page_url(ResourcePage::Edit, Some(id)).unwrap_or_else(|_| index_path())
}

pub(crate) async fn admin_posts(
    State(state): State<AdminState>,
    Extension(viewer): Extension<Viewer>,
    Query(query): Query<AdminPostIndexQuery>,
) -> Response {
    let resource = state.posts.resource();
    let resolved = match query.resolve(state.per_page, resource.table()) {
        Ok(resolved) => resolved,
        Err(err) => {
            return HttpError::new(
                "infra::http::admin::posts::admin_posts",
                StatusCode::BAD_REQUEST,
                "Invalid table query",
                err.to_string(),
            )
            .into_response();
        }
    };

    let chrome = match load_chrome(&state, &viewer, PostResource::PLURAL_MODEL_LABEL).await {
        Ok(chrome) => chrome,
        Err(err) => return err.into_response(),
    };

    let loaded = tokio::try_join!(
        state.posts.list(&resolved.list),
        load_widgets(&state),
        state.posts.list_categories(),
    );
    let (page, stats, categories) = match loaded {
        Ok(loaded) => loaded,
        Err(err) => {
            return admin_post_error("infra::http::admin::posts::admin_posts", err)
                .into_response();
        }
    };

    let content = build_post_list_view(PostListInput {
        resource,
        viewer: &viewer,
        query: &resolved,
        page,
        stats,
        categories: &categories,
    });

    render_template_response(
        admin_views::AdminPostsTemplate {
            view: admin_views::AdminLayout::new(chrome, content),
        },
        StatusCode::OK,
    )
}

pub(crate) async fn admin_post_new(
    State(state): State<AdminState>,
    Extension(viewer): Extension<Viewer>,
) -> Response {
    render_editor(&state, &viewer, None, &FormState::default(), None).await
}

pub(crate) async fn admin_post_create(
    State(state): State<AdminState>,
    Extension(viewer): Extension<Viewer>,
    mut multipart: Multipart,
) -> Response {
    let submission = match read_post_submission(
        &mut multipart,
        state.posts.resource().form(),
        &state.media,
    )
    .await
    {
        Ok(submission) => submission,
        Err(err) => return submission_error("infra::http::admin::posts::create", err),
    };

    let uploaded = submission.cover.clone();
    let command = SavePostCommand {
        form: submission.form.clone(),
        cover: uploaded
            .clone()
            .map(CoverUpdate::Replace)
            .unwrap_or(CoverUpdate::Keep),
    };

    match state.posts.create_post(viewer.actor(), command).await {
        Ok(post) => see_other(&edit_path(post.id)),
        Err(err) => {
            discard_upload(&state, uploaded.as_ref()).await;
            match err {
                AdminPostError::Validation(errors) => {
                    render_invalid(&state, &viewer, None, &submission.form, errors).await
                }
                other => {
                    admin_post_error("infra::http::admin::posts::create", other).into_response()
                }
            }
        }
    }
}

pub(crate) async fn admin_post_edit(
    State(state): State<AdminState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
) -> Response {
    let post = match state.posts.require_post(id).await {
        Ok(post) => post,
        Err(err) => return admin_post_error("infra::http::admin::posts::edit", err).into_response(),
    };

    let form = PostResource::fill_form(&post);
    render_editor(&state, &viewer, Some(&post), &form, None).await
}

pub(crate) async fn admin_post_update(
    State(state): State<AdminState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Response {
    let current = match state.posts.require_post(id).await {
        Ok(post) => post,
        Err(err) => {
            return admin_post_error("infra::http::admin::posts::update", err).into_response();
        }
    };

    let submission = match read_post_submission(
        &mut multipart,
        state.posts.resource().form(),
        &state.media,
    )
    .await
    {
        Ok(submission) => submission,
        Err(err) => return submission_error("infra::http::admin::posts::update", err),
    };

    let uploaded = submission.cover.clone();
    let cover = match (uploaded.clone(), submission.remove_cover) {
        (Some(cover), _) => CoverUpdate::Replace(cover),
        (None, true) => CoverUpdate::Remove,
        (None, false) => CoverUpdate::Keep,
    };
    let replaces_cover = cover != CoverUpdate::Keep;

    let command = SavePostCommand {
        form: submission.form.clone(),
        cover,
    };

    match state.posts.update_post(viewer.actor(), id, command).await {
        Ok(post) => {
            if replaces_cover {
                discard_upload(&state, current.cover.as_ref()).await;
            }
            see_other(&edit_path(post.id))
        }
        Err(err) => {
            discard_upload(&state, uploaded.as_ref()).await;
            match err {
                AdminPostError::Validation(errors) => {
                    render_invalid(&state, &viewer, Some(&current), &submission.form, errors).await
                }
                other => {
                    admin_post_error("infra::http::admin::posts::update", other).into_response()
                }
            }
        }
    }
}

pub(crate) async fn admin_post_show(
    State(state): State<AdminState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
) -> Response {
    let post = match state.posts.require_post(id).await {
        Ok(post) => post,
        Err(err) => return admin_post_error("infra::http::admin::posts::show", err).into_response(),
    };

    let chrome = match load_chrome(&state, &viewer, PostResource::record_title(&post)).await {
        Ok(chrome) => chrome,
        Err(err) => return err.into_response(),
    };

    let tags = match load_relations(&state, post.id).await {
        Ok(tags) => tags,
        Err(err) => return err.into_response(),
    };

    render_template_response(
        admin_views::AdminPostShowTemplate {
            view: admin_views::AdminLayout::new(chrome, build_detail_view(&post, tags)),
        },
        StatusCode::OK,
    )
}

/// Title edits push the derived slug back as a datastar signal.
pub(crate) async fn admin_post_slug(
    State(state): State<AdminState>,
    ReadSignals(signals): ReadSignals<AdminSlugSignals>,
) -> Response {
    let schema = state.posts.resource().form();
    let mut form = FormState::default();
    if let Err(err) = schema.update(&mut form, "title", FieldValue::text(signals.title)) {
        return HttpError::from_error(
            "infra::http::admin::posts::slug",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Form schema is missing the title field",
            &err,
        )
        .into_response();
    }

    let mut stream = StreamBuilder::new();
    stream.signals(&json!({ "slug": form.text("slug") }));
    stream.into_response()
}

pub(crate) async fn admin_post_toggle_status(
    State(state): State<AdminState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.posts.toggle_status(&viewer, id).await {
        Ok(_) => see_other(&index_path()),
        Err(err) => admin_post_error("infra::http::admin::posts::status", err).into_response(),
    }
}

pub(crate) async fn admin_posts_bulk(
    State(state): State<AdminState>,
    Extension(viewer): Extension<Viewer>,
    Path(action): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    const SOURCE_BULK: &str = "infra::http::admin::posts::bulk";

    let Some(bulk) = state.posts.resource().table().bulk_action(&action).copied() else {
        return HttpError::new(
            SOURCE_BULK,
            StatusCode::NOT_FOUND,
            "Unknown bulk action",
            format!("no bulk action named `{action}`"),
        )
        .into_response();
    };

    let ids = match collect_ids(&pairs) {
        Ok(ids) => ids,
        Err(err) => {
            return HttpError::from_error(
                SOURCE_BULK,
                StatusCode::BAD_REQUEST,
                "Invalid selection",
                &err,
            )
            .into_response();
        }
    };

    let result = match bulk.kind {
        BulkActionKind::Delete => state.posts.bulk_delete(viewer.actor(), &ids).await,
    };

    match result {
        Ok(_) => see_other(&index_path()),
        Err(err) => admin_post_error(SOURCE_BULK, err).into_response(),
    }
}

/// Data for every widget the resource declares, in declaration order.
async fn load_widgets(state: &AdminState) -> Result<StatsOverview, AdminPostError> {
    let mut overview = StatsOverview { cards: Vec::new() };
    for widget in state.posts.resource().widgets() {
        match widget {
            Widget::StatsOverview => overview.cards.extend(state.stats.overview().await?.cards),
        }
    }
    Ok(overview)
}

/// Relation panels for a stored record. Only the tags manager exists today.
async fn load_relations(
    state: &AdminState,
    post_id: Uuid,
) -> Result<Option<admin_views::AdminTagsPanelView>, HttpError> {
    let mut tags = None;
    for relation in state.posts.resource().relations() {
        match relation {
            RelationManager::Tags => tags = Some(load_tags_panel(state, post_id, None).await?),
        }
    }
    Ok(tags)
}

async fn render_editor(
    state: &AdminState,
    viewer: &Viewer,
    record: Option<&PostRecord>,
    form: &FormState,
    errors: Option<&ValidationErrors>,
) -> Response {
    let status = if errors.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };

    let title = match record {
        Some(record) => PostResource::record_title(record).to_string(),
        None => format!("Create {}", PostResource::MODEL_LABEL),
    };
    let chrome = match load_chrome(state, viewer, title).await {
        Ok(chrome) => chrome,
        Err(err) => return err.into_response(),
    };

    let categories = match state.posts.list_categories().await {
        Ok(categories) => categories,
        Err(err) => return admin_post_error(SOURCE, err).into_response(),
    };

    let tags = match record {
        Some(record) => match load_relations(state, record.id).await {
            Ok(panel) => panel,
            Err(err) => return err.into_response(),
        },
        None => None,
    };

    let content = build_editor_view(EditorInput {
        record,
        form,
        errors,
        categories: &categories,
        tags,
    });
    let template = admin_views::AdminPostEditorTemplate {
        view: admin_views::AdminLayout::new(chrome, content),
    };

    match errors {
        Some(errors) => render_with_report(template, status, SOURCE, errors.to_string()),
        None => render_template_response(template, status),
    }
}

async fn render_invalid(
    state: &AdminState,
    viewer: &Viewer,
    record: Option<&PostRecord>,
    form: &FormState,
    errors: ValidationErrors,
) -> Response {
    render_editor(state, viewer, record, form, Some(&errors)).await
}

fn submission_error(source: &'static str, err: SubmissionError) -> Response {
    let (status, public_message) = match &err {
        SubmissionError::Multipart { status, .. } if *status == StatusCode::PAYLOAD_TOO_LARGE => {
            (StatusCode::PAYLOAD_TOO_LARGE, "Upload is too large")
        }
        SubmissionError::Multipart { .. } => (StatusCode::BAD_REQUEST, "Form data was invalid"),
        SubmissionError::Storage(MediaStorageError::PayloadTooLarge { .. }) => {
            (StatusCode::PAYLOAD_TOO_LARGE, "Upload is too large")
        }
        SubmissionError::Storage(MediaStorageError::PayloadStream { .. }) => {
            (StatusCode::BAD_REQUEST, "Form data was invalid")
        }
        SubmissionError::Storage(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Could not store uploaded file",
        ),
    };
    HttpError::from_error(source, status, public_message, &err).into_response()
}

/// Best-effort removal of a stored cover that is no longer referenced.
async fn discard_upload(state: &AdminState, cover: Option<&CoverRecord>) {
    let Some(cover) = cover else {
        return;
    };
    if let Err(err) = state.media.delete(&cover.stored_path).await {
        warn!(
            target = SOURCE,
            path = %cover.stored_path,
            error = %err,
            "failed to remove unreferenced cover"
        );
    }
}
