//! Tags relation manager endpoints nested under a post.

use axum::{
    extract::{Extension, Form, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    application::{
        admin::tags::AdminTagError,
        error::HttpError,
        resource::{PostResource, pages::ResourcePage},
        stream::StreamBuilder,
        viewer::Viewer,
    },
    infra::http::repo_error_to_http,
    presentation::{admin::views as admin_views, views::render_fragment},
};

use super::{
    AdminState,
    posts::{AdminTagAttachForm, AdminTagCreateForm, build_tags_panel_view},
    shared::{is_datastar, see_other},
};

const PANEL_SELECTOR: &str = "#post-tags";

pub(super) async fn load_tags_panel(
    state: &AdminState,
    post_id: Uuid,
    message: Option<String>,
) -> Result<admin_views::AdminTagsPanelView, HttpError> {
    let panel = state
        .tags
        .panel(post_id)
        .await
        .map_err(|err| admin_tag_error("infra::http::admin::tags::load_tags_panel", err))?;
    Ok(build_tags_panel_view(post_id, panel, message))
}

pub(super) async fn admin_post_tag_attach(
    State(state): State<AdminState>,
    Extension(viewer): Extension<Viewer>,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
    Form(form): Form<AdminTagAttachForm>,
) -> Response {
    let result = state
        .tags
        .attach(viewer.actor(), post_id, form.tag_id)
        .await
        .map(|tag| format!("Attached {}.", tag.name));
    respond(&state, &headers, post_id, result, "infra::http::admin::tags::attach").await
}

pub(super) async fn admin_post_tag_create(
    State(state): State<AdminState>,
    Extension(viewer): Extension<Viewer>,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
    Form(form): Form<AdminTagCreateForm>,
) -> Response {
    let result = state
        .tags
        .create_and_attach(viewer.actor(), post_id, &form.name)
        .await
        .map(|tag| format!("Created and attached {}.", tag.name));
    respond(&state, &headers, post_id, result, "infra::http::admin::tags::create").await
}

pub(super) async fn admin_post_tag_detach(
    State(state): State<AdminState>,
    Extension(viewer): Extension<Viewer>,
    Path((post_id, tag_id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
) -> Response {
    let result = state
        .tags
        .detach(viewer.actor(), post_id, tag_id)
        .await
        .map(|()| "Tag detached.".to_string());
    respond(&state, &headers, post_id, result, "infra::http::admin::tags::detach").await
}

async fn respond(
    state: &AdminState,
    headers: &HeaderMap,
    post_id: Uuid,
    result: Result<String, AdminTagError>,
    source: &'static str,
) -> Response {
    let message = match result {
        Ok(message) => message,
        Err(err) => return admin_tag_error(source, err).into_response(),
    };

    if !is_datastar(headers) {
        let location = PostResource::page_url(ResourcePage::Edit, Some(post_id))
            .unwrap_or_else(|_| PostResource::BASE_PATH.to_string());
        return see_other(&location);
    }

    let panel = match load_tags_panel(state, post_id, Some(message)).await {
        Ok(panel) => panel,
        Err(err) => return err.into_response(),
    };

    match render_fragment(source, admin_views::AdminPostTagsPanelTemplate { panel }) {
        Ok(html) => {
            let mut stream = StreamBuilder::new();
            stream.replace(PANEL_SELECTOR, html);
            stream.into_response()
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

fn admin_tag_error(source: &'static str, err: AdminTagError) -> HttpError {
    match err {
        AdminTagError::ConstraintViolation(_) => HttpError::from_error(
            source,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Tag could not be saved",
            &err,
        ),
        AdminTagError::PostNotFound(_) => {
            HttpError::from_error(source, StatusCode::NOT_FOUND, "Post not found", &err)
        }
        AdminTagError::TagNotFound(_) => {
            HttpError::from_error(source, StatusCode::NOT_FOUND, "Tag not found", &err)
        }
        AdminTagError::Repo(repo) => repo_error_to_http(source, repo),
    }
}
