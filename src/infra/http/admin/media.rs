use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{application::error::HttpError, infra::uploads::MediaStorageError};

use super::{AdminState, posts::errors::admin_post_error};

/// `download.image`: the post's cover as an attachment under its original filename.
pub(super) async fn download_image(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
) -> Response {
    const SOURCE: &str = "infra::http::admin::media::download_image";

    let post = match state.posts.require_post(id).await {
        Ok(post) => post,
        Err(err) => return admin_post_error(SOURCE, err).into_response(),
    };

    let Some(cover) = post.cover else {
        return HttpError::new(
            SOURCE,
            StatusCode::NOT_FOUND,
            "Post has no image",
            format!("post `{id}` has no cover"),
        )
        .into_response();
    };

    let data = match state.media.read(&cover.stored_path).await {
        Ok(data) => data,
        Err(err) => return media_error(SOURCE, err).into_response(),
    };

    let disposition = format!(
        "attachment; filename=\"{}\"",
        cover.filename.replace(['"', '\\', '\r', '\n'], "_")
    );

    let mut response = data.into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, header_value(&cover.content_type));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    } else {
        headers.insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment"),
        );
    }
    response
}

pub(super) async fn serve_media(
    State(state): State<AdminState>,
    Path(path): Path<String>,
) -> Response {
    const SOURCE: &str = "infra::http::admin::media::serve_media";

    let data = match state.media.read(&path).await {
        Ok(data) => data,
        Err(err) => return media_error(SOURCE, err).into_response(),
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    let mut response = data.into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, header_value(mime.as_ref()));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=86400"),
    );
    response
}

fn header_value(content_type: &str) -> HeaderValue {
    HeaderValue::from_str(content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
}

fn media_error(source: &'static str, err: MediaStorageError) -> HttpError {
    match &err {
        MediaStorageError::InvalidPath => {
            HttpError::from_error(source, StatusCode::NOT_FOUND, "File not found", &err)
        }
        MediaStorageError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
            HttpError::from_error(source, StatusCode::NOT_FOUND, "File not found", &err)
        }
        _ => HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to read file",
            &err,
        ),
    }
}
