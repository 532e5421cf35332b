use axum::{
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

use crate::{
    application::{
        error::HttpError,
        resource::{PostResource, media_url},
        viewer::Viewer,
    },
    domain::entities::{CategoryRecord, CoverRecord},
    presentation::admin::views as admin_views,
};

use super::{super::DATASTAR_REQUEST_HEADER, AdminState, posts::errors::admin_post_error};

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute] UTC");

pub(super) fn blank_to_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub(super) fn is_datastar(headers: &HeaderMap) -> bool {
    headers.contains_key(DATASTAR_REQUEST_HEADER)
}

pub(super) fn see_other(location: &str) -> Response {
    Redirect::to(location).into_response()
}

pub(super) fn format_timestamp(value: OffsetDateTime) -> String {
    value
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| value.to_string())
}

/// Sidebar chrome with the posts entry and its published-count badge.
pub(super) async fn load_chrome(
    state: &AdminState,
    viewer: &Viewer,
    title: impl Into<String>,
) -> Result<admin_views::AdminChrome, HttpError> {
    let badge = state
        .posts
        .navigation_badge()
        .await
        .map_err(|err| admin_post_error("infra::http::admin::load_chrome", err))?;

    Ok(admin_views::AdminChrome {
        title: title.into(),
        viewer: viewer.actor().to_string(),
        navigation: vec![admin_views::AdminNavigationItemView {
            label: PostResource::PLURAL_MODEL_LABEL,
            href: PostResource::BASE_PATH.to_string(),
            icon: PostResource::NAVIGATION_ICON,
            is_active: true,
            badge: Some(admin_views::AdminBadgeView {
                value: badge.value.to_string(),
                color: badge.color.as_str(),
            }),
        }],
    })
}

pub(super) fn category_options(
    categories: &[CategoryRecord],
    selected: &str,
    value_of: fn(&CategoryRecord) -> String,
) -> Vec<admin_views::AdminOptionView> {
    categories
        .iter()
        .map(|category| {
            let value = value_of(category);
            admin_views::AdminOptionView {
                selected: value == selected,
                value,
                label: category.name.clone(),
            }
        })
        .collect()
}

pub(super) fn cover_view(cover: &CoverRecord) -> admin_views::AdminCoverView {
    admin_views::AdminCoverView {
        filename: cover.filename.clone(),
        href: media_url(&cover.stored_path),
        is_image: cover.is_image(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn timestamps_render_in_utc() {
        assert_eq!(
            format_timestamp(datetime!(2024-03-05 09:07 UTC)),
            "2024-03-05 09:07 UTC"
        );
    }

    #[test]
    fn blank_values_collapse_to_none() {
        assert_eq!(blank_to_none(Some("  ")), None);
        assert_eq!(blank_to_none(Some(" news ")), Some("news".to_string()));
        assert_eq!(blank_to_none(None), None);
    }
}
