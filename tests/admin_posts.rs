mod support;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use postdesk::domain::{entities::CoverRecord, types::PostStatus};
use postdesk::infra::uploads::MediaStorage;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use support::{ADMIN_ROLES, ADMIN_USER, MemoryStore, admin_router};

const BOUNDARY: &str = "postdesk-test-boundary";

struct Harness {
    store: std::sync::Arc<MemoryStore>,
    media: TempDir,
}

impl Harness {
    fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            media: TempDir::new().expect("tempdir"),
        }
    }

    fn router(&self) -> Router {
        admin_router(&self.store, self.media.path())
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router().oneshot(request).await.expect("router response")
    }
}

fn admin_get(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header(ADMIN_USER.0, ADMIN_USER.1)
        .header(ADMIN_ROLES.0, ADMIN_ROLES.1)
        .body(Body::empty())
        .expect("request")
}

fn editor_get(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header(ADMIN_USER.0, "grace")
        .header(ADMIN_ROLES.0, "editor")
        .body(Body::empty())
        .expect("request")
}

fn admin_post(uri: &str, content_type: &str, body: impl Into<Body>) -> Request<Body> {
    Request::post(uri)
        .header(ADMIN_USER.0, ADMIN_USER.1)
        .header(ADMIN_ROLES.0, ADMIN_ROLES.1)
        .header(header::CONTENT_TYPE, content_type)
        .body(body.into())
        .expect("request")
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    admin_post(uri, "application/x-www-form-urlencoded", body.to_string())
}

fn multipart_post(uri: &str, body: Vec<u8>) -> Request<Body> {
    admin_post(
        uri,
        &format!("multipart/form-data; boundary={BOUNDARY}"),
        body,
    )
}

/// Builds a multipart body from text fields plus an optional `(name, filename, type, bytes)` file.
fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, filename, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn body_text(response: Response) -> String {
    let bytes = body_bytes(response).await;
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

async fn body_bytes(response: Response) -> Bytes {
    response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
}

/// The number shown in the stats card labelled `label`.
fn stat_value(html: &str, label: &str) -> String {
    let card = html
        .find(&format!(">{label}</span>"))
        .unwrap_or_else(|| panic!("stat card {label}"));
    let rest = &html[card..];
    let start = rest.find("stat-card__value\">").expect("stat value") + "stat-card__value\">".len();
    let end = rest[start..].find('<').expect("stat value end");
    rest[start..start + end].trim().to_string()
}

/// The `(color, value)` of the navigation badge.
fn nav_badge(html: &str) -> (String, String) {
    let marker = "class=\"badge badge--";
    let start = html.find(marker).expect("navigation badge") + marker.len();
    let rest = &html[start..];
    let color = &rest[..rest.find('"').expect("badge color end")];
    let value_start = rest.find('>').expect("badge value") + 1;
    let value_end = rest[value_start..].find('<').expect("badge value end");
    (
        color.to_string(),
        rest[value_start..value_start + value_end].trim().to_string(),
    )
}

fn stored_files(dir: &std::path::Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .map(|entry| entry.expect("dir entry").path())
        .map(|path| if path.is_dir() { stored_files(&path) } else { 1 })
        .sum()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("location header")
}

#[tokio::test]
async fn root_redirects_to_post_index() {
    let harness = Harness::new();
    let response = harness.send(admin_get("/")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/posts");
}

#[tokio::test]
async fn index_lists_live_posts_with_stats() {
    let harness = Harness::new();
    let news = harness.store.add_category("News").await;
    harness
        .store
        .add_post("Rust in production", PostStatus::Published, Some(&news), 1)
        .await;
    harness
        .store
        .add_post("Draft notes", PostStatus::Draft, None, 2)
        .await;

    let response = harness.send(admin_get("/posts")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Rust in production"));
    assert!(html.contains("Draft notes"));
    assert!(html.contains("Total posts"));
    assert!(html.contains("Drafts"));
    assert!(html.contains("/download/image/"));
}

#[tokio::test]
async fn index_search_and_status_filters_narrow_rows() {
    let harness = Harness::new();
    harness
        .store
        .add_post("Rust in production", PostStatus::Published, None, 1)
        .await;
    harness
        .store
        .add_post("Gardening tips", PostStatus::Draft, None, 2)
        .await;

    let html = body_text(harness.send(admin_get("/posts?search=rust")).await).await;
    assert!(html.contains("Rust in production"));
    assert!(!html.contains("Gardening tips"));

    let html = body_text(harness.send(admin_get("/posts?draft=1")).await).await;
    assert!(html.contains("Gardening tips"));
    assert!(!html.contains("Rust in production"));

    let html = body_text(harness.send(admin_get("/posts?publish=1")).await).await;
    assert!(html.contains("Rust in production"));
    assert!(!html.contains("Gardening tips"));

    let html = body_text(harness.send(admin_get("/posts?publish=1&draft=1")).await).await;
    assert!(!html.contains("Gardening tips"));
    assert!(!html.contains("Rust in production"));
}

#[tokio::test]
async fn index_sorts_by_title_when_requested() {
    let harness = Harness::new();
    harness
        .store
        .add_post("Zulu", PostStatus::Draft, None, 5)
        .await;
    harness
        .store
        .add_post("Alpha", PostStatus::Draft, None, 1)
        .await;

    let html = body_text(harness.send(admin_get("/posts?sort=title")).await).await;
    let alpha = html.find("Alpha").expect("alpha row");
    let zulu = html.find("Zulu").expect("zulu row");
    assert!(alpha < zulu);

    let html = body_text(harness.send(admin_get("/posts?sort=-title")).await).await;
    let alpha = html.find("Alpha").expect("alpha row");
    let zulu = html.find("Zulu").expect("zulu row");
    assert!(zulu < alpha);
}

#[tokio::test]
async fn index_paginates_with_next_link() {
    let harness = Harness::new();
    for day in 0..3 {
        harness
            .store
            .add_post(&format!("Post {day}"), PostStatus::Draft, None, day)
            .await;
    }

    let html = body_text(harness.send(admin_get("/posts?per_page=2")).await).await;
    assert!(html.contains("Post 2"));
    assert!(html.contains("Post 1"));
    assert!(!html.contains("Post 0"));
    assert!(html.contains("page=2"));
}

#[tokio::test]
async fn index_rejects_malformed_dates_and_sorts() {
    let harness = Harness::new();

    let response = harness.send(admin_get("/posts?from=yesterday")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = harness.send(admin_get("/posts?sort=views")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_column_is_hidden_from_non_admins() {
    let harness = Harness::new();
    let post = harness
        .store
        .add_post("Visible", PostStatus::Draft, None, 0)
        .await;
    let status_path = format!("/posts/{}/status", post.id);

    let html = body_text(harness.send(admin_get("/posts")).await).await;
    assert!(html.contains(&status_path));

    let html = body_text(harness.send(editor_get("/posts")).await).await;
    assert!(!html.contains(&status_path));
}

#[tokio::test]
async fn status_toggle_requires_admin_role() {
    let harness = Harness::new();
    let post = harness
        .store
        .add_post("Toggle me", PostStatus::Draft, None, 0)
        .await;
    let uri = format!("/posts/{}/status", post.id);

    let forbidden = Request::post(&uri)
        .header(ADMIN_USER.0, "grace")
        .header(ADMIN_ROLES.0, "editor")
        .body(Body::empty())
        .expect("request");
    let response = harness.send(forbidden).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let unchanged = harness.store.post(post.id).await.expect("post");
    assert_eq!(unchanged.status, PostStatus::Draft);

    let response = harness.send(form_post(&uri, "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let toggled = harness.store.post(post.id).await.expect("post");
    assert_eq!(toggled.status, PostStatus::Published);

    let response = harness.send(form_post(&uri, "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let toggled = harness.store.post(post.id).await.expect("post");
    assert_eq!(toggled.status, PostStatus::Draft);
}

#[tokio::test]
async fn date_range_from_bound_alone_keeps_later_posts() {
    let harness = Harness::new();
    harness
        .store
        .add_post("Old announcement", PostStatus::Published, None, -3)
        .await;
    harness
        .store
        .add_post("New year post", PostStatus::Published, None, 0)
        .await;
    harness
        .store
        .add_post("Spring update", PostStatus::Draft, None, 90)
        .await;

    let response = harness.send(admin_get("/posts?from=2024-01-01")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(!html.contains("Old announcement"));
    assert!(html.contains("New year post"));
    assert!(html.contains("Spring update"));
    assert!(html.contains("Created from Jan 1, 2024"));
    assert!(!html.contains("Created until"));
}

#[tokio::test]
async fn category_filter_matches_exact_name() {
    let harness = Harness::new();
    let news = harness.store.add_category("News").await;
    let newsletter = harness.store.add_category("Newsletter").await;
    harness
        .store
        .add_post("Election night", PostStatus::Published, Some(&news), 0)
        .await;
    harness
        .store
        .add_post("Monthly digest", PostStatus::Published, Some(&newsletter), 1)
        .await;
    harness
        .store
        .add_post("Uncategorised musing", PostStatus::Draft, None, 2)
        .await;

    let html = body_text(harness.send(admin_get("/posts?category=News")).await).await;
    assert!(html.contains("Election night"));
    assert!(!html.contains("Monthly digest"));
    assert!(!html.contains("Uncategorised musing"));
}

#[tokio::test]
async fn navigation_badge_counts_published_posts() {
    let harness = Harness::new();
    for day in 0..2 {
        harness
            .store
            .add_post(&format!("Published {day}"), PostStatus::Published, None, day)
            .await;
    }
    harness
        .store
        .add_post("Unfinished", PostStatus::Draft, None, 3)
        .await;

    let html = body_text(harness.send(admin_get("/posts")).await).await;
    assert_eq!(nav_badge(&html), ("danger".to_string(), "2".to_string()));

    harness
        .store
        .add_post("Published 3", PostStatus::Published, None, 4)
        .await;
    let html = body_text(harness.send(admin_get("/posts")).await).await;
    assert_eq!(nav_badge(&html), ("primary".to_string(), "3".to_string()));
}

#[tokio::test]
async fn slug_signal_follows_title() {
    let harness = Harness::new();
    let response = harness
        .send(admin_post(
            "/posts/form/slug",
            "application/json",
            r#"{"title":"Hello Wide World"}"#,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("datastar-patch-signals"));
    assert!(body.contains(r#""slug":"hello-wide-world""#));
}

#[tokio::test]
async fn create_stores_post_and_cover() {
    let harness = Harness::new();
    let category = harness.store.add_category("News").await;
    let category_id = category.id.to_string();
    let body = multipart_body(
        &[
            ("category_id", category_id.as_str()),
            ("title", "Launch day"),
            ("slug", "launch-day"),
            ("content", "<p>We shipped.</p><script>alert(1)</script>"),
            ("status", "on"),
        ],
        Some(("cover", "launch.png", "image/png", b"\x89PNG fake")),
    );

    let response = harness.send(multipart_post("/posts/create", body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let posts = harness.store.live_posts().await;
    assert_eq!(posts.len(), 1);
    let post = &posts[0];
    assert_eq!(location(&response), format!("/posts/{}/edit", post.id));
    assert_eq!(post.slug, "launch-day");
    assert_eq!(post.status, PostStatus::Published);
    assert_eq!(post.category_name.as_deref(), Some("News"));
    assert!(!post.content.contains("<script>"));

    let cover = post.cover.as_ref().expect("cover stored");
    assert_eq!(cover.filename, "launch.png");
    assert!(cover.stored_path.starts_with("covers/"));
    assert!(harness.media.path().join(&cover.stored_path).exists());
}

#[tokio::test]
async fn truncated_submission_discards_stored_cover() {
    let harness = Harness::new();
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"cover\"; filename=\"cover.png\"\r\nContent-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(b"\x89PNG fake");
    body.extend_from_slice(
        format!(
            "\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nunfinished"
        )
        .as_bytes(),
    );

    let response = harness.send(multipart_post("/posts/create", body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(harness.store.live_posts().await.is_empty());
    assert_eq!(stored_files(harness.media.path()), 0);
}

#[tokio::test]
async fn create_with_missing_title_rerenders_with_errors() {
    let harness = Harness::new();
    let body = multipart_body(&[("title", "  "), ("slug", "")], None);

    let response = harness.send(multipart_post("/posts/create", body)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let html = body_text(response).await;
    assert!(html.contains("The title field is required."));
    assert!(html.contains("The slug field is required."));
    assert!(harness.store.live_posts().await.is_empty());
}

#[tokio::test]
async fn create_rejects_taken_slug() {
    let harness = Harness::new();
    harness
        .store
        .add_post("Launch day", PostStatus::Draft, None, 0)
        .await;
    let body = multipart_body(&[("title", "Launch day"), ("slug", "launch-day")], None);

    let response = harness.send(multipart_post("/posts/create", body)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        body_text(response)
            .await
            .contains("The slug has already been taken.")
    );
    assert_eq!(harness.store.live_posts().await.len(), 1);
}

#[tokio::test]
async fn update_keeps_cover_unless_removed() {
    let harness = Harness::new();
    let post = harness
        .store
        .add_post("Original", PostStatus::Draft, None, 0)
        .await;
    let media = MediaStorage::new(harness.media.path().to_path_buf()).expect("media");
    let cover = media
        .store("covers", "old.png", "image/png", Bytes::from_static(b"old"))
        .await
        .expect("stored cover");
    harness.store.set_cover(post.id, cover.clone()).await;
    let uri = format!("/posts/{}/edit", post.id);

    let body = multipart_body(&[("title", "Renamed"), ("slug", "renamed")], None);
    let response = harness.send(multipart_post(&uri, body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let updated = harness.store.post(post.id).await.expect("post");
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.cover.as_ref(), Some(&cover));

    let body = multipart_body(
        &[
            ("title", "Renamed"),
            ("slug", "renamed"),
            ("remove_cover", "1"),
        ],
        None,
    );
    let response = harness.send(multipart_post(&uri, body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let updated = harness.store.post(post.id).await.expect("post");
    assert!(updated.cover.is_none());
    assert!(!harness.media.path().join(&cover.stored_path).exists());
}

#[tokio::test]
async fn edit_and_show_pages_render_the_record() {
    let harness = Harness::new();
    let post = harness
        .store
        .add_post("Field notes", PostStatus::Published, None, 0)
        .await;

    let response = harness
        .send(admin_get(&format!("/posts/{}/edit", post.id)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Edit Field notes"));
    assert!(html.contains("field-notes"));
    assert!(html.contains("/posts/form/slug"));
    assert!(html.contains(r#"id="post-tags""#));

    let response = harness
        .send(admin_get(&format!("/posts/show/{}", post.id)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<p>Field notes</p>"));
    assert!(html.contains(r#"id="post-tags""#));
}

#[tokio::test]
async fn unknown_posts_are_not_found() {
    let harness = Harness::new();
    let missing = Uuid::new_v4();

    for uri in [
        format!("/posts/{missing}/edit"),
        format!("/posts/show/{missing}"),
        format!("/download/image/{missing}"),
    ] {
        let response = harness.send(admin_get(&uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn bulk_delete_soft_deletes_selection() {
    let harness = Harness::new();
    let first = harness
        .store
        .add_post("First", PostStatus::Draft, None, 0)
        .await;
    let second = harness
        .store
        .add_post("Second", PostStatus::Draft, None, 1)
        .await;
    let kept = harness
        .store
        .add_post("Kept", PostStatus::Draft, None, 2)
        .await;

    let body = format!("ids={}&ids={}", first.id, second.id);
    let response = harness.send(form_post("/posts/bulk/delete", &body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let live = harness.store.live_posts().await;
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].id, kept.id);
}

#[tokio::test]
async fn soft_deleted_posts_leave_listing_stats_and_badge() {
    let harness = Harness::new();
    let mut published = Vec::new();
    for (day, title) in ["Alpha", "Bravo", "Charlie"].into_iter().enumerate() {
        published.push(
            harness
                .store
                .add_post(title, PostStatus::Published, None, day as i64)
                .await,
        );
    }
    harness
        .store
        .add_post("Delta", PostStatus::Draft, None, 5)
        .await;

    let html = body_text(harness.send(admin_get("/posts")).await).await;
    assert_eq!(stat_value(&html, "Total posts"), "4");
    assert_eq!(nav_badge(&html), ("primary".to_string(), "3".to_string()));

    let body = format!("ids={}&ids={}", published[0].id, published[1].id);
    let response = harness.send(form_post("/posts/bulk/delete", &body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let html = body_text(harness.send(admin_get("/posts")).await).await;
    assert!(!html.contains("Alpha"));
    assert!(!html.contains("Bravo"));
    assert!(html.contains("Charlie"));
    assert!(html.contains("Delta"));
    assert_eq!(stat_value(&html, "Total posts"), "2");
    assert_eq!(stat_value(&html, "Published"), "1");
    assert_eq!(stat_value(&html, "Drafts"), "1");
    assert_eq!(nav_badge(&html), ("danger".to_string(), "1".to_string()));
}

#[tokio::test]
async fn bulk_rejects_unknown_actions_and_bad_ids() {
    let harness = Harness::new();

    let response = harness.send(form_post("/posts/bulk/archive", "")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = harness
        .send(form_post("/posts/bulk/delete", "ids=not-a-uuid"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tags_attach_create_and_detach() {
    let harness = Harness::new();
    let post = harness
        .store
        .add_post("Tagged", PostStatus::Draft, None, 0)
        .await;
    let rust = harness.store.add_tag("Rust", "rust").await;
    let base = format!("/posts/{}/tags", post.id);

    let response = harness
        .send(form_post(
            &format!("{base}/attach"),
            &format!("tag_id={}", rust.id),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/posts/{}/edit", post.id));

    let mut request = form_post(&format!("{base}/create"), "name=Async+Rust");
    request
        .headers_mut()
        .insert("datastar-request", "true".parse().expect("header"));
    let response = harness.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stream = body_text(response).await;
    assert!(stream.contains("datastar-patch-elements"));
    assert!(stream.contains("Created and attached Async Rust."));

    assert_eq!(
        harness.store.tag_names_for(post.id).await,
        vec!["Async Rust".to_string(), "Rust".to_string()]
    );

    let response = harness
        .send(form_post(&format!("{base}/{}/detach", rust.id), ""))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        harness.store.tag_names_for(post.id).await,
        vec!["Async Rust".to_string()]
    );

    let response = harness
        .send(form_post(&format!("{base}/{}/detach", rust.id), ""))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_tag_names_are_rejected() {
    let harness = Harness::new();
    let post = harness
        .store
        .add_post("Tagged", PostStatus::Draft, None, 0)
        .await;

    let response = harness
        .send(form_post(&format!("/posts/{}/tags/create", post.id), "name=+"))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(harness.store.tag_names_for(post.id).await.is_empty());
}

#[tokio::test]
async fn download_image_serves_cover_as_attachment() {
    let harness = Harness::new();
    let post = harness
        .store
        .add_post("With cover", PostStatus::Draft, None, 0)
        .await;
    let bare = harness
        .store
        .add_post("Without cover", PostStatus::Draft, None, 1)
        .await;
    let media = MediaStorage::new(harness.media.path().to_path_buf()).expect("media");
    let cover: CoverRecord = media
        .store("covers", "sunset.jpg", "image/jpeg", Bytes::from_static(b"jpeg"))
        .await
        .expect("stored cover");
    harness.store.set_cover(post.id, cover.clone()).await;

    let response = harness
        .send(admin_get(&format!("/download/image/{}", post.id)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"sunset.jpg\""
    );
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(body_bytes(response).await, Bytes::from_static(b"jpeg"));

    let response = harness
        .send(admin_get(&format!("/download/image/{}", bare.id)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = harness
        .send(admin_get(&format!("/media/{}", cover.stored_path)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
}

#[tokio::test]
async fn health_reflects_database_probe() {
    let harness = Harness::new();

    let response = harness.send(admin_get("/_health/db")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    harness.store.set_offline(true);
    let response = harness.send(admin_get("/_health/db")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
