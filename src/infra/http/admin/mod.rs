mod health;
mod media;
mod posts;
mod shared;
mod state;
mod tags;

pub use state::{AdminState, DatabaseProbe, IdentityHeaders};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    response::Redirect,
    routing::{get, post},
};

use crate::application::resource::{
    MEDIA_PREFIX, PostResource,
    pages::{NamedRoute, ResourcePage},
};

use super::middleware::{log_responses, resolve_viewer, set_request_context};

pub fn build_admin_router(state: AdminState) -> Router {
    let base = PostResource::BASE_PATH;
    let upload_limit = usize::try_from(state.upload_limit_bytes).unwrap_or(usize::MAX);
    let identity = state.identity.clone();

    let mut router: Router<AdminState> =
        Router::new().route("/", get(|| async { Redirect::to(PostResource::BASE_PATH) }));

    for &page in state.posts.resource().pages() {
        let path = page.full_route(base);
        router = match page {
            ResourcePage::Index => router.route(&path, get(posts::admin_posts)),
            ResourcePage::Create => router.route(
                &path,
                get(posts::admin_post_new)
                    .post(posts::admin_post_create)
                    .layer(DefaultBodyLimit::max(upload_limit)),
            ),
            ResourcePage::Edit => router.route(
                &path,
                get(posts::admin_post_edit)
                    .post(posts::admin_post_update)
                    .layer(DefaultBodyLimit::max(upload_limit)),
            ),
            ResourcePage::Show => router.route(&path, get(posts::admin_post_show)),
        };
    }

    router
        .route("/posts/form/slug", post(posts::admin_post_slug))
        .route(
            "/posts/{record}/status",
            post(posts::admin_post_toggle_status),
        )
        .route("/posts/bulk/{action}", post(posts::admin_posts_bulk))
        .route(
            "/posts/{record}/tags/attach",
            post(tags::admin_post_tag_attach),
        )
        .route(
            "/posts/{record}/tags/create",
            post(tags::admin_post_tag_create),
        )
        .route(
            "/posts/{record}/tags/{tag}/detach",
            post(tags::admin_post_tag_detach),
        )
        .route(
            NamedRoute::DownloadImage.pattern(),
            get(media::download_image),
        )
        .route(&format!("{MEDIA_PREFIX}/{{*path}}"), get(media::serve_media))
        .route("/_health/db", get(health::admin_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn_with_state(identity, resolve_viewer))
        .layer(middleware::from_fn(set_request_context))
}
