use axum::http::StatusCode;

use crate::{
    application::{admin::posts::AdminPostError, error::HttpError},
    infra::http::repo_error_to_http,
};

pub(crate) fn admin_post_error(source: &'static str, err: AdminPostError) -> HttpError {
    match err {
        AdminPostError::Validation(errors) => HttpError::from_error(
            source,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Post form failed validation",
            &errors,
        ),
        AdminPostError::Forbidden { .. } => {
            HttpError::from_error(source, StatusCode::FORBIDDEN, "Forbidden", &err)
        }
        AdminPostError::NotFound(_) => {
            HttpError::from_error(source, StatusCode::NOT_FOUND, "Post not found", &err)
        }
        AdminPostError::Repo(repo) => repo_error_to_http(source, repo),
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn forbidden_and_missing_posts_keep_their_statuses() {
        let forbidden = AdminPostError::Forbidden {
            actor: "grace".into(),
            role: "admin",
        };
        assert_eq!(
            admin_post_error("test", forbidden).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            admin_post_error("test", AdminPostError::NotFound(Uuid::nil())).status(),
            StatusCode::NOT_FOUND
        );
    }
}
