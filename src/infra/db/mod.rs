//! Postgres-backed repository implementations.

mod categories;
mod posts;
mod tags;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use sqlx::{
    Postgres, QueryBuilder,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::repos::{PostQueryFilter, RepoError};

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    /// Append the listing constraints. Callers start from a `WHERE p.deleted_at IS NULL` clause.
    fn apply_post_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &PostQueryFilter) {
        if let Some(search) = filter.search.as_ref() {
            qb.push(" AND p.title ILIKE ");
            qb.push_bind(format!("%{}%", escape_like(search)));
        }

        for status in &filter.statuses {
            qb.push(" AND p.status = ");
            qb.push_bind(status.is_published());
        }

        if let Some(category) = filter.category.as_ref() {
            qb.push(" AND c.name = ");
            qb.push_bind(category.clone());
        }

        if let Some(from) = filter.created_from {
            qb.push(" AND p.created_at::date >= ");
            qb.push_bind(from);
        }

        if let Some(until) = filter.created_until {
            qb.push(" AND p.created_at::date <= ");
            qb.push_bind(until);
        }
    }

    fn convert_count(value: i64) -> Result<u64, RepoError> {
        value
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::domain::types::PostStatus;

    #[test]
    fn filter_sql_combines_constraints_with_and() {
        let filter = PostQueryFilter {
            search: Some("rust".to_string()),
            statuses: vec![PostStatus::Published],
            category: Some("News".to_string()),
            created_from: Some(date!(2024 - 01 - 01)),
            created_until: None,
        };

        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM posts p WHERE p.deleted_at IS NULL");
        PostgresRepositories::apply_post_filter(&mut qb, &filter);

        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM posts p WHERE p.deleted_at IS NULL AND p.title ILIKE $1 \
             AND p.status = $2 AND c.name = $3 AND p.created_at::date >= $4"
        );
    }

    #[test]
    fn like_patterns_are_escaped() {
        assert_eq!(escape_like("100%_off"), "100\\%\\_off");
    }
}
