//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect,
    sea_query::{Expr, Func},
};

/// Column a post listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostSortField {
    /// Creation time.
    #[default]
    CreatedAt,
    /// Number of views.
    ViewCount,
    /// Title, lexicographic.
    Title,
}

impl PostSortField {
    const fn column(self) -> post::Column {
        match self {
            Self::CreatedAt => post::Column::CreatedAt,
            Self::ViewCount => post::Column::ViewCount,
            Self::Title => post::Column::Title,
        }
    }
}

/// Filters and ordering for [`PostRepository::list`].
#[derive(Debug, Clone)]
pub struct PostListQuery {
    /// Only posts with this tag.
    pub tag_id: Option<String>,
    /// Case-insensitive title substring.
    pub search: Option<String>,
    /// Sort column.
    pub sort: PostSortField,
    /// Sort direction.
    pub descending: bool,
    /// Maximum number of rows.
    pub limit: u64,
}

impl Default for PostListQuery {
    fn default() -> Self {
        Self {
            tag_id: None,
            search: None,
            sort: PostSortField::CreatedAt,
            descending: true,
            limit: 20,
        }
    }
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Find posts by IDs, newest first.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<post::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Post::find()
            .filter(post::Column::Id.is_in(ids.to_vec()))
            .order_by_desc(post::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List posts.
    pub async fn list(&self, query: &PostListQuery) -> AppResult<Vec<post::Model>> {
        let mut select = Post::find();

        if let Some(tag_id) = &query.tag_id {
            select = select.filter(post::Column::TagId.eq(tag_id.as_str()));
        }

        if let Some(q) = query.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!(
                "%{}%",
                q.to_lowercase().replace('%', "\\%").replace('_', "\\_")
            );
            select = select.filter(Expr::expr(Func::lower(Expr::col(post::Column::Title))).like(pattern));
        }

        let order = if query.descending { Order::Desc } else { Order::Asc };

        select
            .order_by(query.sort.column(), order)
            .order_by_desc(post::Column::Id)
            .limit(query.limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most viewed posts.
    pub async fn find_most_viewed(&self, limit: u64) -> AppResult<Vec<post::Model>> {
        Post::find()
            .order_by_desc(post::Column::ViewCount)
            .order_by_desc(post::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Posts written by a user, newest first.
    pub async fn find_by_author(&self, author_id: &str) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Creation time of the most recent post by a user.
    pub async fn latest_created_at_by_author(
        &self,
        author_id: &str,
    ) -> AppResult<Option<chrono::DateTime<chrono::Utc>>> {
        let latest = Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(latest.map(|p| p.created_at.with_timezone(&chrono::Utc)))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post. Votes, favorites and comments cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment view count atomically (single UPDATE query, no fetch).
    pub async fn increment_view_count(&self, id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::ViewCount,
                Expr::col(post::Column::ViewCount).add(1),
            )
            .filter(post::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn test_list_with_filters() {
        let p1 = fixtures::post("p1", "u1");
        let p2 = fixtures::post("p2", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1, p2]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let query = PostListQuery {
            tag_id: Some("t1".to_string()),
            search: Some("rust".to_string()),
            sort: PostSortField::ViewCount,
            descending: false,
            limit: 5,
        };
        let result = repo.list(&query).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_latest_created_at_by_author() {
        let mut post = fixtures::post("p1", "u1");
        let created = Utc::now() - Duration::days(3);
        post.created_at = created.into();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);

        let latest = repo.latest_created_at_by_author("u1").await.unwrap();
        assert_eq!(latest.map(|t| t.timestamp()), Some(created.timestamp()));

        let none = repo.latest_created_at_by_author("u2").await.unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_increment_view_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        assert!(repo.increment_view_count("p1").await.is_ok());
    }

    #[tokio::test]
    async fn test_find_by_ids_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = PostRepository::new(db);
        assert!(repo.find_by_ids(&[]).await.unwrap().is_empty());
    }
}
