//! Post service.

use chrono::Utc;
use inkwell_common::{AppError, AppResult, IdGenerator};
use inkwell_db::{
    entities::{post, user},
    repositories::{PostListQuery, PostRepository, PostSortField, TagRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 100;

/// Query parameters of a post listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuery {
    pub limit: Option<u64>,
    /// Tag name.
    pub tag: Option<String>,
    /// Case-insensitive title substring.
    pub search: Option<String>,
    /// `<field>_<ASC|DESC>` with field one of `createdAt`, `viewCount`, `title`.
    pub sort: Option<String>,
}

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1))]
    pub content: String,

    #[validate(length(max = 1024))]
    #[serde(default)]
    pub cover: Option<String>,

    /// Tag name.
    pub tag: Option<String>,
}

/// Input for updating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostInput {
    pub id: String,

    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub content: Option<String>,

    #[validate(length(max = 1024))]
    pub cover: Option<String>,

    /// Tag name.
    pub tag: Option<String>,
}

/// Parse a `<field>_<dir>` sort expression.
pub fn parse_sort(sort: &str) -> AppResult<(PostSortField, bool)> {
    let (field, dir) = sort
        .rsplit_once('_')
        .ok_or_else(|| AppError::BadRequest(format!("Invalid sort: {sort}")))?;

    let field = match field {
        "createdAt" => PostSortField::CreatedAt,
        "viewCount" => PostSortField::ViewCount,
        "title" => PostSortField::Title,
        _ => return Err(AppError::BadRequest(format!("Invalid sort field: {field}"))),
    };

    let descending = match dir.to_ascii_uppercase().as_str() {
        "DESC" => true,
        "ASC" => false,
        _ => return Err(AppError::BadRequest(format!("Invalid sort direction: {dir}"))),
    };

    Ok((field, descending))
}

fn clamp_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    tag_repo: TagRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        tag_repo: TagRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            post_repo,
            tag_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List posts with optional tag filter, title search and sort.
    pub async fn list(&self, query: PostQuery) -> AppResult<Vec<post::Model>> {
        let (sort, descending) = match query.sort.as_deref() {
            Some(s) => parse_sort(s)?,
            None => (PostSortField::CreatedAt, true),
        };

        let tag_id = match query.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            Some(name) => match self.tag_repo.find_by_name(name).await? {
                Some(tag) => Some(tag.id),
                // no such tag, so no post can carry it
                None => return Ok(vec![]),
            },
            None => None,
        };

        self.post_repo
            .list(&PostListQuery {
                tag_id,
                search: query.search,
                sort,
                descending,
                limit: clamp_limit(query.limit),
            })
            .await
    }

    /// Most viewed posts.
    pub async fn most_viewed(&self, limit: Option<u64>) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_most_viewed(clamp_limit(limit)).await
    }

    /// Posts of an author.
    pub async fn by_author(&self, author_id: &str) -> AppResult<Vec<post::Model>> {
        self.user_repo.get_by_id(author_id).await?;
        self.post_repo.find_by_author(author_id).await
    }

    /// Get a post and count the view.
    pub async fn get(&self, id: &str) -> AppResult<post::Model> {
        let mut post = self.post_repo.get_by_id(id).await?;
        self.post_repo.increment_view_count(id).await?;
        post.view_count += 1;
        Ok(post)
    }

    /// Create a post.
    pub async fn create(&self, author_id: &str, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;

        let tag_id = match input.tag.as_deref() {
            Some(name) => Some(self.require_tag(name).await?),
            None => None,
        };

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            content: Set(input.content),
            cover: Set(input.cover.unwrap_or_default()),
            tag_id: Set(tag_id.clone()),
            author_id: Set(author_id.to_string()),
            view_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let post = self.post_repo.create(model).await?;

        if let Some(tag_id) = tag_id {
            self.tag_repo.increment_post_count(&tag_id).await?;
        }

        tracing::debug!(post_id = %post.id, author_id = %author_id, "Created post");
        Ok(post)
    }

    /// Update a post. Only its author or an admin may do so.
    pub async fn update(
        &self,
        actor: &user::Model,
        input: UpdatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        let post = self.post_repo.get_by_id(&input.id).await?;
        ensure_can_modify(actor, &post)?;

        let old_tag_id = post.tag_id.clone();
        let new_tag_id = match input.tag.as_deref() {
            Some(name) => Some(self.require_tag(name).await?),
            None => old_tag_id.clone(),
        };

        let mut active: post::ActiveModel = post.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        if let Some(cover) = input.cover {
            active.cover = Set(cover);
        }
        active.tag_id = Set(new_tag_id.clone());
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.post_repo.update(active).await?;

        if old_tag_id != new_tag_id {
            if let Some(old) = &old_tag_id {
                self.tag_repo.decrement_post_count(old).await?;
            }
            if let Some(new) = &new_tag_id {
                self.tag_repo.increment_post_count(new).await?;
            }
        }

        Ok(updated)
    }

    /// Delete a post. Only its author or an admin may do so.
    pub async fn delete(&self, post_id: &str, actor: &user::Model) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;
        ensure_can_modify(actor, &post)?;

        self.post_repo.delete(post_id).await?;

        if let Some(tag_id) = &post.tag_id {
            self.tag_repo.decrement_post_count(tag_id).await?;
        }

        tracing::debug!(post_id = %post_id, actor_id = %actor.id, "Deleted post");
        Ok(())
    }

    /// Resolve a tag name the way tags are stored, trimmed.
    async fn require_tag(&self, name: &str) -> AppResult<String> {
        let name = name.trim();
        self.tag_repo
            .find_by_name(name)
            .await?
            .map(|t| t.id)
            .ok_or_else(|| AppError::NotFound(format!("Tag {name}")))
    }
}

fn ensure_can_modify(actor: &user::Model, post: &post::Model) -> AppResult<()> {
    if post.author_id == actor.id || actor.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::Conflict(
            "You are not the author of this post".to_string(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use inkwell_db::{entities::tag, entities::user::Role, test_utils::fixtures};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn empty() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    fn service(post_db: MockDatabase, tag_db: MockDatabase, user_db: MockDatabase) -> PostService {
        PostService::new(
            PostRepository::new(Arc::new(post_db.into_connection())),
            TagRepository::new(Arc::new(tag_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
        )
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(
            parse_sort("createdAt_DESC").unwrap(),
            (PostSortField::CreatedAt, true)
        );
        assert_eq!(
            parse_sort("viewCount_ASC").unwrap(),
            (PostSortField::ViewCount, false)
        );
        assert_eq!(parse_sort("title_desc").unwrap(), (PostSortField::Title, true));
        assert!(parse_sort("author_DESC").is_err());
        assert!(parse_sort("createdAt").is_err());
        assert!(parse_sort("createdAt_SIDEWAYS").is_err());
    }

    #[tokio::test]
    async fn test_list_unknown_tag_is_empty() {
        let service = service(
            empty(),
            empty().append_query_results([Vec::<tag::Model>::new()]),
            empty(),
        );

        let posts = service
            .list(PostQuery {
                tag: Some("nope".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_get_increments_view_count() {
        let post = post::Model {
            view_count: 41,
            ..fixtures::post("p1", "u1")
        };

        let service = service(
            empty()
                .append_query_results([[post]])
                .append_exec_results([exec_ok()]),
            empty(),
            empty(),
        );

        let post = service.get("p1").await.unwrap();
        assert_eq!(post.view_count, 42);
    }

    #[tokio::test]
    async fn test_create_with_missing_tag_is_not_found() {
        let service = service(
            empty(),
            empty().append_query_results([Vec::<tag::Model>::new()]),
            empty(),
        );

        let result = service
            .create(
                "u1",
                CreatePostInput {
                    title: "Hello".to_string(),
                    content: "World".to_string(),
                    cover: None,
                    tag: Some("missing".to_string()),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_with_tag_increments_count() {
        let tag = fixtures::tag("t1", "rust", 0);
        let created = post::Model {
            tag_id: Some("t1".to_string()),
            ..fixtures::post("p1", "u1")
        };

        let service = service(
            empty().append_query_results([[created]]),
            empty()
                .append_query_results([[tag]])
                .append_exec_results([exec_ok()]),
            empty(),
        );

        let post = service
            .create(
                "u1",
                CreatePostInput {
                    title: "Hello".to_string(),
                    content: "World".to_string(),
                    cover: None,
                    tag: Some("rust".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(post.tag_id.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_create_trims_tag_name() {
        let created = post::Model {
            tag_id: Some("t1".to_string()),
            ..fixtures::post("p1", "u1")
        };
        let tag_conn = Arc::new(
            empty()
                .append_query_results([[fixtures::tag("t1", "rust", 0)]])
                .append_exec_results([exec_ok()])
                .into_connection(),
        );

        let service = PostService::new(
            PostRepository::new(Arc::new(
                empty().append_query_results([[created]]).into_connection(),
            )),
            TagRepository::new(tag_conn.clone()),
            UserRepository::new(Arc::new(empty().into_connection())),
        );

        service
            .create(
                "u1",
                CreatePostInput {
                    title: "Hello".to_string(),
                    content: "World".to_string(),
                    cover: None,
                    tag: Some("  rust ".to_string()),
                },
            )
            .await
            .unwrap();
        drop(service);

        let Ok(conn) = Arc::try_unwrap(tag_conn) else {
            panic!("connection still shared");
        };
        let lookup = format!("{:?}", conn.into_transaction_log()[0]);
        assert!(lookup.contains("\"rust\""));
        assert!(!lookup.contains("  rust "));
    }

    #[tokio::test]
    async fn test_delete_by_stranger_conflicts() {
        let post = fixtures::post("p1", "author");
        let stranger = fixtures::user("stranger", "s@example.com");

        let service = service(empty().append_query_results([[post]]), empty(), empty());

        let result = service.delete("p1", &stranger).await;

        match result {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, "You are not the author of this post"),
            other => panic!("Expected Conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_by_author_succeeds() {
        let post = fixtures::post("p1", "author");
        let author = fixtures::user("author", "a@example.com");

        let service = service(
            empty()
                .append_query_results([[post]])
                .append_exec_results([exec_ok()]),
            empty(),
            empty(),
        );

        assert!(service.delete("p1", &author).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_by_admin_decrements_tag() {
        let post = post::Model {
            tag_id: Some("t1".to_string()),
            ..fixtures::post("p1", "author")
        };
        let admin = fixtures::user_with_role("admin", Role::AdminLevelOne);

        let service = service(
            empty()
                .append_query_results([[post]])
                .append_exec_results([exec_ok()]),
            empty().append_exec_results([exec_ok()]),
            empty(),
        );

        assert!(service.delete("p1", &admin).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_retag_moves_count() {
        let post = post::Model {
            tag_id: Some("t1".to_string()),
            ..fixtures::post("p1", "author")
        };
        let updated = post::Model {
            tag_id: Some("t2".to_string()),
            ..post.clone()
        };
        let author = fixtures::user("author", "a@example.com");

        let service = service(
            empty()
                .append_query_results([[post]])
                .append_query_results([[updated]]),
            empty()
                .append_query_results([[fixtures::tag("t2", "go", 0)]])
                .append_exec_results([exec_ok(), exec_ok()]),
            empty(),
        );

        let result = service
            .update(
                &author,
                UpdatePostInput {
                    id: "p1".to_string(),
                    title: None,
                    content: None,
                    cover: None,
                    tag: Some("go".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(result.tag_id.as_deref(), Some("t2"));
    }

    #[tokio::test]
    async fn test_by_author_unknown_user() {
        let service = service(
            empty(),
            empty(),
            empty().append_query_results([Vec::<user::Model>::new()]),
        );

        let result = service.by_author("ghost").await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }
}
