//! Tag service.

use chrono::Utc;
use inkwell_common::{AppError, AppResult, IdGenerator};
use inkwell_db::{entities::tag, repositories::TagRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

const DEFAULT_LIMIT: u64 = 50;
const MAX_LIMIT: u64 = 100;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagInput {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTagInput {
    pub id: String,
    #[validate(length(min = 1, max = 64))]
    pub name: String,
}

/// Tag service for business logic.
#[derive(Clone)]
pub struct TagService {
    tag_repo: TagRepository,
    id_gen: IdGenerator,
}

impl TagService {
    /// Create a new tag service.
    #[must_use]
    pub const fn new(tag_repo: TagRepository) -> Self {
        Self {
            tag_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Tags ordered by how many posts carry them.
    pub async fn list(&self, limit: Option<u64>) -> AppResult<Vec<tag::Model>> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        self.tag_repo.find_popular(limit).await
    }

    pub async fn create(&self, input: CreateTagInput) -> AppResult<tag::Model> {
        input.validate()?;
        let name = input.name.trim().to_string();

        if self.tag_repo.find_by_name(&name).await?.is_some() {
            return Err(AppError::Conflict(format!("Tag {name} already exists")));
        }

        let model = tag::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            post_count: Set(0),
            created_at: Set(Utc::now().into()),
        };

        self.tag_repo.create(model).await
    }

    /// Rename a tag.
    pub async fn update(&self, input: UpdateTagInput) -> AppResult<tag::Model> {
        input.validate()?;
        let name = input.name.trim().to_string();

        let tag = self.tag_repo.get_by_id(&input.id).await?;
        if tag.name == name {
            return Ok(tag);
        }

        if self.tag_repo.find_by_name(&name).await?.is_some() {
            return Err(AppError::Conflict(format!("Tag {name} already exists")));
        }

        let mut active: tag::ActiveModel = tag.into();
        active.name = Set(name);
        self.tag_repo.update(active).await
    }

    /// Delete a tag. Posts carrying it become untagged.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.tag_repo.get_by_id(id).await?;
        self.tag_repo.delete(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use inkwell_db::test_utils::fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: MockDatabase) -> TagService {
        TagService::new(TagRepository::new(Arc::new(db.into_connection())))
    }

    #[tokio::test]
    async fn test_create_duplicate_conflicts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[fixtures::tag("t1", "rust", 3)]]);

        let result = service(db)
            .create(CreateTagInput {
                name: "rust".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<tag::Model>::new()])
            .append_query_results([[fixtures::tag("t1", "rust", 0)]]);

        let tag = service(db)
            .create(CreateTagInput {
                name: " rust ".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(tag.name, "rust");
        assert_eq!(tag.post_count, 0);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([Vec::<tag::Model>::new()]);

        let result = service(db)
            .update(UpdateTagInput {
                id: "ghost".to_string(),
                name: "go".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([Vec::<tag::Model>::new()]);

        assert!(matches!(
            service(db).delete("ghost").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_keeps_repository_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
            fixtures::tag("t1", "rust", 9),
            fixtures::tag("t2", "go", 2),
        ]]);

        let tags = service(db).list(Some(1000)).await.unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "rust");
    }
}
