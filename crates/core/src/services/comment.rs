//! Comment service.

use chrono::Utc;
use inkwell_common::{AppError, AppResult, IdGenerator};
use inkwell_db::{
    entities::{comment, user},
    repositories::{CommentRepository, PostRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 3000))]
    pub content: String,
    pub post_id: String,
}

/// Input for updating a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentInput {
    pub id: String,
    #[validate(length(min = 1, max = 3000))]
    pub content: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, post_repo: PostRepository) -> Self {
        Self {
            comment_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comments of a post, oldest first.
    pub async fn by_post(&self, post_id: &str) -> AppResult<Vec<comment::Model>> {
        self.post_repo.get_by_id(post_id).await?;
        self.comment_repo.find_by_post(post_id).await
    }

    pub async fn get(&self, id: &str) -> AppResult<comment::Model> {
        self.comment_repo.get_by_id(id).await
    }

    /// Comments written by a user, newest first.
    pub async fn by_author(&self, author_id: &str) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_by_author(author_id).await
    }

    pub async fn create(
        &self,
        author_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;
        self.post_repo.get_by_id(&input.post_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            content: Set(input.content),
            author_id: Set(author_id.to_string()),
            post_id: Set(input.post_id),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.comment_repo.create(model).await
    }

    /// Update a comment. Only its author or an admin may do so.
    pub async fn update(
        &self,
        actor: &user::Model,
        input: UpdateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let comment = self.comment_repo.get_by_id(&input.id).await?;
        ensure_can_modify(actor, &comment)?;

        let mut active: comment::ActiveModel = comment.into();
        active.content = Set(input.content);
        active.updated_at = Set(Some(Utc::now().into()));

        self.comment_repo.update(active).await
    }

    /// Delete a comment. Only its author or an admin may do so.
    pub async fn delete(&self, id: &str, actor: &user::Model) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(id).await?;
        ensure_can_modify(actor, &comment)?;

        self.comment_repo.delete(id).await
    }
}

fn ensure_can_modify(actor: &user::Model, comment: &comment::Model) -> AppResult<()> {
    if comment.author_id == actor.id || actor.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::Conflict(
            "You are not the author of this comment".to_string(),
        ))
    }
}
