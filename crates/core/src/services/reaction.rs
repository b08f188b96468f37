//! Reaction service: likes, dislikes and favorites on posts.
//!
//! Likes and dislikes share one vote row per (user, post), so a user can
//! never hold both. Toggling a vote of the opposite kind switches the row in
//! place. Favorites are independent of votes.

use chrono::Utc;
use inkwell_common::{AppResult, IdGenerator};
use inkwell_db::{
    entities::{
        post, post_favorite,
        post_vote::{self, VoteKind},
    },
    repositories::{PostFavoriteRepository, PostRepository, PostVoteRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// Reaction totals of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReactionCounts {
    pub likes: u64,
    pub dislikes: u64,
    pub favorites: u64,
}

/// Reaction service for business logic.
#[derive(Clone)]
pub struct ReactionService {
    vote_repo: PostVoteRepository,
    favorite_repo: PostFavoriteRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl ReactionService {
    /// Create a new reaction service.
    #[must_use]
    pub const fn new(
        vote_repo: PostVoteRepository,
        favorite_repo: PostFavoriteRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            vote_repo,
            favorite_repo,
            post_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Toggle a like. Returns whether the post is liked afterwards.
    pub async fn toggle_like(&self, post_id: &str, user_id: &str) -> AppResult<bool> {
        self.toggle_vote(post_id, user_id, VoteKind::Like).await
    }

    /// Toggle a dislike. Returns whether the post is disliked afterwards.
    pub async fn toggle_dislike(&self, post_id: &str, user_id: &str) -> AppResult<bool> {
        self.toggle_vote(post_id, user_id, VoteKind::Dislike).await
    }

    async fn toggle_vote(&self, post_id: &str, user_id: &str, kind: VoteKind) -> AppResult<bool> {
        self.post_repo.get_by_id(post_id).await?;
        self.user_repo.get_by_id(user_id).await?;

        match self.vote_repo.find_by_user_and_post(user_id, post_id).await? {
            None => {
                let model = post_vote::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    post_id: Set(post_id.to_string()),
                    kind: Set(kind),
                    created_at: Set(Utc::now().into()),
                };
                if !self.vote_repo.insert_if_absent(model).await? {
                    tracing::debug!(
                        post_id = %post_id,
                        user_id = %user_id,
                        "Vote already recorded"
                    );
                }
                Ok(true)
            }
            Some(vote) if vote.kind == kind => {
                self.vote_repo.delete(&vote.id).await?;
                Ok(false)
            }
            Some(vote) => {
                self.vote_repo.set_kind(&vote.id, kind).await?;
                tracing::debug!(
                    post_id = %post_id,
                    user_id = %user_id,
                    from = ?kind.opposite(),
                    to = ?kind,
                    "Switched vote"
                );
                Ok(true)
            }
        }
    }

    /// Toggle a favorite. Returns whether the post is a favorite afterwards.
    pub async fn toggle_favorite(&self, post_id: &str, user_id: &str) -> AppResult<bool> {
        self.post_repo.get_by_id(post_id).await?;
        self.user_repo.get_by_id(user_id).await?;

        if let Some(existing) = self
            .favorite_repo
            .find_by_user_and_post(user_id, post_id)
            .await?
        {
            self.favorite_repo.delete(&existing.id).await?;
            return Ok(false);
        }

        let model = post_favorite::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            post_id: Set(post_id.to_string()),
            created_at: Set(Utc::now().into()),
        };
        if !self.favorite_repo.insert_if_absent(model).await? {
            tracing::debug!(post_id = %post_id, user_id = %user_id, "Favorite already recorded");
        }

        Ok(true)
    }

    /// Posts the user liked.
    pub async fn liked_posts(&self, user_id: &str) -> AppResult<Vec<post::Model>> {
        let ids: Vec<String> = self
            .vote_repo
            .find_by_user_and_kind(user_id, VoteKind::Like)
            .await?
            .into_iter()
            .map(|v| v.post_id)
            .collect();

        self.post_repo.find_by_ids(&ids).await
    }

    /// Posts the user marked as favorite.
    pub async fn favorite_posts(&self, user_id: &str) -> AppResult<Vec<post::Model>> {
        let ids: Vec<String> = self
            .favorite_repo
            .find_by_user(user_id)
            .await?
            .into_iter()
            .map(|f| f.post_id)
            .collect();

        self.post_repo.find_by_ids(&ids).await
    }

    /// Reaction totals of a post.
    pub async fn counts(&self, post_id: &str) -> AppResult<ReactionCounts> {
        Ok(ReactionCounts {
            likes: self
                .vote_repo
                .count_by_post_and_kind(post_id, VoteKind::Like)
                .await?,
            dislikes: self
                .vote_repo
                .count_by_post_and_kind(post_id, VoteKind::Dislike)
                .await?,
            favorites: self.favorite_repo.count_by_post(post_id).await?,
        })
    }
}
