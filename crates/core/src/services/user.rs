//! User service.

use chrono::{DateTime, Utc};
use inkwell_common::{AppError, AppResult, IdGenerator};
use inkwell_db::{
    entities::{
        subscription,
        user::{self, Role, UserStatus},
    },
    repositories::{PostRepository, SubscriptionRepository, TagRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_FIRST_NAME: &str = "Jonathan";
pub const DEFAULT_LAST_NAME: &str = "Doe";
pub const DEFAULT_JOB_TITLE: &str = "Collaborator & Editor";
pub const DEFAULT_DESCRIPTION: &str = "Meet Jonathan Doe, a passionate writer and blogger with a \
    love for technology and travel. Jonathan holds a degree in Computer Science and has spent \
    years working in the tech industry, gaining a deep understanding of the impact technology \
    has on our lives.";

/// Default page size of [`UserService::list`].
const DEFAULT_LIST_LIMIT: u64 = 20;
/// Upper bound of [`UserService::list`].
const MAX_LIST_LIMIT: u64 = 100;

/// Build a fresh account with default profile fields.
pub(crate) fn new_user_model(
    id: String,
    email: String,
    password_hash: String,
    now: DateTime<Utc>,
) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(id),
        email: Set(email),
        password: Set(password_hash),
        role: Set(Role::User),
        first_name: Set(DEFAULT_FIRST_NAME.to_string()),
        last_name: Set(DEFAULT_LAST_NAME.to_string()),
        middle_name: Set(None),
        job_title: Set(DEFAULT_JOB_TITLE.to_string()),
        description: Set(DEFAULT_DESCRIPTION.to_string()),
        avatar: Set(String::new()),
        social: Set(serde_json::json!({})),
        status: Set(UserStatus::Active),
        status_updated_at: Set(Some(now.into())),
        status_comment: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(None),
    }
}

/// Social media links shown on a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 512))]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 512))]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 512))]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 512))]
    pub youtube: Option<String>,
}

/// Input for updating the caller's profile.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 128))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub last_name: Option<String>,

    #[validate(length(max = 128))]
    pub middle_name: Option<String>,

    #[validate(length(max = 256))]
    pub job_title: Option<String>,

    #[validate(length(max = 2048))]
    pub description: Option<String>,

    #[validate(length(max = 1024))]
    pub avatar: Option<String>,

    #[validate(nested)]
    pub social: Option<SocialLinks>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    subscription_repo: SubscriptionRepository,
    post_repo: PostRepository,
    tag_repo: TagRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        subscription_repo: SubscriptionRepository,
        post_repo: PostRepository,
        tag_repo: TagRepository,
    ) -> Self {
        Self {
            user_repo,
            subscription_repo,
            post_repo,
            tag_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List users, newest first.
    pub async fn list(&self, search: Option<&str>, limit: Option<u64>) -> AppResult<Vec<user::Model>> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        self.user_repo.search(search, limit).await
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Update profile fields. Absent fields are left untouched; an empty
    /// middle name clears it.
    pub async fn update_profile(
        &self,
        id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(id).await?;
        let mut active: user::ActiveModel = user.into();

        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(middle_name) = input.middle_name {
            active.middle_name = Set(Some(middle_name).filter(|m| !m.is_empty()));
        }
        if let Some(job_title) = input.job_title {
            active.job_title = Set(job_title);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(avatar) = input.avatar {
            active.avatar = Set(avatar);
        }
        if let Some(social) = input.social {
            let social = serde_json::to_value(social)
                .map_err(|e| AppError::Internal(format!("Failed to encode social links: {e}")))?;
            active.social = Set(social);
        }

        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Delete an account.
    ///
    /// The user's posts go with it, so the tags they carried lose one post
    /// each.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let tag_ids: Vec<String> = self
            .post_repo
            .find_by_author(id)
            .await?
            .into_iter()
            .filter_map(|p| p.tag_id)
            .collect();

        self.user_repo.delete(id).await?;

        for tag_id in &tag_ids {
            self.tag_repo.decrement_post_count(tag_id).await?;
        }

        tracing::info!(user_id = %id, tagged_posts = tag_ids.len(), "Deleted user");
        Ok(())
    }

    /// Subscribe to or unsubscribe from an author.
    ///
    /// Returns `true` when the caller is subscribed afterwards.
    pub async fn toggle_subscription(&self, user_id: &str, author_id: &str) -> AppResult<bool> {
        if user_id == author_id {
            return Err(AppError::BadRequest(
                "You cannot subscribe to yourself".to_string(),
            ));
        }

        self.user_repo.get_by_id(user_id).await?;
        self.user_repo.get_by_id(author_id).await?;

        if let Some(existing) = self
            .subscription_repo
            .find_by_pair(user_id, author_id)
            .await?
        {
            self.subscription_repo.delete(&existing.id).await?;
            return Ok(false);
        }

        let model = subscription::ActiveModel {
            id: Set(self.id_gen.generate()),
            subscriber_id: Set(user_id.to_string()),
            author_id: Set(author_id.to_string()),
            created_at: Set(Utc::now().into()),
        };
        if !self.subscription_repo.insert_if_absent(model).await? {
            tracing::debug!(
                user_id = %user_id,
                author_id = %author_id,
                "Subscription already recorded"
            );
        }

        Ok(true)
    }

    /// Authors the user is subscribed to.
    pub async fn subscriptions(&self, user_id: &str) -> AppResult<Vec<user::Model>> {
        let ids: Vec<String> = self
            .subscription_repo
            .find_by_subscriber(user_id)
            .await?
            .into_iter()
            .map(|s| s.author_id)
            .collect();

        self.user_repo.find_by_ids(&ids).await
    }

    /// Users subscribed to the user.
    pub async fn subscribers(&self, user_id: &str) -> AppResult<Vec<user::Model>> {
        let ids: Vec<String> = self
            .subscription_repo
            .find_by_author(user_id)
            .await?
            .into_iter()
            .map(|s| s.subscriber_id)
            .collect();

        self.user_repo.find_by_ids(&ids).await
    }

    /// Ban a user, or lift the ban of a banned user.
    ///
    /// Returns the resulting status.
    pub async fn toggle_banned(
        &self,
        target_id: &str,
        comment: Option<String>,
    ) -> AppResult<UserStatus> {
        let user = self.user_repo.get_by_id(target_id).await?;

        let (status, comment) = if user.status == UserStatus::Banned {
            (UserStatus::Active, None)
        } else {
            (UserStatus::Banned, comment)
        };

        let mut active: user::ActiveModel = user.into();
        active.status = Set(status);
        active.status_comment = Set(comment);
        active.status_updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await?;

        tracing::info!(user_id = %target_id, status = ?status, "Changed ban state");
        Ok(status)
    }

    /// Grant or revoke admin-level-one.
    ///
    /// Returns the resulting role.
    pub async fn promote_to_admin(&self, target_id: &str) -> AppResult<Role> {
        let user = self.user_repo.get_by_id(target_id).await?;

        let role = match user.role {
            Role::User => Role::AdminLevelOne,
            Role::AdminLevelOne => Role::User,
            Role::AdminLevelTwo => {
                return Err(AppError::BadRequest(
                    "Cannot change the role of an admin-level-two user".to_string(),
                ));
            }
        };

        let mut active: user::ActiveModel = user.into();
        active.role = Set(role);
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await?;

        tracing::info!(user_id = %target_id, role = ?role, "Changed role");
        Ok(role)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use inkwell_db::test_utils::fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service(user_db: MockDatabase, sub_db: MockDatabase) -> UserService {
        UserService::new(
            UserRepository::new(Arc::new(user_db.into_connection())),
            SubscriptionRepository::new(Arc::new(sub_db.into_connection())),
            PostRepository::new(Arc::new(empty().into_connection())),
            TagRepository::new(Arc::new(empty().into_connection())),
        )
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    fn empty() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    #[tokio::test]
    async fn test_subscribe_to_self_is_rejected() {
        let service = service(empty(), empty());

        let result = service.toggle_subscription("u1", "u1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_toggle_subscription_creates_then_removes() {
        let alice = fixtures::user("u1", "alice@example.com");
        let bob = fixtures::user("u2", "bob@example.com");
        let sub = fixtures::subscription("s1", "u1", "u2");

        let user_db = empty()
            .append_query_results([[alice.clone()]])
            .append_query_results([[bob.clone()]])
            .append_query_results([[alice]])
            .append_query_results([[bob]]);
        let sub_db = empty()
            .append_query_results([Vec::<subscription::Model>::new()])
            .append_query_results([[sub]])
            .append_exec_results([exec_ok(), exec_ok()]);

        let service = service(user_db, sub_db);

        assert!(service.toggle_subscription("u1", "u2").await.unwrap());
        assert!(!service.toggle_subscription("u1", "u2").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_subscribe_is_idempotent() {
        let user_db = empty()
            .append_query_results([[fixtures::user("u1", "alice@example.com")]])
            .append_query_results([[fixtures::user("u2", "bob@example.com")]]);
        let sub_db = empty()
            .append_query_results([Vec::<subscription::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }]);

        let service = service(user_db, sub_db);

        assert!(service.toggle_subscription("u1", "u2").await.unwrap());
    }

    #[tokio::test]
    async fn test_toggle_subscription_unknown_author() {
        let alice = fixtures::user("u1", "alice@example.com");
        let user_db = empty()
            .append_query_results([[alice]])
            .append_query_results([Vec::<user::Model>::new()]);

        let service = service(user_db, empty());
        let result = service.toggle_subscription("u1", "ghost").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_releases_tag_counts() {
        let tagged = |id: &str, tag: &str| inkwell_db::entities::post::Model {
            tag_id: Some(tag.to_string()),
            ..fixtures::post(id, "u1")
        };
        let posts = vec![
            tagged("p1", "rust"),
            tagged("p2", "rust"),
            fixtures::post("p3", "u1"),
        ];

        let post_db = empty().append_query_results([posts]);
        let user_db = empty().append_exec_results([exec_ok()]);
        let tag_conn = Arc::new(
            empty()
                .append_exec_results([exec_ok(), exec_ok()])
                .into_connection(),
        );

        let service = UserService::new(
            UserRepository::new(Arc::new(user_db.into_connection())),
            SubscriptionRepository::new(Arc::new(empty().into_connection())),
            PostRepository::new(Arc::new(post_db.into_connection())),
            TagRepository::new(tag_conn.clone()),
        );

        service.delete("u1").await.unwrap();
        drop(service);

        let Ok(conn) = Arc::try_unwrap(tag_conn) else {
            panic!("connection still shared");
        };
        let log = conn.into_transaction_log();
        assert_eq!(log.len(), 2);
        for entry in &log {
            let sql = format!("{entry:?}");
            assert!(sql.contains("UPDATE"));
            assert!(sql.contains("post_count"));
        }
    }

    #[tokio::test]
    async fn test_delete_missing_user_leaves_tags_alone() {
        let post_db =
            empty().append_query_results([Vec::<inkwell_db::entities::post::Model>::new()]);
        let user_db = empty().append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }]);

        let service = UserService::new(
            UserRepository::new(Arc::new(user_db.into_connection())),
            SubscriptionRepository::new(Arc::new(empty().into_connection())),
            PostRepository::new(Arc::new(post_db.into_connection())),
            TagRepository::new(Arc::new(empty().into_connection())),
        );

        let result = service.delete("ghost").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_banned_bans_active_user() {
        let user = fixtures::user("u1", "a@example.com");
        let banned = user::Model {
            status: UserStatus::Banned,
            ..user.clone()
        };

        let service = service(
            empty()
                .append_query_results([[user]])
                .append_query_results([[banned]]),
            empty(),
        );

        let status = service
            .toggle_banned("u1", Some("spam".to_string()))
            .await
            .unwrap();
        assert_eq!(status, UserStatus::Banned);
    }

    #[tokio::test]
    async fn test_toggle_banned_lifts_ban() {
        let banned = user::Model {
            status: UserStatus::Banned,
            ..fixtures::user("u1", "a@example.com")
        };
        let active = user::Model {
            status: UserStatus::Active,
            ..banned.clone()
        };

        let service = service(
            empty()
                .append_query_results([[banned]])
                .append_query_results([[active]]),
            empty(),
        );

        let status = service.toggle_banned("u1", None).await.unwrap();
        assert_eq!(status, UserStatus::Active);
    }

    #[tokio::test]
    async fn test_promote_toggles_admin_level_one() {
        let user = fixtures::user("u1", "a@example.com");
        let promoted = fixtures::user_with_role("u1", Role::AdminLevelOne);

        let service = service(
            empty()
                .append_query_results([[user]])
                .append_query_results([[promoted.clone()]])
                .append_query_results([[promoted]])
                .append_query_results([[fixtures::user("u1", "a@example.com")]]),
            empty(),
        );

        assert_eq!(service.promote_to_admin("u1").await.unwrap(), Role::AdminLevelOne);
        assert_eq!(service.promote_to_admin("u1").await.unwrap(), Role::User);
    }

    #[tokio::test]
    async fn test_promote_admin_level_two_is_rejected() {
        let admin = fixtures::user_with_role("u1", Role::AdminLevelTwo);
        let service = service(empty().append_query_results([[admin]]), empty());

        let result = service.promote_to_admin("u1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_update_profile_validates_lengths() {
        let service = service(empty(), empty());

        let result = service
            .update_profile(
                "u1",
                UpdateProfileInput {
                    first_name: Some(String::new()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_profile_sets_fields() {
        let user = fixtures::user("u1", "a@example.com");
        let updated = user::Model {
            first_name: "Ada".to_string(),
            ..user.clone()
        };

        let service = service(
            empty()
                .append_query_results([[user]])
                .append_query_results([[updated]]),
            empty(),
        );

        let result = service
            .update_profile(
                "u1",
                UpdateProfileInput {
                    first_name: Some("Ada".to_string()),
                    social: Some(SocialLinks {
                        twitter: Some("https://twitter.com/ada".to_string()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(result.first_name, "Ada");
    }

    #[tokio::test]
    async fn test_list_clamps_limit() {
        let service = service(
            empty().append_query_results([[fixtures::user("u1", "a@example.com")]]),
            empty(),
        );

        let users = service.list(None, Some(10_000)).await.unwrap();
        assert_eq!(users.len(), 1);
    }
}
