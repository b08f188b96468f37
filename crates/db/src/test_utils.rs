//! Test utilities for database operations.
//!
//! Connection helpers for PostgreSQL-backed tests and model fixtures for
//! mock-database tests.

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use tracing::info;

/// Test database configuration.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: std::env::var("TEST_DB_USER").unwrap_or_else(|_| "inkwell_test".to_string()),
            password: std::env::var("TEST_DB_PASSWORD")
                .unwrap_or_else(|_| "inkwell_test".to_string()),
            database: std::env::var("TEST_DB_NAME").unwrap_or_else(|_| "inkwell_test".to_string()),
        }
    }
}

impl TestDbConfig {
    /// Get the database URL.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }
}

/// A migrated test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: DatabaseConnection,
    /// Database configuration.
    pub config: TestDbConfig,
}

impl TestDatabase {
    /// Connect with the environment-derived configuration and apply all
    /// migrations.
    pub async fn new() -> Result<Self, DbErr> {
        Self::with_config(TestDbConfig::default()).await
    }

    /// Connect with a custom configuration and apply all migrations.
    pub async fn with_config(config: TestDbConfig) -> Result<Self, DbErr> {
        use sea_orm_migration::MigratorTrait;

        let conn = Database::connect(&config.database_url()).await?;
        crate::migrations::Migrator::up(&conn, None).await?;

        info!(database = %config.database, "Connected to migrated test database");

        Ok(Self { conn, config })
    }

    /// Get the database connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Truncate every application table, keeping the migration history.
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        let tables = self
            .conn
            .query_all(Statement::from_string(
                DatabaseBackend::Postgres,
                "SELECT tablename FROM pg_tables WHERE schemaname = 'public' \
                 AND tablename <> 'seaql_migrations'"
                    .to_string(),
            ))
            .await?;

        let names: Vec<String> = tables
            .iter()
            .filter_map(|row| row.try_get::<String>("", "tablename").ok())
            .map(|name| format!("\"{name}\""))
            .collect();

        if names.is_empty() {
            return Ok(());
        }

        self.conn
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("TRUNCATE TABLE {} CASCADE", names.join(", ")),
            ))
            .await?;

        info!(tables = names.len(), "Cleaned up test database");
        Ok(())
    }
}

/// Model builders shared by repository, service and endpoint tests.
pub mod fixtures {
    use crate::entities::{
        comment, post, post_favorite,
        post_vote::{self, VoteKind},
        quote, subscription, tag,
        user::{self, Role, UserStatus},
    };
    use chrono::Utc;

    /// A regular active user with default profile fields.
    #[must_use]
    pub fn user(id: &str, email: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: email.to_string(),
            password: String::new(),
            role: Role::User,
            first_name: "Jonathan".to_string(),
            last_name: "Doe".to_string(),
            middle_name: None,
            job_title: "Collaborator & Editor".to_string(),
            description: String::new(),
            avatar: String::new(),
            social: serde_json::json!({}),
            status: UserStatus::Active,
            status_updated_at: None,
            status_comment: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    /// A user with the given role.
    #[must_use]
    pub fn user_with_role(id: &str, role: Role) -> user::Model {
        user::Model {
            role,
            ..user(id, &format!("{id}@example.com"))
        }
    }

    /// A post without tag.
    #[must_use]
    pub fn post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            title: format!("Post {id}"),
            content: "Lorem ipsum".to_string(),
            cover: String::new(),
            tag_id: None,
            author_id: author_id.to_string(),
            view_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    /// A vote of `kind` by `user_id` on `post_id`.
    #[must_use]
    pub fn vote(id: &str, user_id: &str, post_id: &str, kind: VoteKind) -> post_vote::Model {
        post_vote::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
            kind,
            created_at: Utc::now().into(),
        }
    }

    /// A favorite by `user_id` on `post_id`.
    #[must_use]
    pub fn favorite(id: &str, user_id: &str, post_id: &str) -> post_favorite::Model {
        post_favorite::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    /// A comment by `author_id` on `post_id`.
    #[must_use]
    pub fn comment(id: &str, author_id: &str, post_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            content: "Nice post".to_string(),
            author_id: author_id.to_string(),
            post_id: post_id.to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    /// A tag with the given post count.
    #[must_use]
    pub fn tag(id: &str, name: &str, post_count: i32) -> tag::Model {
        tag::Model {
            id: id.to_string(),
            name: name.to_string(),
            post_count,
            created_at: Utc::now().into(),
        }
    }

    /// A quote.
    #[must_use]
    pub fn quote(id: &str, author: &str, text: &str) -> quote::Model {
        quote::Model {
            id: id.to_string(),
            author: author.to_string(),
            text: text.to_string(),
        }
    }

    /// A subscription of `subscriber_id` to `author_id`.
    #[must_use]
    pub fn subscription(id: &str, subscriber_id: &str, author_id: &str) -> subscription::Model {
        subscription::Model {
            id: id.to_string(),
            subscriber_id: subscriber_id.to_string(),
            author_id: author_id.to_string(),
            created_at: Utc::now().into(),
        }
    }
}
