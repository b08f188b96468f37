//! Authentication service.
//!
//! Passwords are stored as Argon2 PHC strings. Sessions are a pair of HS256
//! JWTs: a short-lived access token sent as `Authorization: Bearer` and a
//! long-lived refresh token exchanged for a new pair.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use inkwell_common::{AppError, AppResult, IdGenerator, config::AuthConfig};
use inkwell_db::{
    entities::user::{self, UserStatus},
    repositories::UserRepository,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::new_user_model;

/// Kind of a JWT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Authorizes API requests.
    Access,
    /// Can only be exchanged for a new token pair.
    Refresh,
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    /// User email at issue time.
    pub email: String,
    /// Token kind.
    pub typ: TokenType,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expires at (unix seconds).
    pub exp: i64,
}

/// An access/refresh token pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs and verifies tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Create a token service from the auth configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: Duration::seconds(config.access_token_ttl_secs),
            refresh_ttl: Duration::seconds(config.refresh_token_ttl_secs),
        }
    }

    /// Issue a token pair for a user.
    pub fn issue(&self, user: &user::Model) -> AppResult<TokenPair> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token pair as if the current time were `now`.
    pub fn issue_at(&self, user: &user::Model, now: DateTime<Utc>) -> AppResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.sign(user, TokenType::Access, now, self.access_ttl)?,
            refresh_token: self.sign(user, TokenType::Refresh, now, self.refresh_ttl)?,
        })
    }

    fn sign(
        &self,
        user: &user::Model,
        typ: TokenType,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> AppResult<String> {
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            typ,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify signature, expiry and kind of a token.
    pub fn verify(&self, token: &str, expected: TokenType) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            tracing::debug!(error = %e, "Rejected token");
            AppError::Unauthorized
        })?;

        if data.claims.typ != expected {
            tracing::debug!(typ = ?data.claims.typ, "Rejected token of the wrong kind");
            return Err(AppError::Unauthorized);
        }

        Ok(data.claims)
    }
}

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

/// Input for logging in.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1, max = 320))]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Result of a successful register, login or refresh.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub tokens: TokenPair,
    pub user: user::Model,
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tokens: TokenService,
    id_gen: IdGenerator,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, tokens: TokenService) -> Self {
        Self {
            user_repo,
            tokens,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an account and sign it in.
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthSession> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(
                "User with this email is already registered".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password)?;
        let model = new_user_model(self.id_gen.generate(), email, password_hash, Utc::now());
        let user = self.user_repo.create(model).await?;

        tracing::info!(user_id = %user.id, "Registered user");

        let tokens = self.tokens.issue(&user)?;
        Ok(AuthSession { tokens, user })
    }

    /// Sign in with email and password.
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthSession> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password)? {
            return Err(AppError::Unauthorized);
        }

        if user.status == UserStatus::Banned {
            return Err(AppError::Forbidden("User is banned".to_string()));
        }

        let tokens = self.tokens.issue(&user)?;
        Ok(AuthSession { tokens, user })
    }

    /// Exchange a refresh token for a new token pair.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthSession> {
        let claims = self.tokens.verify(refresh_token, TokenType::Refresh)?;

        let user = self
            .user_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if user.status == UserStatus::Banned {
            return Err(AppError::Forbidden("User is banned".to_string()));
        }

        let tokens = self.tokens.issue(&user)?;
        Ok(AuthSession { tokens, user })
    }

    /// Resolve the user behind an access token.
    ///
    /// Banned users and deleted accounts are rejected even if their token is
    /// still valid.
    pub async fn authenticate(&self, access_token: &str) -> AppResult<user::Model> {
        let claims = self.tokens.verify(access_token, TokenType::Access)?;

        let user = self
            .user_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if user.status == UserStatus::Banned {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }
}

/// Hash a password using Argon2.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
