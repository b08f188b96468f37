//! Users endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
};
use inkwell_common::AppResult;
use inkwell_core::UpdateProfileInput;
use inkwell_db::entities::user::{self, Role, UserStatus};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, require_role},
    middleware::AppState,
    response::{self, ApiResponse},
};

/// User response. Never carries the password hash.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub job_title: String,
    pub description: String,
    pub avatar: String,
    pub social: serde_json::Value,
    pub status: UserStatus,
    pub status_updated_at: Option<String>,
    pub status_comment: Option<String>,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            first_name: user.first_name,
            last_name: user.last_name,
            middle_name: user.middle_name,
            job_title: user.job_title,
            description: user.description,
            avatar: user.avatar,
            social: user.social,
            status: user.status,
            status_updated_at: user.status_updated_at.map(|t| t.to_rfc3339()),
            status_comment: user.status_comment,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

fn users(models: Vec<user::Model>) -> ApiResponse<Vec<UserResponse>> {
    ApiResponse::ok(models.into_iter().map(Into::into).collect())
}

/// List users request.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub search: Option<String>,
    pub limit: Option<u64>,
}

/// List users, optionally filtered by name.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let found = state
        .user_service
        .list(query.search.as_deref(), query.limit)
        .await?;
    Ok(users(found))
}

async fn by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get(&id).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Get current user.
async fn info_profile(AuthUser(user): AuthUser) -> ApiResponse<UserResponse> {
    ApiResponse::ok(user.into())
}

async fn update_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let updated = state.user_service.update_profile(&user.id, req).await?;
    Ok(ApiResponse::ok(updated.into()))
}

async fn delete_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    state.user_service.delete(&user.id).await?;
    Ok(response::ok())
}

async fn toggle_subscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(author_id): Path<String>,
) -> AppResult<ApiResponse<bool>> {
    let subscribed = state
        .user_service
        .toggle_subscription(&user.id, &author_id)
        .await?;
    Ok(ApiResponse::ok(subscribed))
}

/// Authors the current user is subscribed to.
async fn subscriptions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    Ok(users(state.user_service.subscriptions(&user.id).await?))
}

/// Users subscribed to the current user.
async fn subscribers(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    Ok(users(state.user_service.subscribers(&user.id).await?))
}

/// Ban request.
#[derive(Debug, Default, Deserialize)]
pub struct ToggleBannedRequest {
    pub comment: Option<String>,
}

async fn toggle_banned(
    AuthUser(admin): AuthUser,
    State(state): State<AppState>,
    Path(target_id): Path<String>,
    body: Option<Json<ToggleBannedRequest>>,
) -> AppResult<ApiResponse<UserStatus>> {
    require_role(&admin, Role::AdminLevelOne)?;

    let comment = body.and_then(|Json(req)| req.comment);
    let status = state.user_service.toggle_banned(&target_id, comment).await?;

    tracing::info!(admin_id = %admin.id, target_id = %target_id, status = ?status, "Toggled ban");
    Ok(ApiResponse::ok(status))
}

async fn toggle_admin_level_one(
    AuthUser(admin): AuthUser,
    State(state): State<AppState>,
    Path(target_id): Path<String>,
) -> AppResult<ApiResponse<Role>> {
    require_role(&admin, Role::AdminLevelTwo)?;

    let role = state.user_service.promote_to_admin(&target_id).await?;

    tracing::info!(admin_id = %admin.id, target_id = %target_id, role = ?role, "Toggled admin role");
    Ok(ApiResponse::ok(role))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user", get(list))
        .route("/user/by-id/{id}", get(by_id))
        .route("/user/info-profile", get(info_profile))
        .route("/user/update-profile", put(update_profile))
        .route("/user/delete-profile", delete(delete_profile))
        .route("/user/toggle-subscribe/{id}", post(toggle_subscribe))
        .route("/user/subscriptions", get(subscriptions))
        .route("/user/subscribers", get(subscribers))
        .route("/user/toggle-banned/{id}", patch(toggle_banned))
        .route(
            "/user/toggle-admin-level-one/{id}",
            patch(toggle_admin_level_one),
        )
}
