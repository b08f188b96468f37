//! API integration tests.
//!
//! These tests drive the full router, including the auth middleware, against
//! mock databases.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware,
};
use inkwell_api::{AppState, auth_middleware, router as api_router};
use inkwell_common::{LocalStorage, config::AuthConfig};
use inkwell_core::{
    AuthService, CommentService, PostService, QuoteService, ReactionService, TagService,
    TokenService, UploadService, UserService, auth::hash_password,
};
use inkwell_db::{
    entities::{post_vote, user},
    repositories::{
        CommentRepository, PostFavoriteRepository, PostRepository, PostVoteRepository,
        QuoteRepository, SubscriptionRepository, TagRepository, UserRepository,
    },
    test_utils::fixtures,
};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use serde_json::Value;
use tower::ServiceExt;

fn empty() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

fn exec_ok() -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: 1,
    }
}

fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
    std::collections::BTreeMap::from([("num_items", sea_orm::Value::BigInt(Some(n)))])
}

/// One mock database per repository.
struct Dbs {
    user: MockDatabase,
    subscription: MockDatabase,
    post: MockDatabase,
    vote: MockDatabase,
    favorite: MockDatabase,
    comment: MockDatabase,
    tag: MockDatabase,
    quote: MockDatabase,
}

impl Dbs {
    fn new() -> Self {
        Self {
            user: empty(),
            subscription: empty(),
            post: empty(),
            vote: empty(),
            favorite: empty(),
            comment: empty(),
            tag: empty(),
            quote: empty(),
        }
    }
}

fn token_service() -> TokenService {
    TokenService::new(&AuthConfig {
        jwt_secret: "test-secret".to_string(),
        access_token_ttl_secs: 3600,
        refresh_token_ttl_secs: 86_400,
    })
}

fn access_token(user: &user::Model) -> String {
    token_service().issue(user).unwrap().access_token
}

fn create_test_router(dbs: Dbs) -> Router {
    let user_repo = UserRepository::new(Arc::new(dbs.user.into_connection()));
    let post_repo = PostRepository::new(Arc::new(dbs.post.into_connection()));
    let tag_repo = TagRepository::new(Arc::new(dbs.tag.into_connection()));

    let uploads = std::env::temp_dir().join("inkwell-api-tests");
    let storage = Arc::new(LocalStorage::new(uploads, "/uploads".to_string()));

    let state = AppState {
        auth_service: AuthService::new(user_repo.clone(), token_service()),
        user_service: UserService::new(
            user_repo.clone(),
            SubscriptionRepository::new(Arc::new(dbs.subscription.into_connection())),
            post_repo.clone(),
            tag_repo.clone(),
        ),
        post_service: PostService::new(post_repo.clone(), tag_repo.clone(), user_repo.clone()),
        reaction_service: ReactionService::new(
            PostVoteRepository::new(Arc::new(dbs.vote.into_connection())),
            PostFavoriteRepository::new(Arc::new(dbs.favorite.into_connection())),
            post_repo.clone(),
            user_repo.clone(),
        ),
        comment_service: CommentService::new(
            CommentRepository::new(Arc::new(dbs.comment.into_connection())),
            post_repo,
        ),
        tag_service: TagService::new(tag_repo),
        quote_service: QuoteService::new(QuoteRepository::new(Arc::new(
            dbs.quote.into_connection(),
        ))),
        upload_service: UploadService::new(storage),
    };

    api_router()
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(Dbs::new());

    let response = app.oneshot(get("/nonexistent/endpoint", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_protected_route_without_token_is_unauthorized() {
    let app = create_test_router(Dbs::new());

    let response = app.oneshot(get("/user/info-profile", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = create_test_router(Dbs::new());

    let response = app
        .oneshot(get("/user/info-profile", Some("not-a-jwt")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_info_profile_returns_current_user_without_password() {
    let user = user::Model {
        password: "$argon2id$secret".to_string(),
        ..fixtures::user("u1", "u1@example.com")
    };
    let token = access_token(&user);

    let mut dbs = Dbs::new();
    dbs.user = dbs.user.append_query_results([[user]]);
    let app = create_test_router(dbs);

    let response = app
        .oneshot(get("/user/info-profile", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["email"], "u1@example.com");
    assert_eq!(body["data"]["role"], "user");
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_banned_user_token_is_unauthorized() {
    let user = user::Model {
        status: user::UserStatus::Banned,
        ..fixtures::user("u1", "u1@example.com")
    };
    let token = access_token(&user);

    let mut dbs = Dbs::new();
    dbs.user = dbs.user.append_query_results([[user]]);
    let app = create_test_router(dbs);

    let response = app
        .oneshot(get("/user/info-profile", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_with_invalid_email_is_rejected() {
    let app = create_test_router(Dbs::new());

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/register",
            None,
            r#"{"email":"not-an-email","password":"secret123"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_register_with_used_email_conflicts() {
    let mut dbs = Dbs::new();
    dbs.user = dbs
        .user
        .append_query_results([[fixtures::user("u1", "taken@example.com")]]);
    let app = create_test_router(dbs);

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/register",
            None,
            r#"{"email":"taken@example.com","password":"secret123"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_returns_tokens() {
    let created = fixtures::user("u1", "new@example.com");

    let mut dbs = Dbs::new();
    dbs.user = dbs
        .user
        .append_query_results([Vec::<user::Model>::new()])
        .append_query_results([[created]]);
    let app = create_test_router(dbs);

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/register",
            None,
            r#"{"email":"new@example.com","password":"secret123"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert!(body["data"]["tokens"]["accessToken"].is_string());
    assert!(body["data"]["tokens"]["refreshToken"].is_string());
    assert_eq!(body["data"]["user"]["email"], "new@example.com");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let user = user::Model {
        password: hash_password("correct-horse").unwrap(),
        ..fixtures::user("u1", "u1@example.com")
    };

    let mut dbs = Dbs::new();
    dbs.user = dbs.user.append_query_results([[user]]);
    let app = create_test_router(dbs);

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            r#"{"email":"u1@example.com","password":"battery-staple"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_with_access_token_is_unauthorized() {
    let token = access_token(&fixtures::user("u1", "u1@example.com"));
    let app = create_test_router(Dbs::new());

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/refresh-token",
            None,
            &format!(r#"{{"refreshToken":"{token}"}}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tag_create_requires_admin() {
    let user = fixtures::user_with_role("u1", user::Role::User);
    let token = access_token(&user);

    let mut dbs = Dbs::new();
    dbs.user = dbs.user.append_query_results([[user]]);
    let app = create_test_router(dbs);

    let response = app
        .oneshot(json_request(
            "POST",
            "/tag/new",
            Some(&token),
            r#"{"name":"rust"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_tag_create_as_admin() {
    let admin = fixtures::user_with_role("a1", user::Role::AdminLevelOne);
    let token = access_token(&admin);

    let mut dbs = Dbs::new();
    dbs.user = dbs.user.append_query_results([[admin]]);
    dbs.tag = dbs
        .tag
        .append_query_results([Vec::<inkwell_db::entities::tag::Model>::new()])
        .append_query_results([[fixtures::tag("t1", "rust", 0)]]);
    let app = create_test_router(dbs);

    let response = app
        .oneshot(json_request(
            "POST",
            "/tag/new",
            Some(&token),
            r#"{"name":"rust"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "rust");
    assert_eq!(body["data"]["postCount"], 0);
}

#[tokio::test]
async fn test_delete_post_as_stranger_conflicts() {
    let stranger = fixtures::user("stranger", "s@example.com");
    let token = access_token(&stranger);

    let mut dbs = Dbs::new();
    dbs.user = dbs.user.append_query_results([[stranger]]);
    dbs.post = dbs
        .post
        .append_query_results([[fixtures::post("p1", "author")]]);
    let app = create_test_router(dbs);

    let response = app
        .oneshot(json_request("DELETE", "/post/delete/p1", Some(&token), ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("You are not the author of this post")
    );
}

#[tokio::test]
async fn test_delete_post_as_author() {
    let author = fixtures::user("author", "a@example.com");
    let token = access_token(&author);

    let mut dbs = Dbs::new();
    dbs.user = dbs.user.append_query_results([[author]]);
    dbs.post = dbs
        .post
        .append_query_results([[fixtures::post("p1", "author")]])
        .append_exec_results([exec_ok()]);
    let app = create_test_router(dbs);

    let response = app
        .oneshot(json_request("DELETE", "/post/delete/p1", Some(&token), ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_toggle_like_returns_new_state() {
    let user = fixtures::user("u1", "u1@example.com");
    let token = access_token(&user);

    let mut dbs = Dbs::new();
    // auth middleware, then the reaction precondition
    dbs.user = dbs.user.append_query_results([[user.clone()], [user]]);
    dbs.post = dbs
        .post
        .append_query_results([[fixtures::post("p1", "author")]]);
    dbs.vote = dbs
        .vote
        .append_query_results([Vec::<post_vote::Model>::new()])
        .append_exec_results([exec_ok()]);
    let app = create_test_router(dbs);

    let response = app
        .oneshot(json_request(
            "POST",
            "/post/post-reaction/like/p1",
            Some(&token),
            "",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"], true);
}

#[tokio::test]
async fn test_get_post_counts_view_and_reactions() {
    let mut dbs = Dbs::new();
    dbs.post = dbs
        .post
        .append_query_results([[fixtures::post("p1", "author")]])
        .append_exec_results([exec_ok()]);
    dbs.vote = dbs
        .vote
        .append_query_results([[count_row(2)]])
        .append_query_results([[count_row(0)]]);
    dbs.favorite = dbs.favorite.append_query_results([[count_row(1)]]);
    let app = create_test_router(dbs);

    let response = app.oneshot(get("/post/by-id/p1", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["viewCount"], 1);
    assert_eq!(body["data"]["reactions"]["likes"], 2);
    assert_eq!(body["data"]["reactions"]["favorites"], 1);
}

#[tokio::test]
async fn test_post_list_rejects_bad_sort() {
    let app = create_test_router(Dbs::new());

    let response = app
        .oneshot(get("/post?sort=author_DESC", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_random_quote_without_quotes_is_not_found() {
    let mut dbs = Dbs::new();
    dbs.quote = dbs.quote.append_query_results([[count_row(0)]]);
    let app = create_test_router(dbs);

    let response = app
        .oneshot(get("/quote/random-quote", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_rejects_invalid_folder() {
    let user = fixtures::user("u1", "u1@example.com");
    let token = access_token(&user);

    let mut dbs = Dbs::new();
    dbs.user = dbs.user.append_query_results([[user]]);
    let app = create_test_router(dbs);

    let body = "--XBOUNDARY\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n\
        Content-Type: text/plain\r\n\r\n\
        hello\r\n\
        --XBOUNDARY--\r\n";

    let request = Request::builder()
        .method("POST")
        .uri("/upload/bad.folder/avatars")
        .header(
            header::CONTENT_TYPE,
            "multipart/form-data; boundary=XBOUNDARY",
        )
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_requires_auth() {
    let app = create_test_router(Dbs::new());

    let request = Request::builder()
        .method("POST")
        .uri("/upload/images/avatars")
        .header(
            header::CONTENT_TYPE,
            "multipart/form-data; boundary=XBOUNDARY",
        )
        .body(Body::from("--XBOUNDARY--\r\n"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
