//! Inkwell server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use inkwell_api::{AppState, auth_middleware, router as api_router};
use inkwell_common::{Config, LocalStorage, StorageBackend};
use inkwell_core::{
    ActivityService, AuthService, CommentService, PostService, QuoteService, ReactionService,
    TagService, TokenService, UploadService, UserService, run_activity_sweep,
};
use inkwell_db::repositories::{
    CommentRepository, PostFavoriteRepository, PostRepository, PostVoteRepository,
    QuoteRepository, SubscriptionRepository, TagRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkwell=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting inkwell server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = Arc::new(inkwell_db::init(&config.database).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    let applied = inkwell_db::migrate(&db).await?;
    info!(applied, "Migrations completed");

    // Upload storage
    tokio::fs::create_dir_all(&config.storage.uploads_dir).await?;
    let storage: Arc<dyn StorageBackend> = Arc::new(LocalStorage::new(
        config.storage.uploads_dir.clone(),
        config.storage.base_url.clone(),
    ));

    // Initialize repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let subscription_repo = SubscriptionRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let vote_repo = PostVoteRepository::new(Arc::clone(&db));
    let favorite_repo = PostFavoriteRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let tag_repo = TagRepository::new(Arc::clone(&db));
    let quote_repo = QuoteRepository::new(Arc::clone(&db));

    // Initialize services
    let tokens = TokenService::new(&config.auth);
    let state = AppState {
        auth_service: AuthService::new(user_repo.clone(), tokens),
        user_service: UserService::new(
            user_repo.clone(),
            subscription_repo,
            post_repo.clone(),
            tag_repo.clone(),
        ),
        post_service: PostService::new(post_repo.clone(), tag_repo.clone(), user_repo.clone()),
        reaction_service: ReactionService::new(
            vote_repo,
            favorite_repo,
            post_repo.clone(),
            user_repo.clone(),
        ),
        comment_service: CommentService::new(comment_repo, post_repo.clone()),
        tag_service: TagService::new(tag_repo),
        quote_service: QuoteService::new(quote_repo),
        upload_service: UploadService::new(storage),
    };

    // Background jobs
    if config.scheduler.enabled {
        let activity = Arc::new(ActivityService::new(user_repo, post_repo));
        let period = Duration::from_secs(config.scheduler.activity_sweep_interval_secs);
        let _sweep = run_activity_sweep(activity, period);
        info!(
            interval_secs = config.scheduler.activity_sweep_interval_secs,
            "Activity sweep scheduled"
        );
    }

    // Build router
    let app = Router::new()
        .merge(api_router())
        .nest_service(
            &config.storage.base_url,
            ServeDir::new(&config.storage.uploads_dir),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
