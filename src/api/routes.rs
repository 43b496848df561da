//! HTTP server assembly.

use axum::{
    middleware,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::notify::{self, NotificationDispatcher};
use crate::service::TaskService;
use crate::store::{self, UserStore};

use super::accounts;
use super::auth;
use super::pages;
use super::tasks;
use super::types::HealthResponse;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub service: TaskService,
    pub users: Arc<dyn UserStore>,
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let (task_store, users) = store::create_store(config.store, &config.data_dir)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(store = ?config.store, data_dir = %config.data_dir.display(), "storage initialized");

    let channel = notify::channel_from_config(&config.twilio);
    let service = TaskService::new(task_store, NotificationDispatcher::new(channel));

    if config.using_default_jwt_secret() {
        tracing::warn!("JWT_SECRET not set; using the built-in development secret");
    }

    let state = Arc::new(AppState {
        config: config.clone(),
        service,
        users,
    });

    let public_routes = Router::new()
        .route("/", get(pages::index))
        .route("/register", get(pages::register_page))
        .route("/register", post(accounts::register))
        .route("/login", get(pages::login_page))
        .route("/login", post(accounts::login))
        // The task page checks the cookie itself so it can redirect
        // browsers to /login instead of answering 401.
        .route("/tasks", get(pages::tasks_page))
        .route("/api/health", get(health));

    let protected_routes = Router::new()
        .route("/api/tasks", get(tasks::list_tasks))
        .route("/tasks", post(tasks::create_task))
        .route("/tasks/:id", delete(tasks::delete_task))
        .route("/tasks/:id/complete", post(tasks::complete_task))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_auth,
        ));

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::clone(&state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
