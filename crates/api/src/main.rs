use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peritos_api::auth::password::{hash_password, validate_password_strength};
use peritos_api::config::ServerConfig;
use peritos_api::router::build_app_router;
use peritos_api::state::AppState;
use peritos_db::models::user::CreateUser;
use peritos_db::repositories::UserRepo;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peritos_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = peritos_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    peritos_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    peritos_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Bootstrap admin ---
    bootstrap_admin(&pool).await;

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Create the initial admin account when the users table is empty.
///
/// Controlled by the `ADMIN_PASSWORD` environment variable; without it the
/// server still starts, but with no accounts and a warning in the log.
async fn bootstrap_admin(pool: &peritos_db::DbPool) {
    let count = UserRepo::count(pool).await.expect("Failed to count users");
    if count > 0 {
        return;
    }

    let password = match std::env::var("ADMIN_PASSWORD") {
        Ok(p) if !p.trim().is_empty() => p,
        _ => {
            tracing::warn!(
                "Users table is empty and ADMIN_PASSWORD is not set; no admin account created"
            );
            return;
        }
    };

    if let Err(reason) = validate_password_strength(&password, 8) {
        tracing::warn!(%reason, "ADMIN_PASSWORD rejected; no admin account created");
        return;
    }

    let password_hash = hash_password(&password).expect("Failed to hash admin password");
    let admin = UserRepo::create(
        pool,
        &CreateUser {
            username: "admin".to_string(),
            email: "admin@peritos.local".to_string(),
            password_hash,
            nombre: Some("Administrador".to_string()),
            role: "admin".to_string(),
        },
    )
    .await
    .expect("Failed to create admin account");
    tracing::info!(user_id = admin.id, "Bootstrap admin account created");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
