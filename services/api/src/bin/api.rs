//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, LogNotifier, SmtpNotifier, StaticPurchaseHistory},
    config::{Config, StorageBackend},
    error::ApiError,
    web::{
        api_router, cookie::CookiePolicy, rest::ApiDoc, state::AppState,
        sweeper::sweep_expired_sessions,
    },
};
use axum::{
    http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method},
    Router,
};
use chrono::Duration;
use eventify_core::{
    memory::{MemoryAccountRepository, MemorySessionStore},
    AccountRepository, CredentialManager, NotificationService, SessionManager, SessionStore,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const SWEEP_PERIOD: std::time::Duration = std::time::Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Storage & Run Migrations ---
    let (accounts, session_store, db_pool): (
        Arc<dyn AccountRepository>,
        Arc<dyn SessionStore>,
        Option<PgPool>,
    ) = match &config.storage {
        StorageBackend::Postgres { database_url } => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(database_url)
                .await?;
            let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            (
                db_adapter.clone() as Arc<dyn AccountRepository>,
                db_adapter as Arc<dyn SessionStore>,
                Some(db_pool),
            )
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; accounts and sessions are lost on restart.");
            (
                Arc::new(MemoryAccountRepository::new()) as Arc<dyn AccountRepository>,
                Arc::new(MemorySessionStore::new()) as Arc<dyn SessionStore>,
                None,
            )
        }
    };

    // --- 3. Initialize Service Adapters ---
    let notifier: Arc<dyn NotificationService> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpNotifier::new(smtp)?) as Arc<dyn NotificationService>,
        None => {
            warn!("SMTP_HOST not set; welcome emails will only be logged.");
            Arc::new(LogNotifier)
        }
    };
    if !config.cookie_secure {
        warn!("COOKIE_SECURE=false; session cookies will be sent over plain HTTP.");
    }

    // --- 4. Build the Shared AppState ---
    let sessions = SessionManager::new(session_store, Duration::hours(config.session_ttl_hours));
    let app_state = Arc::new(AppState {
        credentials: CredentialManager::new(accounts.clone(), notifier),
        sessions: sessions.clone(),
        accounts,
        purchases: Arc::new(StaticPurchaseHistory),
        cookies: CookiePolicy {
            secure: config.cookie_secure,
            max_age_secs: sessions.ttl().num_seconds(),
        },
    });

    // --- 5. Start Background Tasks ---
    let shutdown = CancellationToken::new();
    let sweeper = tokio::spawn(sweep_expired_sessions(
        sessions,
        SWEEP_PERIOD,
        shutdown.clone(),
    ));

    // --- 6. Create the Web Router ---
    let origins = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|_| ApiError::Internal(format!("Invalid CORS origin '{}'", o)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    let app = Router::new()
        .merge(api_router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    // --- 8. Drain ---
    shutdown.cancel();
    if let Err(e) = sweeper.await {
        warn!("Session sweeper ended abnormally: {}", e);
    }
    if let Some(db_pool) = db_pool {
        db_pool.close().await;
        info!("Database pool closed.");
    }
    info!("Server stopped.");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM and cancels background work.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");
    token.cancel();
}
