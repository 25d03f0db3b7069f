// Main entry point for the notes service

use notes_service::api::{create_router, AppState};
use notes_service::auth::audit_logger::AuditLogger;
use notes_service::auth::credential_store::PgCredentialStore;
use notes_service::auth::password::CredentialHasher;
use notes_service::auth::token::JwtTokenService;
use notes_service::config::Config;
use notes_service::speller::client::SpellerClient;
use notes_service::state::note_store::PgNoteStore;
use notes_service::state::run_migrations;

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load and validate configuration first (before any logging)
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // 2. Initialize tracing subscriber with config values
    init_tracing(&config)?;

    info!("Starting notes service");

    info!(
        server_address = %config.server_address,
        speller_url = %config.speller_url,
        "Configuration loaded"
    );

    // 3. Initialize database pool
    let db_pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to connect to database");
            e
        })?;

    info!("Database pool initialized");

    // 4. Apply schema migrations
    if config.run_migrations {
        run_migrations(&db_pool).await.map_err(|e| {
            error!(error = %e, "Failed to apply migrations");
            e
        })?;
        info!("Migrations applied");
    }

    // 5. Initialize credential store
    let hasher = Arc::new(CredentialHasher::new(
        config.argon2_m_cost,
        config.argon2_t_cost,
        config.argon2_p_cost,
    )?);
    let credential_store = Arc::new(PgCredentialStore::new(db_pool.clone(), hasher));

    info!("Credential store initialized");

    // 6. Initialize token service
    let token_service = Arc::new(JwtTokenService::new(config.jwt_secret_bytes()));

    // 7. Initialize speller client
    let correction_client = Arc::new(SpellerClient::new(
        &config.speller_url,
        config.speller_timeout_secs,
    )?);

    info!("Speller client initialized");

    // 8. Initialize note store
    let note_store = Arc::new(PgNoteStore::new(db_pool));

    // 9. Create application state
    let app_state = AppState {
        credential_store,
        token_service,
        correction_client,
        note_store,
        audit_logger: Arc::new(AuditLogger::new()),
        config: Arc::new(config),
    };

    // 10. Create router
    let router = create_router(&app_state).with_state(app_state.clone());

    info!("Router created");

    // 11. Start HTTP server
    let addr = app_state.config.server_address.clone();
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        error!(error = %e, addr = %addr, "Failed to bind to address");
        e
    })?;

    info!(addr = %addr, "Server listening on {}", addr);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!(error = %e, "Server error");
            e
        })?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber based on configuration
///
/// `RUST_LOG` takes precedence over `LOG_LEVEL`.
fn init_tracing(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_env_filter(filter);

    if config.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            info!("SIGTERM received, starting graceful shutdown");
        },
    }
}
