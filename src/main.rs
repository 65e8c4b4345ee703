//! Application entry point and server initialization
//!
//! Loads configuration, builds the shared state and serves the router until
//! SIGINT or SIGTERM.

use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tinyapp::config::Config;
use tinyapp::database::{init_db, AppState};
use tinyapp::route::create_app;

#[tokio::main]
async fn main() {
    let config = Config::from_env().expect("Invalid configuration");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    let db = init_db(config.database_path.as_deref()).expect("Failed to initialize database");
    let hasher = config
        .password_hasher()
        .expect("Invalid password hashing configuration");
    let cookie_key = config.cookie_key().expect("Invalid session secret");

    let state = AppState::new(db, hasher, cookie_key);
    let app = create_app(state).layer(TraceLayer::new_for_http());

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));

    tracing::info!(addr = %addr, "server listening");
    match &config.database_path {
        Some(path) => tracing::info!(path = %path, "using database file"),
        None => tracing::info!("using in-memory database, data resets on restart"),
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Resolves on SIGINT (Ctrl+C) or, on Unix, SIGTERM
///
/// In-flight requests are allowed to finish before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, stopping server");
}
