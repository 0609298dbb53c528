//! HTTP API server for paysec
//!
//! Routes are organized into modules:
//! - routes::customers: customer registration and login
//! - routes::employees: employee registration, login and dashboard stats
//! - routes::transactions: submit, list and review transactions
//! - routes::reference: accepted currencies and providers

pub mod error;
pub mod middleware;
pub mod routes;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use paysec_config::Config;
use paysec_core::Bank;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use error::ApiError;
pub use middleware::RateLimiter;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub bank: Arc<Bank>,
    pub config: Config,
    /// `None` when rate limiting is disabled
    pub limiter: Option<Arc<RateLimiter>>,
}

impl AppState {
    pub fn new(config: Config, bank: Bank) -> Self {
        let limiter = config
            .rate_limit
            .enabled
            .then(|| Arc::new(RateLimiter::from_config(&config.rate_limit)));
        Self {
            bank: Arc::new(bank),
            config,
            limiter,
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::{customers, employees, reference, transactions};

    let authenticated = Router::new()
        .route(
            "/customers/transactions",
            get(transactions::list_transactions)
                .post(transactions::submit_transaction)
                .patch(transactions::review_transaction),
        )
        .route("/employees/stats", get(employees::stats))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    let accounts = Router::new()
        .route("/customers/register", post(customers::register))
        .route("/customers/login", post(customers::login))
        .route("/employees/register", post(employees::register))
        .route("/employees/login", post(employees::login))
        .merge(authenticated)
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit));

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/reference/currencies", get(reference::currencies))
        .route("/reference/providers", get(reference::providers))
        .merge(accounts);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api)
        .layer(from_fn_with_state(state.clone(), middleware::enforce_https))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Start the HTTP server
///
/// Binds to the configured address and serves until the process receives
/// Ctrl-C. Client socket addresses are made available to the rate limiter.
pub async fn start_server(config: Config, bank: Bank) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let https_only = config.enforce_https();
    let state = AppState::new(config, bank);
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting paysec server on http://{}", addr);
    if https_only {
        log::info!("Production mode: plaintext requests are redirected to https");
    }
    log::info!("Available routes:");
    log::info!("  - /api/customers/{{register,login,transactions}}");
    log::info!("  - /api/employees/{{register,login,stats}}");
    log::info!("  - /api/reference/{{currencies,providers}}");

    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
