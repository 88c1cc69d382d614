//! HTTP surface for the student collection.
//!
//! | Method | Path                | Operation                |
//! |--------|---------------------|--------------------------|
//! | GET    | `/api/students`     | list                     |
//! | GET    | `/api/students/:id` | get                      |
//! | POST   | `/api/students`     | create (201)             |
//! | PUT    | `/api/students/:id` | update                   |
//! | DELETE | `/api/students/:id` | delete                   |
//! | GET    | `/api/health`       | liveness and version     |

mod handlers;
mod middleware;
mod response;

use std::future::Future;
use std::sync::Arc;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::{Config, CorsConfig};
use crate::error::{Error, Result};
use crate::service::StudentService;
use crate::store::JsonFileStore;

pub use response::{ApiError, ApiResponse, ErrorBody};

/// Shared state handed to every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The collection service.
    pub service: StudentService,
    /// CORS policy.
    pub cors: Arc<CorsConfig>,
}

impl AppState {
    /// Create state from a service and CORS policy.
    #[must_use]
    pub fn new(service: StudentService, cors: CorsConfig) -> Self {
        Self {
            service,
            cors: Arc::new(cors),
        }
    }

    /// Open the configured document, write the initial document if needed, and
    /// build the service around it.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory or initial document cannot be
    /// created.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store =
            JsonFileStore::open(config.data_path(), config.storage.seed_on_missing).await?;
        store.initialize().await?;

        let service =
            StudentService::new(Arc::new(store)).with_validation(config.validation.enforce);
        Ok(Self::new(service, config.cors.clone()))
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/students",
            get(handlers::list_students).post(handlers::create_student),
        )
        .route(
            "/api/students/:id",
            get(handlers::get_student)
                .put(handlers::update_student)
                .delete(handlers::delete_student),
        )
        .fallback(handlers::route_not_found)
        .layer(from_fn_with_state(state.clone(), middleware::cors_middleware))
        .layer(from_fn(middleware::request_tracing_middleware))
        .with_state(state)
}

/// Serve the API on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Server running on http://{addr}");
    }

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(Error::Io)
}

/// Resolve when the process receives Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received, draining connections");
}
