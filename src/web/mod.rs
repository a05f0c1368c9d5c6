//! HTTP front door: a single-process axum server over the query gateway.
//!
//! One gateway instance is created lazily on first need and reused for the
//! process lifetime. The mutex around it also serializes queries, so
//! requests are handled strictly one at a time.

pub mod handlers;
pub mod types;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::sync::{Mutex, MutexGuard};
use tower_http::trace::TraceLayer;

use crate::config::{Config, HttpConfig, LlmConfig};
use crate::db::Store;
use crate::error::{ChannelError, GatewayError};
use crate::gateway::QueryGateway;
use crate::llm::SqlChatAgent;

/// Shared state behind the routing table.
pub struct GatewayState {
    llm: LlmConfig,
    db_path: PathBuf,
    gateway: Mutex<Option<QueryGateway>>,
}

impl GatewayState {
    pub fn new(llm: LlmConfig, db_path: PathBuf) -> Self {
        Self {
            llm,
            db_path,
            gateway: Mutex::new(None),
        }
    }

    /// A state whose gateway is already constructed (tests).
    pub fn preloaded(llm: LlmConfig, db_path: PathBuf, gateway: QueryGateway) -> Self {
        Self {
            llm,
            db_path,
            gateway: Mutex::new(Some(gateway)),
        }
    }

    /// Lock the shared gateway, constructing it on first use.
    pub(crate) async fn lock_gateway(
        &self,
    ) -> Result<tokio::sync::MappedMutexGuard<'_, QueryGateway>, GatewayError> {
        let mut guard = self.gateway.lock().await;
        if guard.is_none() {
            let store = Arc::new(Store::open(&self.db_path).await?);
            let schema = store.table_info().await?;
            let agent = Arc::new(SqlChatAgent::new(self.llm.clone(), store)?);
            *guard = Some(QueryGateway::new(agent, schema));
            tracing::info!(model = %self.llm.model, "query gateway initialized");
        }
        Ok(MutexGuard::map(guard, |g| {
            g.as_mut().expect("initialized above")
        }))
    }
}

/// The routing table: every served (method, path) pair in one place.
pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/", get(handlers::index_handler))
        .route(
            "/api/query",
            get(handlers::query_get_handler).post(handlers::query_post_handler),
        )
        .route("/api/clear-memory", post(handlers::clear_memory_handler))
        .route("/api/info", get(handlers::info_handler))
        .route("/api/samples", get(handlers::samples_handler))
        .route("/api/analytics", get(handlers::analytics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The web channel: owns the bind address and the shared state.
pub struct WebChannel {
    config: HttpConfig,
    state: Arc<GatewayState>,
}

impl WebChannel {
    pub fn new(config: Config) -> Self {
        Self {
            state: Arc::new(GatewayState::new(config.llm, config.database.path)),
            config: config.http,
        }
    }

    /// Bind and serve until the process is stopped.
    pub async fn serve(self) -> Result<(), ChannelError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| ChannelError::StartupFailed {
                reason: format!(
                    "invalid address '{}:{}': {e}",
                    self.config.host, self.config.port
                ),
            })?;

        let listener =
            tokio::net::TcpListener::bind(addr)
                .await
                .map_err(|e| ChannelError::StartupFailed {
                    reason: format!("failed to bind to {addr}: {e}"),
                })?;

        tracing::info!("web channel listening on http://{addr}");

        axum::serve(listener, router(self.state))
            .await
            .map_err(|e| ChannelError::StartupFailed {
                reason: e.to_string(),
            })
    }
}
