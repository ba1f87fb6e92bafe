//! Server Implementation
//!
//! HTTP server startup, background tasks and graceful shutdown.

use std::time::Duration;

use tracing::info;

use crate::api;
use crate::core::{AppState, Config};
use crate::utils::{AppError, AppResult};

/// Hourly sweep of the processed-session marker map
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);
/// Periodic reservation expiry sweep; the maintenance endpoint can
/// trigger one on demand as well
const REAPER_INTERVAL: Duration = Duration::from_secs(10 * 60);

pub struct Server {
    config: Config,
    state: Option<AppState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (tests inject the in-memory db)
    pub fn with_state(config: Config, state: AppState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> AppResult<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => AppState::initialize(self.config.clone()).await?,
        };

        state
            .sessions
            .clone()
            .spawn_sweeper(SESSION_SWEEP_INTERVAL);
        state.reaper.clone().spawn_periodic(REAPER_INTERVAL);

        let app = api::build_app().with_state(state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        info!("storefront server listening on {addr}");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Internal(format!("failed to bind {addr}: {e}")))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutting down");
            })
            .await
            .map_err(|e| AppError::Internal(format!("server error: {e}")))?;

        Ok(())
    }
}
