//! Application State
//!
//! Shared handles for every request handler: configuration, the embedded
//! database and the domain services built over it.

use std::sync::Arc;

use crate::auth::JwtService;
use crate::cart::{ExpiryReaper, ReservationStore};
use crate::checkout::OrderCommitter;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{OrderRepository, ProductRepository};
use crate::payment::{PaymentProcessor, ProcessedSessions};
use crate::utils::AppResult;

/// Session markers are only needed for the replay race window; keep them
/// for an hour and sweep.
const SESSION_MARKER_RETENTION_HOURS: i64 = 1;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: DbService,
    pub jwt: Arc<JwtService>,
    pub products: ProductRepository,
    pub orders: OrderRepository,
    pub store: ReservationStore,
    pub committer: OrderCommitter,
    pub processor: PaymentProcessor,
    pub reaper: ExpiryReaper,
    pub sessions: ProcessedSessions,
}

impl AppState {
    /// Open the on-disk database and build all services
    pub async fn initialize(config: Config) -> AppResult<Self> {
        let db = DbService::new(&config.db_path()).await?;
        Ok(Self::with_db(config, db))
    }

    /// Build services over an existing database handle (tests use the
    /// in-memory engine here)
    pub fn with_db(config: Config, db: DbService) -> Self {
        let policy = config.retry_policy();
        let handle = db.db.clone();

        let orders = OrderRepository::new(handle.clone());
        let committer = OrderCommitter::new(handle.clone(), policy.clone(), config.shipping_cost);
        let sessions =
            ProcessedSessions::new(chrono::Duration::hours(SESSION_MARKER_RETENTION_HOURS));

        Self {
            jwt: Arc::new(JwtService::new(config.jwt.clone())),
            products: ProductRepository::new(handle.clone()),
            orders: orders.clone(),
            store: ReservationStore::new(handle.clone(), policy.clone()),
            processor: PaymentProcessor::new(orders, committer.clone(), sessions.clone()),
            reaper: ExpiryReaper::new(&db, policy, config.reservation_ttl()),
            sessions,
            committer,
            config: Arc::new(config),
            db,
        }
    }
}
