use std::sync::Arc;

use timetable_core::manager::ScheduleManager;
use timetable_core::schedule_request::RequestWorkflow;
use timetable_db::PgStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: timetable_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Schedule assignment engine. Shared so its write locks are process-wide.
    pub schedules: Arc<ScheduleManager<PgStore>>,
    /// Room-booking request workflow.
    pub requests: Arc<RequestWorkflow<PgStore>>,
}

impl AppState {
    pub fn new(pool: timetable_db::DbPool, config: ServerConfig) -> Self {
        let store = PgStore::new(pool.clone());
        Self {
            pool,
            config: Arc::new(config),
            schedules: Arc::new(ScheduleManager::new(store.clone())),
            requests: Arc::new(RequestWorkflow::new(store)),
        }
    }
}
