// --- File: crates/services/coursehub_backend/src/app_state.rs ---
use coursehub_config::AppConfig;
use coursehub_db::DbClient;
use std::sync::Arc;

/// State of the service-level routes (welcome, health).
///
/// Feature routers carry their own state; this one only needs the loaded
/// configuration and the database handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbClient,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, db: DbClient) -> Self {
        Self { config, db }
    }

    pub fn stripe_enabled(&self) -> bool {
        coursehub_common::is_stripe_enabled(&self.config)
    }
}
