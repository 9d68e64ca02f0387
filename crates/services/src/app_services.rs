use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::config::AppConfig;
use crate::error::AppServicesError;
use crate::sessions::ModuleSessionService;

/// Assembles app-facing services over a storage backend.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    module_sessions: Arc<ModuleSessionService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage, running migrations first.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(config: &AppConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        tracing::info!(db_url = %config.db_url, "storage ready");
        Ok(Self::from_storage(storage, clock))
    }

    /// Build services over in-memory storage.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: Storage, clock: Clock) -> Self {
        let module_sessions = Arc::new(ModuleSessionService::new(
            clock,
            Arc::clone(&storage.modules),
            Arc::clone(&storage.progress),
        ));
        Self {
            storage,
            module_sessions,
        }
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn module_sessions(&self) -> Arc<ModuleSessionService> {
        Arc::clone(&self.module_sessions)
    }
}
