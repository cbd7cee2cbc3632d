use std::sync::Arc;

use tracing::info;

use shared_config::{AppConfig, StoreBackend};

use crate::memory::InMemoryStore;
use crate::store::RecordStore;
use crate::supabase_store::SupabaseStore;

/// Shared state handed to every cell router.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn RecordStore>) -> Self {
        Self { config, store }
    }

    /// Builds the record store selected by `STORE_BACKEND`.
    pub fn from_config(config: AppConfig) -> Self {
        let store: Arc<dyn RecordStore> = match config.store_backend {
            StoreBackend::Memory => {
                info!("Using in-memory record store");
                Arc::new(InMemoryStore::new())
            }
            StoreBackend::Supabase => {
                info!("Using Supabase record store at {}", config.supabase_url);
                Arc::new(SupabaseStore::new(&config))
            }
        };

        Self::new(config, store)
    }
}
