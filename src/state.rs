use std::sync::Arc;

use sqlx::MySqlPool;

use crate::store::memory::MemoryStore;
use crate::store::mysql::MySqlStore;
use crate::store::{MenuAccessStore, PayrollInputSource, PayrollStore};

/// Stores shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub menu_access: Arc<dyn MenuAccessStore>,
    pub payroll: Arc<dyn PayrollStore>,
    pub payroll_inputs: Arc<dyn PayrollInputSource>,
}

impl AppState {
    pub fn mysql(pool: MySqlPool) -> Self {
        let store = Arc::new(MySqlStore::new(pool));
        Self {
            menu_access: store.clone(),
            payroll: store.clone(),
            payroll_inputs: store,
        }
    }

    pub fn in_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            menu_access: store.clone(),
            payroll: store.clone(),
            payroll_inputs: store,
        }
    }
}
