//! Shared state handed to every handler

use crate::core::auth::AuthProvider;
use crate::core::record::Record;
use crate::core::service::{DocumentStore, RecordStore};
use crate::entities::DashboardSettings;
use std::sync::Arc;

/// Application state
///
/// `store` is `None` when the persistence service failed to initialise.
/// The server still starts, and every data request answers
/// `STORE_UNAVAILABLE`.
#[derive(Clone)]
pub struct AppState {
    pub store: Option<Arc<dyn DocumentStore>>,
    pub auth: Arc<dyn AuthProvider>,
    pub dashboard: DashboardSettings,
}

impl AppState {
    /// Typed access to one collection
    pub fn records<R: Record>(&self) -> RecordStore<R> {
        RecordStore::from_option(self.store.clone())
    }
}
