//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::RecordStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The record store is the only shared
/// resource; services borrow it per request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn RecordStore>,
}

impl AppState {
    /// Create application state around a record store.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store }),
        }
    }

    /// Get a reference to the record store.
    #[must_use]
    pub fn store(&self) -> &dyn RecordStore {
        self.inner.store.as_ref()
    }
}
