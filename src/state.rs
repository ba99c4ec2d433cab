//! Shared application state.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{dao::entity_store::EntityStore, error::ServiceError, platform::PlatformRegistry};

/// Handle to the application state shared across request handlers.
pub type SharedState = Arc<AppState>;

/// Central application state storing the store handle and platform registry.
///
/// The store slot is empty while the backend is unreachable; the application
/// then runs in degraded mode and data routes answer with a storage error.
pub struct AppState {
    entity_store: RwLock<Option<Arc<dyn EntityStore>>>,
    platforms: PlatformRegistry,
    sync_gates: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(platforms: PlatformRegistry) -> SharedState {
        Arc::new(Self {
            entity_store: RwLock::new(None),
            platforms,
            sync_gates: DashMap::new(),
        })
    }

    /// Obtain a handle to the current entity store, if one is installed.
    pub async fn entity_store(&self) -> Option<Arc<dyn EntityStore>> {
        let guard = self.entity_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the current entity store or fail with a degraded-mode error.
    pub async fn require_entity_store(&self) -> Result<Arc<dyn EntityStore>, ServiceError> {
        self.entity_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new entity store implementation and leave degraded mode.
    pub async fn install_entity_store(&self, store: Arc<dyn EntityStore>) {
        let mut guard = self.entity_store.write().await;
        *guard = Some(store);
    }

    /// Remove the current entity store and enter degraded mode.
    pub async fn clear_entity_store(&self) {
        let mut guard = self.entity_store.write().await;
        guard.take();
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.entity_store.read().await;
        guard.is_none()
    }

    /// Registered platform processors.
    pub fn platforms(&self) -> &PlatformRegistry {
        &self.platforms
    }

    /// Per-user gate serializing concurrent sync requests for the same user.
    pub fn sync_gate(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        self.sync_gates
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
