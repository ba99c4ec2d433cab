//! Platform processors: per-platform reconciliation of remote game and
//! achievement state into the entity store.

pub mod steam;

use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{entity_store::EntityStore, storage::StorageError},
    platform::steam::{SteamProcessor, api::{HttpSteamApi, RemoteError}},
};

/// Credentials for one user-platform pair, resolved by the orchestrator.
#[derive(Debug, Clone)]
pub struct LinkContext {
    /// Local user the pass reconciles for.
    pub user_id: Uuid,
    /// The user's identifier on the external platform (e.g. Steam ID).
    pub account_id: String,
    /// API token used to query the platform.
    pub token: String,
}

/// Failure of a single platform reconciliation pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The platform API answered non-2xx or timed out. Aborts this platform's
    /// pass only; other platforms still run.
    #[error("platform api unavailable: {0}")]
    Remote(#[from] RemoteError),
    /// The entity store rejected a write.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// An internal consistency assumption was broken. Indicates corrupted
    /// state rather than an expected runtime condition.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

/// One reconciliation capability per external platform.
///
/// A processor performs a full best-effort pass for one user-platform pair:
/// it fetches remote state and upserts it into the store. All effects go
/// through store writes; the return value only signals success or abort.
pub trait PlatformProcessor: Send + Sync {
    /// Canonical lowercase platform name used for registry lookups.
    fn platform(&self) -> &'static str;

    /// Run one reconciliation pass.
    fn process(
        &self,
        store: Arc<dyn EntityStore>,
        ctx: LinkContext,
    ) -> BoxFuture<'_, Result<(), SyncError>>;
}

/// Registry mapping platform names to their processor, built once at startup.
///
/// Adding a platform means adding a [`PlatformProcessor`] implementation and
/// one [`PlatformRegistry::register`] call; nothing else changes.
#[derive(Default)]
pub struct PlatformRegistry {
    processors: HashMap<&'static str, Arc<dyn PlatformProcessor>>,
}

impl PlatformRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry with every built-in platform.
    pub fn builtin(config: &AppConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SteamProcessor::new(Arc::new(HttpSteamApi::new(
            config.steam.clone(),
        )))));
        registry
    }

    /// Add a processor under its canonical platform name.
    pub fn register(&mut self, processor: Arc<dyn PlatformProcessor>) {
        self.processors.insert(processor.platform(), processor);
    }

    /// Look up the processor for a platform name.
    pub fn get(&self, platform: &str) -> Option<&Arc<dyn PlatformProcessor>> {
        self.processors.get(platform)
    }

    /// Whether a platform name is recognized.
    pub fn contains(&self, platform: &str) -> bool {
        self.processors.contains_key(platform)
    }
}
