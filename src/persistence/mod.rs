// Local identity persistence
// A small key-value capability surviving process restarts, used to restore
// the identity without a backend round-trip.

pub mod file;
pub mod memory;

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::{Identity, PersistenceConfig};

/// Local store for the persisted identity record
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Previously persisted identity, if any
    async fn load(&self) -> Result<Option<Identity>, PersistenceError>;

    /// Persist the identity, replacing any previous record
    async fn save(&self, identity: &Identity) -> Result<(), PersistenceError>;

    /// Remove the persisted record
    async fn clear(&self) -> Result<(), PersistenceError>;
}

/// Persistence errors
#[derive(Debug, Clone)]
pub enum PersistenceError {
    Io(String),
    Serialization(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::Io(msg) => write!(f, "I/O error: {}", msg),
            PersistenceError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for PersistenceError {}

/// Create the configured identity store
pub fn create_identity_store(config: &PersistenceConfig) -> Arc<dyn IdentityStore> {
    match config {
        PersistenceConfig::File { path } => Arc::new(file::FileIdentityStore::new(path)),
        PersistenceConfig::Memory => Arc::new(memory::MemoryIdentityStore::new()),
    }
}
