// In-memory identity store

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::models::Identity;

use super::{IdentityStore, PersistenceError};

/// Identity store without durability; the record dies with the process.
///
/// `set_failing` makes every operation return an I/O error, for exercising
/// the manager's persistence-failure paths.
pub struct MemoryIdentityStore {
    record: RwLock<Option<Identity>>,
    failing: AtomicBool,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self {
            record: RwLock::new(None),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(PersistenceError::Io("store unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn load(&self) -> Result<Option<Identity>, PersistenceError> {
        self.check()?;
        Ok(self.record.read().await.clone())
    }

    async fn save(&self, identity: &Identity) -> Result<(), PersistenceError> {
        self.check()?;
        *self.record.write().await = Some(identity.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        self.check()?;
        *self.record.write().await = None;
        Ok(())
    }
}
