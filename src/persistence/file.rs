// JSON-file identity store

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use crate::models::Identity;

use super::{IdentityStore, PersistenceError};

/// Persists the identity as a single JSON record on disk
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl IdentityStore for FileIdentityStore {
    async fn load(&self) -> Result<Option<Identity>, PersistenceError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistenceError::Io(e.to_string())),
        };

        let identity: Identity = serde_json::from_str(&contents)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;

        debug!("restored persisted identity {}", identity.id);
        Ok(Some(identity))
    }

    async fn save(&self, identity: &Identity) -> Result<(), PersistenceError> {
        let contents = serde_json::to_string_pretty(identity)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| PersistenceError::Io(e.to_string()))?;
            }
        }

        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| PersistenceError::Io(e.to_string()))?;

        debug!("persisted identity {}", identity.id);
        Ok(())
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistenceError::Io(e.to_string())),
        }
    }
}
