// Session state and subscriber registry types

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::Identity;

/// Process-wide session state, owned exclusively by the session manager
#[derive(Debug, Default)]
pub struct SessionState {
    /// The authenticated identity, if any
    pub current_identity: Option<Identity>,
    /// True only while an identity-mutating operation is in flight
    pub is_loading: bool,
    /// The single phone number awaiting a one-time code
    pub pending_phone_verification: Option<String>,
}

/// Read-only view of the session state
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub is_loading: bool,
    pub pending_phone_verification: Option<String>,
}

/// Callback invoked with the new identity (or absence) on every change
pub type SubscriberCallback = Arc<dyn Fn(Option<Identity>) + Send + Sync>;

/// Opaque registration handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberHandle(u64);

/// Registry of state-change subscribers, keyed by handle
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: HashMap<u64, SubscriberCallback>,
    next_handle: u64,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, callback: SubscriberCallback) -> SubscriberHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.subscribers.insert(handle, callback);
        SubscriberHandle(handle)
    }

    pub fn remove(&mut self, handle: SubscriberHandle) -> bool {
        self.subscribers.remove(&handle.0).is_some()
    }

    /// Callbacks to invoke; cloned out so delivery happens outside any lock
    pub fn callbacks(&self) -> Vec<SubscriberCallback> {
        self.subscribers.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
