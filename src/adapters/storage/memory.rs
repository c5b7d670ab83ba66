//! In-memory run log store for embedding and tests

use super::traits::RunLogStore;
use crate::core::state::RunLog;
use crate::domain::{Result, SyncError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Keeps run logs in a map; contents are lost with the store
#[derive(Debug, Default)]
pub struct MemoryRunLogStore {
    logs: Mutex<HashMap<String, RunLog>>,
}

impl MemoryRunLogStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the log stored under `name`
    pub fn get(&self, name: &str) -> Option<RunLog> {
        self.logs.lock().ok()?.get(name).cloned()
    }
}

#[async_trait]
impl RunLogStore for MemoryRunLogStore {
    async fn load(&self, name: &str) -> Result<Option<RunLog>> {
        let logs = self
            .logs
            .lock()
            .map_err(|_| SyncError::State("run log store lock poisoned".to_string()))?;
        Ok(logs.get(name).cloned())
    }

    async fn save(&self, name: &str, log: &RunLog) -> Result<()> {
        let mut logs = self
            .logs
            .lock()
            .map_err(|_| SyncError::State("run log store lock poisoned".to_string()))?;
        logs.insert(name.to_string(), log.clone());
        Ok(())
    }
}
