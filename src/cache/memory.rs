use std::collections::HashMap;
use std::sync::Mutex;

use super::RosterCache;
use crate::error::{AppError, AppResult};

/// Process-local cache, lost on exit
#[derive(Default)]
pub struct MemoryCache {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RosterCache for MemoryCache {
    fn read_slot(&self, slot: &str) -> AppResult<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|e| AppError::Cache(e.to_string()))?;
        Ok(slots.get(slot).cloned())
    }

    fn write_slot(&self, slot: &str, blob: &str) -> AppResult<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|e| AppError::Cache(e.to_string()))?;
        slots.insert(slot.to_string(), blob.to_string());
        Ok(())
    }
}
