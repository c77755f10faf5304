//! Durable roster cache
//!
//! A cache is a set of named slots, each holding one serialized blob. The
//! roster is stored in a single slot as a JSON array of registrants in
//! insertion order. Every write replaces the whole slot; implementations
//! must make that replacement atomic.

use std::sync::Arc;
use tracing::warn;

use crate::config::{CacheConfig, CacheType};
use crate::error::{AppError, AppResult};
use crate::models::Registrant;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

/// Slot name the roster is mirrored into
pub const DEFAULT_SLOT: &str = "users";

/// Named-slot blob storage
pub trait RosterCache: Send + Sync {
    /// Read a slot; `None` when it was never written
    fn read_slot(&self, slot: &str) -> AppResult<Option<String>>;

    /// Replace the slot content as a whole
    fn write_slot(&self, slot: &str, blob: &str) -> AppResult<()>;
}

/// Read a previously mirrored roster
///
/// Absent, unreadable and unparseable slots all mean "no cache".
pub fn read_roster(cache: &dyn RosterCache, slot: &str) -> Option<Vec<Registrant>> {
    let blob = match cache.read_slot(slot) {
        Ok(Some(blob)) => blob,
        Ok(None) => return None,
        Err(e) => {
            warn!(slot = %slot, error = %e, "roster cache unreadable");
            return None;
        }
    };

    match serde_json::from_str(&blob) {
        Ok(roster) => Some(roster),
        Err(e) => {
            warn!(slot = %slot, error = %e, "roster cache unparseable, ignoring it");
            None
        }
    }
}

/// Overwrite the slot with the full roster
pub fn write_roster(cache: &dyn RosterCache, slot: &str, roster: &[Registrant]) -> AppResult<()> {
    let blob = serde_json::to_string(roster)?;
    cache.write_slot(slot, &blob)
}

/// Factory for creating cache instances
pub struct CacheFactory;

impl CacheFactory {
    pub fn create(config: &CacheConfig) -> AppResult<Arc<dyn RosterCache>> {
        match config.cache_type {
            CacheType::Memory => Ok(Arc::new(MemoryCache::new())),
            CacheType::Sqlite => {
                let path = config.path.as_deref().ok_or_else(|| {
                    AppError::Configuration(
                        "cache.path is required when cache type is 'sqlite'".to_string(),
                    )
                })?;
                Ok(Arc::new(SqliteCache::open(path)?))
            }
        }
    }
}
