use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use super::{SourceError, Table, TableSource};

/// Memoizes loads per identifier for `ttl`. Failed loads are not cached.
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, Arc<Table>)>>,
}

impl<S: TableSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn invalidate(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<S: TableSource> TableSource for CachedSource<S> {
    fn load(&self, identifier: &str) -> Result<Arc<Table>, SourceError> {
        let now = Instant::now();
        {
            let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some((loaded_at, table)) = entries.get(identifier) {
                if now.duration_since(*loaded_at) < self.ttl {
                    debug!(identifier, "source cache hit");
                    return Ok(Arc::clone(table));
                }
            }
        }

        debug!(identifier, "source cache miss");
        let table = self.inner.load(identifier)?;
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identifier.to_string(), (now, Arc::clone(&table)));
        Ok(table)
    }
}
