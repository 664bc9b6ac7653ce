//! Short-lived cache of status replies
//!
//! Entries are keyed by `(host, kind)`. The parameters of a command are not
//! part of the key, which is only sound because cached kinds are
//! parameterless status queries. The cache itself is not synchronized; the
//! client keeps it behind its device lock.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::command::CommandKind;
use crate::response::Response;

/// Default freshness window
pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
struct CacheEntry {
    captured: Instant,
    /// Serialized reply; callers always receive their own decoded copy
    body: String,
}

/// Per-host, per-kind store of recent status replies
#[derive(Debug)]
pub struct CommandCache {
    ttl: Duration,
    entries: HashMap<(String, CommandKind), CacheEntry>,
}

impl CommandCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh reply for `(host, kind)`, evicting it if it has gone stale
    pub fn get(&mut self, host: &str, kind: CommandKind) -> Option<Response> {
        let key = (host.to_string(), kind);
        let entry = self.entries.get(&key)?;

        if entry.captured.elapsed() >= self.ttl {
            self.entries.remove(&key);
            return None;
        }

        match serde_json::from_str(&entry.body) {
            Ok(response) => Some(response),
            Err(_) => {
                self.entries.remove(&key);
                None
            }
        }
    }

    /// Store (or overwrite) the reply for `(host, kind)`
    pub fn put(&mut self, host: &str, kind: CommandKind, response: &Response) {
        if !kind.is_cacheable() {
            return;
        }
        let Ok(body) = serde_json::to_string(response) else {
            return;
        };
        self.entries.insert(
            (host.to_string(), kind),
            CacheEntry {
                captured: Instant::now(),
                body,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for CommandCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
