//! Per-session store of the most recent map upload.
//!
//! ## Eviction Strategy
//! - LRU eviction when the session limit is exceeded
//! - TTL-based expiration on read (lazy)

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Header carrying the caller's session id.
pub const SESSION_HEADER: &str = "x-session-id";

/// Session used when the header is absent.
pub const DEFAULT_SESSION: &str = "default";

/// One marker row of a map upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub lng: f64,
    pub lat: f64,
    pub concentration: f64,
    pub name: String,
}

struct StoredUpload {
    records: Arc<Vec<UploadRecord>>,
    stored_at: Instant,
}

/// Session id to latest parsed upload.
pub struct UploadStore {
    sessions: RwLock<LruCache<String, StoredUpload>>,
    ttl: Duration,
}

impl UploadStore {
    pub fn new(max_sessions: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_sessions).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: RwLock::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Replace the session's upload.
    pub async fn put(&self, session: &str, records: Vec<UploadRecord>) {
        let count = records.len();
        let entry = StoredUpload {
            records: Arc::new(records),
            stored_at: Instant::now(),
        };
        let mut sessions = self.sessions.write().await;
        if let Some((evicted, _)) = sessions.push(session.to_string(), entry) {
            if evicted != session {
                tracing::debug!(session = %evicted, "Evicted least recently used upload");
            }
        }
        tracing::debug!(session = %session, records = count, "Stored upload");
    }

    /// Latest live upload of the session.
    pub async fn get(&self, session: &str) -> Option<Vec<UploadRecord>> {
        let mut sessions = self.sessions.write().await;
        let expired = match sessions.get(session) {
            Some(entry) if entry.stored_at.elapsed() <= self.ttl => {
                return Some(entry.records.as_ref().clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            sessions.pop(session);
            tracing::debug!(session = %session, "Upload expired");
        }
        None
    }

    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
