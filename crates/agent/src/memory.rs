//! Per-session conversation memory with a TTL.
//!
//! Entries expire lazily on access and can be reaped in bulk by a periodic
//! sweep, so the store is a bounded cache rather than a map that grows for
//! the life of the process.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use wardstock_core::domain::session::{ConversationMemory, SessionKey};

pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<SessionKey, ConversationMemory>>,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs as i64),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn is_expired(&self, memory: &ConversationMemory, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(memory.last_updated) > self.ttl
    }

    /// Returns the session's memory, or a fresh one if the session is new or
    /// its entry has outlived the TTL. An expired entry is dropped here
    /// rather than waiting for the next sweep.
    pub async fn load(&self, key: &SessionKey, now: DateTime<Utc>) -> ConversationMemory {
        {
            let sessions = self.sessions.read().await;
            if let Some(memory) = sessions.get(key) {
                if !self.is_expired(memory, now) {
                    return memory.clone();
                }
            } else {
                return ConversationMemory::new(now);
            }
        }

        let mut sessions = self.sessions.write().await;
        if let Some(memory) = sessions.get(key) {
            if self.is_expired(memory, now) {
                sessions.remove(key);
            } else {
                return memory.clone();
            }
        }
        ConversationMemory::new(now)
    }

    pub async fn store(&self, key: SessionKey, memory: ConversationMemory) {
        self.sessions.write().await.insert(key, memory);
    }

    /// Removes every expired entry. Returns how many were reaped.
    pub async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, memory| !self.is_expired(memory, now));
        before - sessions.len()
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use wardstock_core::domain::session::{ConversationContext, ConversationMemory, SessionKey};

    use super::SessionStore;

    fn key(session: &str) -> SessionKey {
        SessionKey::new("nurse-7", session)
    }

    #[tokio::test]
    async fn round_trips_memory_within_the_ttl() {
        let store = SessionStore::new(1800);
        let now = Utc::now();

        let mut memory = ConversationMemory::new(now);
        memory.context = ConversationContext::InterTransfer;
        store.store(key("s1"), memory).await;

        let loaded = store.load(&key("s1"), now).await;
        assert_eq!(loaded.context, ConversationContext::InterTransfer);
    }

    #[tokio::test]
    async fn expired_entries_read_back_as_fresh() {
        let store = SessionStore::new(1800);
        let now = Utc::now();

        let mut memory = ConversationMemory::new(now - Duration::seconds(3600));
        memory.context = ConversationContext::PurchaseApproval;
        store.store(key("s1"), memory).await;

        let loaded = store.load(&key("s1"), now).await;
        assert_eq!(loaded.context, ConversationContext::GeneralAssistance);
        assert!(loaded.pending_suggestions.is_empty());
        assert_eq!(store.active_sessions().await, 0, "lazy expiry drops the entry");
    }

    #[tokio::test]
    async fn sweep_reaps_only_expired_sessions() {
        let store = SessionStore::new(1800);
        let now = Utc::now();

        store.store(key("stale"), ConversationMemory::new(now - Duration::seconds(7200))).await;
        store.store(key("live"), ConversationMemory::new(now)).await;

        let reaped = store.sweep(now).await;
        assert_eq!(reaped, 1);
        assert_eq!(store.active_sessions().await, 1);
    }

    #[tokio::test]
    async fn sessions_are_isolated_by_key() {
        let store = SessionStore::new(1800);
        let now = Utc::now();

        let mut memory = ConversationMemory::new(now);
        memory.note_entity("medical supplies");
        store.store(key("s1"), memory).await;

        let other = store.load(&key("s2"), now).await;
        assert!(other.entities_mentioned.is_empty());
    }
}
