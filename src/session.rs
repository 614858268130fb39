// 🔐 Session Registry - one independent store per session
//
// Sessions never share a snapshot. The registry is capped; opening a session
// past the cap drops the one that was used least recently.

use crate::store::SessionStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

pub type SessionId = Uuid;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub store: SessionStore,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl From<&Session> for SessionInfo {
    fn from(session: &Session) -> Self {
        SessionInfo {
            id: session.id,
            created_at: session.created_at,
            last_seen: session.last_seen,
        }
    }
}

#[derive(Debug)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
    capacity: usize,
}

impl SessionRegistry {
    pub fn new(capacity: usize) -> Self {
        SessionRegistry {
            sessions: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Open a new session with a freshly initialized snapshot
    pub fn create(&mut self) -> SessionId {
        if self.sessions.len() >= self.capacity {
            self.evict_least_recent();
        }

        let now = Utc::now();
        let id = Uuid::new_v4();
        self.sessions.insert(
            id,
            Session {
                id,
                store: SessionStore::initialized(),
                created_at: now,
                last_seen: now,
            },
        );
        info!(session = %id, live = self.sessions.len(), "Session opened");
        id
    }

    /// Store for `id`, touching its last-seen time
    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut SessionStore> {
        let session = self.sessions.get_mut(id)?;
        session.last_seen = Utc::now();
        Some(&mut session.store)
    }

    pub fn get(&self, id: &SessionId) -> Option<&SessionStore> {
        self.sessions.get(id).map(|s| &s.store)
    }

    /// End a session, discarding its snapshot
    pub fn end(&mut self, id: &SessionId) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            info!(session = %id, "Session ended");
        }
        removed
    }

    /// Session summaries, oldest first
    pub fn list(&self) -> Vec<SessionInfo> {
        let mut infos: Vec<SessionInfo> = self.sessions.values().map(SessionInfo::from).collect();
        infos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        infos
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .sessions
            .values()
            .min_by_key(|s| s.last_seen)
            .map(|s| s.id);

        if let Some(id) = oldest {
            self.sessions.remove(&id);
            warn!(session = %id, capacity = self.capacity, "Session evicted at capacity");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_sessions_are_independent() {
        let mut registry = SessionRegistry::new(10);
        let a = registry.create();
        let b = registry.create();

        registry.get_mut(&a).unwrap().set_income(Decimal::from(100)).unwrap();
        registry
            .get_mut(&a)
            .unwrap()
            .register_category("Travel")
            .unwrap();

        let b_snapshot = registry.get(&b).unwrap().snapshot().unwrap();
        assert_eq!(b_snapshot.income, Decimal::from(5000));
        assert!(!b_snapshot.is_known_category("Travel"));
        assert_eq!(
            registry.get(&a).unwrap().snapshot().unwrap().income,
            Decimal::from(100)
        );
    }

    #[test]
    fn test_end_session() {
        let mut registry = SessionRegistry::new(10);
        let id = registry.create();

        assert!(registry.end(&id));
        assert!(!registry.end(&id));
        assert!(registry.get(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_capacity_evicts_least_recent() {
        let mut registry = SessionRegistry::new(2);
        let first = registry.create();
        let second = registry.create();

        // Touch the first so the second becomes the eviction candidate
        std::thread::sleep(std::time::Duration::from_millis(2));
        registry.get_mut(&first).unwrap();

        let third = registry.create();
        assert_eq!(registry.len(), 2);
        assert!(registry.get(&first).is_some());
        assert!(registry.get(&second).is_none());
        assert!(registry.get(&third).is_some());
    }

    #[test]
    fn test_list_sessions() {
        let mut registry = SessionRegistry::new(5);
        let id = registry.create();

        let list = registry.list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, id);
    }
}
