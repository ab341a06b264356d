//! In-memory owner sessions.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use digicare_card::error::CardResult;
use digicare_card::storage::SessionStorage;

/// Bearer session token to user id map. Expiry and refresh live with the
/// identity system that issues these tokens; this store only resolves them.
#[derive(Debug, Default)]
pub struct InMemorySessionStorage {
    sessions: DashMap<String, Uuid>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a live session.
    pub fn insert(&self, session_token: impl Into<String>, user_id: Uuid) {
        self.sessions.insert(session_token.into(), user_id);
    }

    /// Drops a session, ending it immediately.
    pub fn revoke(&self, session_token: &str) {
        self.sessions.remove(session_token);
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn resolve(&self, session_token: &str) -> CardResult<Option<Uuid>> {
        Ok(self.sessions.get(session_token).map(|e| *e.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_known_and_unknown_tokens() {
        let store = InMemorySessionStorage::new();
        let user_id = Uuid::new_v4();
        store.insert("sess_abc", user_id);

        assert_eq!(store.resolve("sess_abc").await.unwrap(), Some(user_id));
        assert_eq!(store.resolve("sess_xyz").await.unwrap(), None);

        store.revoke("sess_abc");
        assert_eq!(store.resolve("sess_abc").await.unwrap(), None);
    }
}
