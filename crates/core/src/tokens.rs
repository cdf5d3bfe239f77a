use std::sync::Arc;

use chatbot_storage::{KeyValueStore, StorageResult};
use chatbot_transport::SessionToken;

/// Local storage key holding the backend session token.
pub const SESSION_TOKEN_KEY: &str = "session_id";

/// Reads and writes the session token in local storage.
#[derive(Clone)]
pub struct SessionTokenStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionTokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> StorageResult<Option<SessionToken>> {
        Ok(self
            .store
            .get(SESSION_TOKEN_KEY)?
            .and_then(SessionToken::new))
    }

    pub fn save(&self, token: &SessionToken) -> StorageResult<()> {
        self.store.set(SESSION_TOKEN_KEY, token.as_str())
    }
}

impl std::fmt::Debug for SessionTokenStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("SessionTokenStore").finish_non_exhaustive()
    }
}
