use crate::capabilities::SessionState;
use list_sync_config::CredentialStore;

/// Session state backed by the stored credentials.
///
/// A service counts as connected when a non-empty access token is stored for it.
pub struct CredentialSession {
    store: CredentialStore,
}

impl CredentialSession {
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }
}

impl SessionState for CredentialSession {
    fn is_connected_to(&self, service: &str) -> bool {
        self.store.has_access_token(service)
    }
}
