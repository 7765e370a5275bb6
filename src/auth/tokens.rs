//! Token storage

#[cfg(test)]
use std::sync::Mutex;

/// Synchronous access to the current credential pair.
///
/// A successful refresh replaces the access token and, when the portal
/// rotates it, the refresh token. The store keeps opaque strings only; token
/// expiry is discovered through 401 responses, not tracked here.
pub trait TokenStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    fn set_token(&self, token: String);
    fn set_refresh_token(&self, token: String);
    fn clear_all(&self);
}

#[cfg(test)]
#[derive(Debug, Default)]
struct Credentials {
    token: Option<String>,
    refresh_token: Option<String>,
}

/// In-memory token store, used as a test double for the file-backed store.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: Mutex<Credentials>,
}

#[cfg(test)]
impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a credential pair.
    pub fn with_tokens(token: &str, refresh_token: &str) -> Self {
        Self {
            inner: Mutex::new(Credentials {
                token: Some(token.to_string()),
                refresh_token: Some(refresh_token.to_string()),
            }),
        }
    }
}

#[cfg(test)]
impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.inner.lock().expect("token store lock").token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.inner
            .lock()
            .expect("token store lock")
            .refresh_token
            .clone()
    }

    fn set_token(&self, token: String) {
        self.inner.lock().expect("token store lock").token = Some(token);
    }

    fn set_refresh_token(&self, token: String) {
        self.inner.lock().expect("token store lock").refresh_token = Some(token);
    }

    fn clear_all(&self) {
        *self.inner.lock().expect("token store lock") = Credentials::default();
    }
}
