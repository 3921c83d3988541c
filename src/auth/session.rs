//! In-memory session store keyed by opaque cookie tokens.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "frpc_session";

/// Fixed session lifetime.
pub const SESSION_TTL: Duration = Duration::from_secs(3600);

struct Session {
    username: String,
    expires_at: Instant,
}

/// Server-side session state. Tokens are UUIDv4; entries expire after
/// [`SESSION_TTL`] and are swept on every lookup.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for `username` and return its token.
    pub fn create(&self, username: &str) -> String {
        self.create_with_ttl(username, SESSION_TTL)
    }

    fn create_with_ttl(&self, username: &str, ttl: Duration) -> String {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.lock().expect("session store mutex poisoned");
        sessions.insert(
            token.clone(),
            Session {
                username: username.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        token
    }

    /// The username behind `token`, if the session exists and has not
    /// expired. Sweeps all expired entries as a side effect.
    pub fn username(&self, token: &str) -> Option<String> {
        let mut sessions = self.sessions.lock().expect("session store mutex poisoned");
        let now = Instant::now();
        sessions.retain(|_, session| session.expires_at > now);
        sessions.get(token).map(|session| session.username.clone())
    }

    /// Destroy the session behind `token`. Returns whether one existed.
    pub fn remove(&self, token: &str) -> bool {
        let mut sessions = self.sessions.lock().expect("session store mutex poisoned");
        sessions.remove(token).is_some()
    }

    /// Number of live sessions, for logging.
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .expect("session store mutex poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_then_lookup() {
        let store = SessionStore::new();
        let token = store.create("admin");
        assert_eq!(store.username(&token), Some("admin".to_string()));
        assert_eq!(store.username("no-such-token"), None);
    }

    #[test]
    fn test_remove_destroys_session() {
        let store = SessionStore::new();
        let token = store.create("admin");
        assert!(store.remove(&token));
        assert!(!store.remove(&token));
        assert_eq!(store.username(&token), None);
    }

    #[test]
    fn test_expired_sessions_swept_on_lookup() {
        let store = SessionStore::new();
        let expired = store.create_with_ttl("admin", Duration::from_millis(1));
        let live = store.create("admin");
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(store.username(&expired), None);
        // the dead entry is gone from the map, not just hidden
        assert_eq!(store.len(), 1);
        assert_eq!(store.username(&live), Some("admin".to_string()));
    }
}
