//! Signed-in user session.

use std::collections::HashMap;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::DependencyError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub user: String,
}

pub trait SessionStore: Send + Sync {
    fn sign_in(&self, user: &str, password: &str) -> Result<Session, DependencyError>;

    fn current(&self) -> Option<Session>;

    /// End the current session, returning it.
    fn sign_out(&self) -> Option<Session>;
}

/// Checks credentials against a fixed account table.
pub struct MemorySessionStore {
    accounts: HashMap<String, String>,
    current: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new<U, P>(accounts: impl IntoIterator<Item = (U, P)>) -> Self
    where
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            accounts: accounts
                .into_iter()
                .map(|(user, password)| (user.into(), password.into()))
                .collect(),
            current: Mutex::new(None),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn sign_in(&self, user: &str, password: &str) -> Result<Session, DependencyError> {
        if self.accounts.get(user).map(String::as_str) != Some(password) {
            tracing::info!(user, "Sign-in rejected");
            return Err(DependencyError::Rejected {
                user: user.to_string(),
            });
        }
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user: user.to_string(),
        };
        tracing::info!(user, session = %session.id, "Signed in");
        *self.current.lock() = Some(session.clone());
        Ok(session)
    }

    fn current(&self) -> Option<Session> {
        self.current.lock().clone()
    }

    fn sign_out(&self) -> Option<Session> {
        let ended = self.current.lock().take();
        if let Some(session) = &ended {
            tracing::info!(user = %session.user, session = %session.id, "Signed out");
        }
        ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemorySessionStore {
        MemorySessionStore::new([("demo", "secret")])
    }

    #[test]
    fn sign_in_with_valid_credentials() {
        let store = store();
        let session = store.sign_in("demo", "secret").unwrap();
        assert_eq!(session.user, "demo");
        assert!(Uuid::parse_str(&session.id).is_ok());
        assert_eq!(store.current(), Some(session));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let store = store();
        let err = store.sign_in("demo", "nope").unwrap_err();
        assert_eq!(
            err,
            DependencyError::Rejected {
                user: "demo".into()
            }
        );
        assert!(store.current().is_none());
    }

    #[test]
    fn unknown_user_is_rejected() {
        assert!(store().sign_in("ghost", "secret").is_err());
    }

    #[test]
    fn sign_out_clears_session() {
        let store = store();
        store.sign_in("demo", "secret").unwrap();
        assert!(store.sign_out().is_some());
        assert!(store.current().is_none());
        assert!(store.sign_out().is_none());
    }

    #[test]
    fn sessions_get_fresh_ids() {
        let store = store();
        let first = store.sign_in("demo", "secret").unwrap();
        let second = store.sign_in("demo", "secret").unwrap();
        assert_ne!(first.id, second.id);
    }
}
