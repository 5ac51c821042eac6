//! Session storage.
//!
//! [`SessionStore`] is the only way the web layer reads or writes session
//! state. [`MemorySessionStore`] keeps sessions in process memory; a
//! distributed store can implement the same trait without touching callers.

use async_trait::async_trait;
use chrono::Duration;
use dashmap::DashMap;
use report_portal_core::Result;
use tracing::debug;

use crate::account::AuthenticatedAccount;
use crate::error::SessionStoreError;
use crate::session::{Session, SessionId};

/// Persistence for browser sessions.
///
/// Operations on different session IDs never contend with each other.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the session if it exists and has not expired. Has no side effects.
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError>;

    /// Attaches `account` to the session, creating the session if needed.
    ///
    /// Refreshes the last-access time. Calling this twice with the same
    /// account leaves the same observable state.
    async fn set_authenticated_account(
        &self,
        id: &SessionId,
        account: AuthenticatedAccount,
    ) -> Result<(), SessionStoreError>;

    /// Refreshes the last-access time of an existing session.
    async fn touch(&self, id: &SessionId) -> Result<(), SessionStoreError>;

    /// Removes all state for the session. Unknown IDs are not an error.
    async fn destroy(&self, id: &SessionId) -> Result<(), SessionStoreError>;

    /// Removes expired sessions, returning how many were removed.
    async fn purge_expired(&self) -> Result<u64, SessionStoreError>;
}

/// In-memory session store.
///
/// Sessions are sharded across a `DashMap`, so concurrent callbacks for the
/// same session serialize on that key's shard while other sessions proceed.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<SessionId, Session>,
    idle_timeout: Option<Duration>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    ///
    /// Sessions idle for longer than `idle_timeout` are treated as absent.
    /// With `None`, sessions live until destroyed.
    #[must_use]
    pub fn new(idle_timeout: Option<Duration>) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout,
        }
    }

    /// Returns the number of stored sessions, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true if no sessions are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn is_expired(&self, session: &Session) -> bool {
        self.idle_timeout
            .is_some_and(|timeout| session.is_idle_expired(timeout))
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError> {
        let session = self
            .sessions
            .get(id)
            .map(|entry| entry.value().clone())
            .filter(|session| !self.is_expired(session));
        Ok(session)
    }

    async fn set_authenticated_account(
        &self,
        id: &SessionId,
        account: AuthenticatedAccount,
    ) -> Result<(), SessionStoreError> {
        self.sessions
            .entry(id.clone())
            .and_modify(|session| session.set_account(account.clone()))
            .or_insert_with(|| Session::authenticated(id.clone(), account));
        Ok(())
    }

    async fn touch(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        if let Some(mut session) = self.sessions.get_mut(id) {
            session.touch();
        }
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        if self.sessions.remove(id).is_some() {
            debug!("session destroyed");
        }
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, SessionStoreError> {
        let Some(timeout) = self.idle_timeout else {
            return Ok(0);
        };

        let mut removed = 0u64;
        self.sessions.retain(|_, session| {
            let keep = !session.is_idle_expired(timeout);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
