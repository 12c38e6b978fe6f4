//! crates/eventify_core/src/memory.rs
//!
//! In-process implementations of the storage ports. They back the test suites
//! and the `memory` storage backend used for local development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{AuthSession, NewAccount, UserAccount};
use crate::ports::{AccountRepository, PortError, PortResult, SessionStore};

fn poisoned() -> PortError {
    PortError::Unexpected("in-memory store lock poisoned".to_string())
}

//=========================================================================================
// Accounts
//=========================================================================================

/// Accounts keyed by id, with a case-sensitive email index like the SQL unique index.
#[derive(Default)]
pub struct MemoryAccountRepository {
    accounts: Mutex<HashMap<Uuid, UserAccount>>,
    calls: AtomicUsize,
}

impl MemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of repository calls made so far, successful or not.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Removes an account outright, as an operator deleting the row would.
    pub fn remove(&self, user_id: Uuid) -> bool {
        self.accounts
            .lock()
            .map(|mut accounts| accounts.remove(&user_id).is_some())
            .unwrap_or(false)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn create_account(&self, account: NewAccount) -> PortResult<UserAccount> {
        self.record_call();
        let mut accounts = self.accounts.lock().map_err(|_| poisoned())?;

        // The check and the insert happen under one lock, so concurrent
        // signups for the same email cannot both succeed.
        if accounts.values().any(|a| a.email == account.email) {
            return Err(PortError::Duplicate(format!(
                "email {} already exists",
                account.email
            )));
        }

        let created = UserAccount {
            id: Uuid::new_v4(),
            email: account.email,
            password_hash: account.password_hash,
            profile: account.profile,
            created_at: Utc::now(),
        };
        accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> PortResult<Option<UserAccount>> {
        self.record_call();
        let accounts = self.accounts.lock().map_err(|_| poisoned())?;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: Uuid) -> PortResult<Option<UserAccount>> {
        self.record_call();
        let accounts = self.accounts.lock().map_err(|_| poisoned())?;
        Ok(accounts.get(&user_id).cloned())
    }
}

//=========================================================================================
// Sessions
//=========================================================================================

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, AuthSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert_session(&self, session: &AuthSession) -> PortResult<()> {
        let mut sessions = self.sessions.lock().map_err(|_| poisoned())?;
        if sessions.contains_key(&session.id) {
            return Err(PortError::Duplicate(format!("session {}", session.id)));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn get_session(&self, session_id: &str) -> PortResult<Option<AuthSession>> {
        let sessions = self.sessions.lock().map_err(|_| poisoned())?;
        Ok(sessions.get(session_id).cloned())
    }

    async fn delete_session(&self, session_id: &str) -> PortResult<()> {
        let mut sessions = self.sessions.lock().map_err(|_| poisoned())?;
        sessions.remove(session_id);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> PortResult<u64> {
        let mut sessions = self.sessions.lock().map_err(|_| poisoned())?;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        Ok((before - sessions.len()) as u64)
    }
}
