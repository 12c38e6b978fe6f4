//! crates/eventify_core/src/sessions.rs
//!
//! Server-side login sessions. A session moves from absent to active to
//! expired or destroyed, and never back.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::domain::{AuthSession, SessionSnapshot};
use crate::error::{AuthError, AuthResult};
use crate::ports::SessionStore;

pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// A manager with the standard 24 hour lifetime.
    pub fn with_default_ttl(store: Arc<dyn SessionStore>) -> Self {
        Self::new(store, Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Creates a session holding `snapshot` and returns it. The caller is
    /// responsible for handing `id` to the client as a cookie.
    pub async fn establish(&self, snapshot: SessionSnapshot) -> AuthResult<AuthSession> {
        let now = Utc::now();
        let session = AuthSession {
            id: Uuid::new_v4().to_string(),
            snapshot,
            created_at: now,
            expires_at: now + self.ttl,
        };

        self.store.insert_session(&session).await.map_err(|e| {
            error!("Failed to create auth session: {}", e);
            AuthError::Internal(e.to_string())
        })?;

        info!(user_id = %session.snapshot.user_id, "Session established");
        Ok(session)
    }

    /// Resolves the cookie's session id to the snapshot taken at login.
    pub async fn require_session(&self, session_id: Option<&str>) -> AuthResult<SessionSnapshot> {
        let session_id = session_id
            .filter(|id| !id.is_empty())
            .ok_or(AuthError::Unauthorized)?;

        let session = self
            .store
            .get_session(session_id)
            .await
            .map_err(|e| {
                error!("Failed to read auth session: {}", e);
                AuthError::Internal(e.to_string())
            })?
            .ok_or(AuthError::Unauthorized)?;

        if session.is_expired(Utc::now()) {
            debug!(user_id = %session.snapshot.user_id, "Session expired");
            if let Err(e) = self.store.delete_session(session_id).await {
                error!("Failed to drop expired session: {}", e);
            }
            return Err(AuthError::Unauthorized);
        }

        Ok(session.snapshot)
    }

    /// Removes the session. A missing cookie or an unknown id is still a success.
    pub async fn destroy(&self, session_id: Option<&str>) -> AuthResult<()> {
        let Some(session_id) = session_id.filter(|id| !id.is_empty()) else {
            return Ok(());
        };

        self.store.delete_session(session_id).await.map_err(|e| {
            error!("Failed to delete auth session: {}", e);
            AuthError::Internal(e.to_string())
        })
    }

    /// Deletes every expired session from the store.
    pub async fn purge_expired(&self) -> AuthResult<u64> {
        let removed = self.store.purge_expired(Utc::now()).await?;
        if removed > 0 {
            info!(removed, "Purged expired sessions");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySessionStore;
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use chrono::DateTime;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            user_id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            firstname: "Ada".to_string(),
            lastname: "Lovelace".to_string(),
        }
    }

    fn manager(ttl: Duration) -> (SessionManager, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        (SessionManager::new(store.clone(), ttl), store)
    }

    #[tokio::test]
    async fn established_session_resolves_to_its_snapshot() {
        let (sessions, _) = manager(Duration::hours(DEFAULT_SESSION_TTL_HOURS));
        let snap = snapshot();
        let session = sessions.establish(snap.clone()).await.unwrap();

        assert_eq!(session.expires_at - session.created_at, Duration::hours(24));
        let found = sessions.require_session(Some(&session.id)).await.unwrap();
        assert_eq!(found, snap);
    }

    #[tokio::test]
    async fn each_login_gets_a_distinct_id() {
        let (sessions, store) = manager(Duration::hours(DEFAULT_SESSION_TTL_HOURS));
        let a = sessions.establish(snapshot()).await.unwrap();
        let b = sessions.establish(snapshot()).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn missing_or_unknown_id_is_unauthorized() {
        let (sessions, _) = manager(Duration::hours(DEFAULT_SESSION_TTL_HOURS));
        assert!(matches!(
            sessions.require_session(None).await,
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            sessions.require_session(Some("")).await,
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            sessions.require_session(Some("never-issued")).await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn expired_session_is_rejected_and_removed() {
        let (sessions, store) = manager(Duration::zero());
        let session = sessions.establish(snapshot()).await.unwrap();

        assert!(matches!(
            sessions.require_session(Some(&session.id)).await,
            Err(AuthError::Unauthorized)
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn destroyed_session_stays_gone() {
        let (sessions, _) = manager(Duration::hours(DEFAULT_SESSION_TTL_HOURS));
        let session = sessions.establish(snapshot()).await.unwrap();

        sessions.destroy(Some(&session.id)).await.unwrap();
        assert!(matches!(
            sessions.require_session(Some(&session.id)).await,
            Err(AuthError::Unauthorized)
        ));
        // A second logout is still fine.
        sessions.destroy(Some(&session.id)).await.unwrap();
    }

    #[tokio::test]
    async fn destroy_without_a_session_succeeds() {
        let (sessions, _) = manager(Duration::hours(DEFAULT_SESSION_TTL_HOURS));
        sessions.destroy(None).await.unwrap();
        sessions.destroy(Some("never-issued")).await.unwrap();
    }

    #[tokio::test]
    async fn purge_removes_expired_sessions() {
        let (short, store) = manager(Duration::zero());
        short.establish(snapshot()).await.unwrap();
        short.establish(snapshot()).await.unwrap();

        let long = SessionManager::with_default_ttl(store.clone());
        long.establish(snapshot()).await.unwrap();

        assert_eq!(long.purge_expired().await.unwrap(), 2);
        assert_eq!(store.len(), 1);
    }

    struct BrokenStore;

    #[async_trait]
    impl SessionStore for BrokenStore {
        async fn insert_session(&self, _: &AuthSession) -> PortResult<()> {
            Err(PortError::Unexpected("connection refused".to_string()))
        }
        async fn get_session(&self, _: &str) -> PortResult<Option<AuthSession>> {
            Err(PortError::Unexpected("connection refused".to_string()))
        }
        async fn delete_session(&self, _: &str) -> PortResult<()> {
            Err(PortError::Unexpected("connection refused".to_string()))
        }
        async fn purge_expired(&self, _: DateTime<Utc>) -> PortResult<u64> {
            Err(PortError::Unexpected("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn store_failures_surface_as_internal() {
        let sessions = SessionManager::with_default_ttl(Arc::new(BrokenStore));
        assert!(matches!(
            sessions.establish(snapshot()).await,
            Err(AuthError::Internal(_))
        ));
        assert!(matches!(
            sessions.require_session(Some("abc")).await,
            Err(AuthError::Internal(_))
        ));
        assert!(matches!(
            sessions.destroy(Some("abc")).await,
            Err(AuthError::Internal(_))
        ));
    }
}
