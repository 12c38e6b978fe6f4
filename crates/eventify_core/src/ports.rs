//! crates/eventify_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or mailers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{AuthSession, NewAccount, Purchase, UserAccount};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, SMTP).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// A uniqueness constraint rejected the write.
    #[error("Duplicate key: {0}")]
    Duplicate(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Inserts a new account. Must fail with `PortError::Duplicate` when the
    /// email is already taken, atomically with respect to concurrent inserts.
    async fn create_account(&self, account: NewAccount) -> PortResult<UserAccount>;

    async fn find_by_email(&self, email: &str) -> PortResult<Option<UserAccount>>;

    async fn find_by_id(&self, user_id: Uuid) -> PortResult<Option<UserAccount>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, session: &AuthSession) -> PortResult<()>;

    async fn get_session(&self, session_id: &str) -> PortResult<Option<AuthSession>>;

    /// Removing an id that is not present is not an error.
    async fn delete_session(&self, session_id: &str) -> PortResult<()>;

    /// Drops every session whose expiry is at or before `now`, returning how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> PortResult<u64>;
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Delivers a plain-text message to a single recipient.
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> PortResult<()>;
}

#[async_trait]
pub trait PurchaseHistoryService: Send + Sync {
    async fn purchases_for(&self, user_id: Uuid) -> PortResult<Vec<Purchase>>;
}
