//! crates/eventify_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Profile attributes collected at signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub firstname: String,
    pub lastname: String,
    pub age: i32,
    pub gender: String,
    pub state: String,
}

/// A persisted user account. `email` is unique across all accounts.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
}

// Only used when inserting - the id is assigned by storage
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub profile: Profile,
}

/// The account view that is safe to hand back to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicProfile {
    pub id: Uuid,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub age: i32,
    pub gender: String,
    pub state: String,
}

impl From<UserAccount> for PublicProfile {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id,
            email: account.email,
            firstname: account.profile.firstname,
            lastname: account.profile.lastname,
            age: account.profile.age,
            gender: account.profile.gender,
            state: account.profile.state,
        }
    }
}

/// Identity captured at login time. Later profile edits are not reflected
/// here until the user logs in again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user_id: Uuid,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
}

impl From<&UserAccount> for SessionSnapshot {
    fn from(account: &UserAccount) -> Self {
        Self {
            user_id: account.id,
            email: account.email.clone(),
            firstname: account.profile.firstname.clone(),
            lastname: account.profile.lastname.clone(),
        }
    }
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub snapshot: SessionSnapshot,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// A session is only valid strictly before its expiry instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A single entry in a user's ticket purchase history.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub event: String,
    pub date: String,
    pub location: String,
    pub ticket_type: String,
    pub quantity: u32,
    pub total_price: u32,
}
