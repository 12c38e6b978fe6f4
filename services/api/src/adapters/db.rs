//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `AccountRepository` and `SessionStore` ports from the `core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eventify_core::domain::{AuthSession, NewAccount, Profile, SessionSnapshot, UserAccount};
use eventify_core::ports::{AccountRepository, PortError, PortResult, SessionStore};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the storage ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Unique-constraint violations become `Duplicate`; everything else is unexpected.
fn map_sqlx_error(e: sqlx::Error) -> PortError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            PortError::Duplicate(db.message().to_string())
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    password_hash: String,
    firstname: String,
    lastname: String,
    age: i32,
    gender: String,
    state: String,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> UserAccount {
        UserAccount {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            profile: Profile {
                firstname: self.firstname,
                lastname: self.lastname,
                age: self.age,
                gender: self.gender,
                state: self.state,
            },
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct AuthSessionRecord {
    id: String,
    user_id: Uuid,
    email: String,
    firstname: String,
    lastname: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}
impl AuthSessionRecord {
    fn to_domain(self) -> AuthSession {
        AuthSession {
            id: self.id,
            snapshot: SessionSnapshot {
                user_id: self.user_id,
                email: self.email,
                firstname: self.firstname,
                lastname: self.lastname,
            },
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, email, password_hash, firstname, lastname, age, gender, state, created_at";

//=========================================================================================
// `AccountRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl AccountRepository for DbAdapter {
    async fn create_account(&self, account: NewAccount) -> PortResult<UserAccount> {
        // The unique index on email decides concurrent signups; no pre-check.
        let query = format!(
            "INSERT INTO users (id, email, password_hash, firstname, lastname, age, gender, state) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(Uuid::new_v4())
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(&account.profile.firstname)
            .bind(&account.profile.lastname)
            .bind(account.profile.age)
            .bind(&account.profile.gender)
            .bind(&account.profile.state)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(record.to_domain())
    }

    async fn find_by_email(&self, email: &str) -> PortResult<Option<UserAccount>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn find_by_id(&self, user_id: Uuid) -> PortResult<Option<UserAccount>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(record.map(UserRecord::to_domain))
    }
}

//=========================================================================================
// `SessionStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionStore for DbAdapter {
    async fn insert_session(&self, session: &AuthSession) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO auth_sessions (id, user_id, email, firstname, lastname, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&session.id)
        .bind(session.snapshot.user_id)
        .bind(&session.snapshot.email)
        .bind(&session.snapshot.firstname)
        .bind(&session.snapshot.lastname)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get_session(&self, session_id: &str) -> PortResult<Option<AuthSession>> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT id, user_id, email, firstname, lastname, created_at, expires_at \
             FROM auth_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(record.map(AuthSessionRecord::to_domain))
    }

    async fn delete_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}
