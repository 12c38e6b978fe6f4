//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use eventify_core::ports::{AccountRepository, PurchaseHistoryService};
use eventify_core::{CredentialManager, SessionManager};
use std::sync::Arc;

use crate::web::cookie::CookiePolicy;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialManager,
    pub sessions: SessionManager,
    /// Used for the live profile read on `GET /account`.
    pub accounts: Arc<dyn AccountRepository>,
    pub purchases: Arc<dyn PurchaseHistoryService>,
    pub cookies: CookiePolicy,
}
