pub mod credentials;
pub mod domain;
pub mod error;
pub mod memory;
pub mod ports;
pub mod sessions;

pub use credentials::{CredentialManager, LoginForm, SignupForm};
pub use domain::{AuthSession, NewAccount, Profile, PublicProfile, Purchase, SessionSnapshot, UserAccount};
pub use error::{AuthError, AuthResult};
pub use ports::{AccountRepository, NotificationService, PortError, PortResult, PurchaseHistoryService, SessionStore};
pub use sessions::{SessionManager, DEFAULT_SESSION_TTL_HOURS};
