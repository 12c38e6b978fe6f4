//! crates/eventify_core/src/credentials.rs
//!
//! Signup and login: input presence checks, Argon2 password hashing and
//! verification, duplicate-account detection and the welcome email.

use std::sync::{Arc, OnceLock};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{error, info, warn};

use crate::domain::{NewAccount, Profile, SessionSnapshot};
use crate::error::{AuthError, AuthResult};
use crate::ports::{AccountRepository, NotificationService};

pub const WELCOME_SUBJECT: &str = "Account Created - SCENE EVENTIFY";

const MISSING_SIGNUP_FIELDS: &str = "All fields are required";
const MISSING_LOGIN_FIELDS: &str = "Email and password are required";

//=========================================================================================
// Inputs
//=========================================================================================

/// Raw signup input. Every field is required; `None`, empty and
/// whitespace-only values all count as missing.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Returns the trimmed value if it is present and non-blank.
fn present(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Passwords are checked for presence but never trimmed.
fn present_password(field: &Option<String>) -> Option<String> {
    field
        .as_ref()
        .filter(|p| !p.trim().is_empty())
        .cloned()
}

struct ValidSignup {
    email: String,
    password: String,
    profile: Profile,
}

impl SignupForm {
    fn validate(&self) -> AuthResult<ValidSignup> {
        let missing = || AuthError::Validation(MISSING_SIGNUP_FIELDS.to_string());

        let email = present(&self.email).ok_or_else(missing)?;
        let password = present_password(&self.password).ok_or_else(missing)?;
        let firstname = present(&self.firstname).ok_or_else(missing)?;
        let lastname = present(&self.lastname).ok_or_else(missing)?;
        let age = present(&self.age).ok_or_else(missing)?;
        let gender = present(&self.gender).ok_or_else(missing)?;
        let state = present(&self.state).ok_or_else(missing)?;

        let age = age
            .parse::<i32>()
            .ok()
            .filter(|a| *a >= 0)
            .ok_or_else(|| AuthError::Validation("Age must be a whole number".to_string()))?;

        Ok(ValidSignup {
            email,
            password,
            profile: Profile {
                firstname,
                lastname,
                age,
                gender,
                state,
            },
        })
    }
}

//=========================================================================================
// Password hashing
//=========================================================================================

/// Hashes a password with a fresh random salt. Runs on the blocking pool so
/// the Argon2 work does not stall other requests.
pub async fn hash_password(password: String) -> AuthResult<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::Internal(format!("failed to hash password: {e}")))
    })
    .await
    .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
}

/// Checks a password against a PHC hash string. A hash that cannot be parsed
/// is an internal error, a mismatch is `Ok(false)`.
pub async fn verify_password(password: String, hash: String) -> AuthResult<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash)
            .map_err(|e| AuthError::Internal(format!("stored hash is unreadable: {e}")))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))?
}

/// A hash nobody knows the password to. Verified against when the email is
/// unknown so that both login failure paths cost the same.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(salt.as_str().as_bytes(), &salt)
                .map(|h| h.to_string())
                .ok()
        })
        .as_deref()
}

async fn verify_against_dummy(password: String) {
    let outcome = tokio::task::spawn_blocking(move || {
        if let Some(Ok(parsed)) = dummy_hash().map(PasswordHash::new) {
            let _ = Argon2::default().verify_password(password.as_bytes(), &parsed);
        }
    })
    .await;
    if let Err(e) = outcome {
        error!("Dummy verification task failed: {}", e);
    }
}

//=========================================================================================
// Credential Manager
//=========================================================================================

#[derive(Clone)]
pub struct CredentialManager {
    accounts: Arc<dyn AccountRepository>,
    notifier: Arc<dyn NotificationService>,
}

impl CredentialManager {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        // Built here so the first unknown-email login costs no more than a wrong password.
        if dummy_hash().is_none() {
            warn!("Could not build the dummy password hash; unknown-email logins will be faster");
        }
        Self { accounts, notifier }
    }

    /// Creates a new account. Nothing sensitive is returned.
    pub async fn signup(&self, form: SignupForm) -> AuthResult<()> {
        let valid = form.validate()?;
        info!(email = %valid.email, "Signup request received");

        let password_hash = hash_password(valid.password).await?;

        let account = self
            .accounts
            .create_account(NewAccount {
                email: valid.email,
                password_hash,
                profile: valid.profile,
            })
            .await
            .map_err(|e| {
                let err = AuthError::from(e);
                if let AuthError::Internal(detail) = &err {
                    error!("Failed to create account: {}", detail);
                }
                err
            })?;

        info!(user_id = %account.id, "Account created");
        self.send_welcome(account.email, account.profile.firstname);
        Ok(())
    }

    /// Verifies credentials and returns the snapshot the session will hold.
    pub async fn login(&self, form: LoginForm) -> AuthResult<SessionSnapshot> {
        let missing = || AuthError::Validation(MISSING_LOGIN_FIELDS.to_string());
        let email = present(&form.email).ok_or_else(missing)?;
        let password = present_password(&form.password).ok_or_else(missing)?;

        let account = self.accounts.find_by_email(&email).await.map_err(|e| {
            error!("Failed to look up account: {}", e);
            AuthError::from(e)
        })?;

        match account {
            Some(account) => {
                let matches = verify_password(password, account.password_hash.clone()).await?;
                if !matches {
                    info!(user_id = %account.id, "Login rejected");
                    return Err(AuthError::InvalidCredentials);
                }
                info!(user_id = %account.id, "Login accepted");
                Ok(SessionSnapshot::from(&account))
            }
            None => {
                verify_against_dummy(password).await;
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Fire-and-forget. The signup response never waits on this.
    fn send_welcome(&self, recipient: String, firstname: String) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            let body = format!(
                "Hello {firstname},\n\nYour account has been successfully created on SCENE EVENTIFY.\n\nThank you for joining us!"
            );
            match notifier.send(&recipient, WELCOME_SUBJECT, &body).await {
                Ok(()) => info!(to = %recipient, "Welcome email sent"),
                Err(e) => warn!(to = %recipient, "Failed to send welcome email: {}", e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryAccountRepository;
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct ChannelNotifier(mpsc::UnboundedSender<(String, String, String)>);

    #[async_trait]
    impl NotificationService for ChannelNotifier {
        async fn send(&self, recipient: &str, subject: &str, body: &str) -> PortResult<()> {
            let _ = self
                .0
                .send((recipient.to_string(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl NotificationService for FailingNotifier {
        async fn send(&self, _: &str, _: &str, _: &str) -> PortResult<()> {
            Err(PortError::Unexpected("smtp down".to_string()))
        }
    }

    fn signup_form(email: &str, password: &str) -> SignupForm {
        SignupForm {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            firstname: Some("Ada".to_string()),
            lastname: Some("Lovelace".to_string()),
            age: Some("36".to_string()),
            gender: Some("female".to_string()),
            state: Some("Lagos".to_string()),
        }
    }

    fn login_form(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn manager_with(
        notifier: Arc<dyn NotificationService>,
    ) -> (CredentialManager, Arc<MemoryAccountRepository>) {
        let repo = Arc::new(MemoryAccountRepository::new());
        (CredentialManager::new(repo.clone(), notifier), repo)
    }

    fn manager() -> (CredentialManager, Arc<MemoryAccountRepository>) {
        manager_with(Arc::new(FailingNotifier))
    }

    #[tokio::test]
    async fn signup_then_login_round_trip() {
        let (credentials, _) = manager();
        credentials
            .signup(signup_form("a@b.com", "Passw0rd"))
            .await
            .unwrap();

        let snapshot = credentials
            .login(login_form("a@b.com", "Passw0rd"))
            .await
            .unwrap();
        assert_eq!(snapshot.email, "a@b.com");
        assert_eq!(snapshot.firstname, "Ada");
        assert_eq!(snapshot.lastname, "Lovelace");

        let err = credentials
            .login(login_form("a@b.com", "wrong-pass"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn stored_hash_is_salted_and_not_plaintext() {
        let (credentials, repo) = manager();
        credentials.signup(signup_form("x@y.io", "Passw0rd")).await.unwrap();
        credentials.signup(signup_form("z@y.io", "Passw0rd")).await.unwrap();

        let x = repo.find_by_email("x@y.io").await.unwrap().unwrap();
        let z = repo.find_by_email("z@y.io").await.unwrap().unwrap();
        assert!(x.password_hash.starts_with("$argon2"));
        assert!(!x.password_hash.contains("Passw0rd"));
        assert_ne!(x.password_hash, z.password_hash);
    }

    #[tokio::test]
    async fn second_signup_with_same_email_is_duplicate() {
        let (credentials, _) = manager();
        credentials.signup(signup_form("dup@x.io", "Passw0rd")).await.unwrap();

        let err = credentials
            .signup(signup_form("dup@x.io", "Other123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateAccount));
    }

    #[tokio::test]
    async fn concurrent_signups_for_one_email_succeed_once() {
        let (credentials, _) = manager();
        let a = credentials.signup(signup_form("race@x.io", "Passw0rd"));
        let b = credentials.signup(signup_form("race@x.io", "Passw0rd"));
        let (a, b) = tokio::join!(a, b);

        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(AuthError::DuplicateAccount))));
    }

    #[tokio::test]
    async fn missing_field_fails_before_storage() {
        let (credentials, repo) = manager();
        let mut form = signup_form("a@b.com", "Passw0rd");
        form.age = None;

        let err = credentials.signup(form).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(repo.calls(), 0);

        let mut blank = signup_form("a@b.com", "Passw0rd");
        blank.state = Some("   ".to_string());
        assert!(matches!(
            credentials.signup(blank).await,
            Err(AuthError::Validation(_))
        ));
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn non_numeric_age_is_a_validation_error() {
        let (credentials, repo) = manager();
        let mut form = signup_form("a@b.com", "Passw0rd");
        form.age = Some("twenty".to_string());

        assert!(matches!(
            credentials.signup(form).await,
            Err(AuthError::Validation(_))
        ));
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_look_the_same() {
        let (credentials, _) = manager();
        credentials.signup(signup_form("a@b.com", "Passw0rd")).await.unwrap();

        let unknown = credentials
            .login(login_form("nobody@b.com", "Passw0rd"))
            .await
            .unwrap_err();
        let wrong = credentials
            .login(login_form("a@b.com", "nope-nope"))
            .await
            .unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn dummy_hash_is_ready_once_the_manager_exists() {
        let (credentials, _) = manager();

        let hash = dummy_hash().expect("dummy hash built by the constructor");
        assert!(PasswordHash::new(hash).is_ok());
        assert!(!verify_password("Passw0rd".to_string(), hash.to_string())
            .await
            .unwrap());

        let err = credentials
            .login(login_form("nobody@b.com", "Passw0rd"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let (credentials, repo) = manager();
        let err = credentials
            .login(LoginForm {
                email: Some("a@b.com".to_string()),
                password: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn welcome_email_is_sent_after_signup() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (credentials, _) = manager_with(Arc::new(ChannelNotifier(tx)));
        credentials.signup(signup_form("a@b.com", "Passw0rd")).await.unwrap();

        let (to, subject, body) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(to, "a@b.com");
        assert_eq!(subject, WELCOME_SUBJECT);
        assert!(body.starts_with("Hello Ada,"));
    }

    #[tokio::test]
    async fn failing_notifier_does_not_fail_signup() {
        let (credentials, repo) = manager_with(Arc::new(FailingNotifier));
        credentials.signup(signup_form("a@b.com", "Passw0rd")).await.unwrap();
        assert!(repo.find_by_email("a@b.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn corrupt_stored_hash_is_internal() {
        let err = verify_password("pw".to_string(), "not-a-phc-string".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
    }
}
