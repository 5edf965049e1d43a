//! Authentication service.

use std::sync::Arc;

use tracing::{info, warn};

use vitrine_core::ids::UserId;
use vitrine_core::StoreError;
use vitrine_db::{AdminUserRecord, AdminUserStore, ConnectionPool, SessionRecord, SessionStore};

use crate::password::PasswordHasher;
use crate::token::generate_secure_id;
use crate::user::{AdminUser, Role};
use crate::AuthError;

/// Default session duration: 7 days.
const SESSION_DURATION_SECS: i64 = 7 * 24 * 60 * 60;

/// Issues and resolves back-office sessions.
///
/// Constructed once per process and injected wherever a bearer token
/// must be checked.
#[derive(Clone)]
pub struct AuthService {
    users: AdminUserStore,
    sessions: SessionStore,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self {
            users: AdminUserStore::new(pool.clone()),
            sessions: SessionStore::new(pool),
            hasher: PasswordHasher,
        }
    }

    /// Register a back-office user.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<AdminUser, AuthError> {
        PasswordHasher::validate_password(password)?;

        let record = AdminUserRecord {
            id: UserId::generate(),
            email: email.trim().to_lowercase(),
            password_hash: self.hasher.hash(password)?,
            role: role.as_str().to_string(),
            created_at: current_timestamp(),
        };
        match self.users.insert(&record) {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => {
                return Err(AuthError::UserAlreadyExists(record.email))
            }
            Err(e) => return Err(e.into()),
        }

        info!(user = %record.id, email = %record.email, "admin user registered");
        AdminUser::try_from(record)
    }

    /// Create the initial admin account if it does not exist yet.
    ///
    /// Called at server startup; a second start with the same
    /// credentials is a no-op.
    pub fn bootstrap(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = email.trim().to_lowercase();
        if self.users.find_by_email(&email)?.is_some() {
            return Ok(());
        }
        self.register(&email, password, Role::Admin)?;
        Ok(())
    }

    /// Verify credentials and open a session.
    ///
    /// Returns the user and the opaque bearer token the client must send
    /// back on admin routes.
    pub fn login(&self, email: &str, password: &str) -> Result<(AdminUser, String), AuthError> {
        let email = email.trim().to_lowercase();
        let record = self
            .users
            .find_by_email(&email)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(password, &record.password_hash)? {
            warn!(email = %email, "failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let now = current_timestamp();
        let session = SessionRecord {
            token: generate_secure_id("sess"),
            user_id: record.id.clone(),
            created_at: now,
            expires_at: now + SESSION_DURATION_SECS,
        };
        self.sessions.insert(&session)?;

        info!(user = %record.id, "admin logged in");
        Ok((AdminUser::try_from(record)?, session.token))
    }

    /// Resolve a bearer token to its user.
    ///
    /// Expired sessions are deleted on sight. Role checks are the
    /// caller's job; this only answers "who is this".
    pub fn authenticate(&self, token: &str) -> Result<AdminUser, AuthError> {
        let session = self
            .sessions
            .find(token)?
            .ok_or(AuthError::SessionNotFound)?;

        if session.is_expired() {
            self.sessions.delete(token)?;
            return Err(AuthError::SessionExpired);
        }

        let record = self
            .users
            .find_by_id(&session.user_id)?
            .ok_or(AuthError::SessionNotFound)?;
        AdminUser::try_from(record)
    }

    /// Close a session. Unknown tokens are ignored.
    pub fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.sessions.delete(token)?;
        Ok(())
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_db::schema;

    fn service() -> AuthService {
        let pool = Arc::new(ConnectionPool::open_in_memory().unwrap());
        schema::init(&pool).unwrap();
        AuthService::new(pool)
    }

    #[test]
    fn test_register_login_authenticate_logout() {
        let auth = service();
        auth.register("admin@vitrine.shop", "SecurePass1", Role::Admin)
            .unwrap();

        let (user, token) = auth.login("admin@vitrine.shop", "SecurePass1").unwrap();
        assert_eq!(user.role, Role::Admin);

        let resolved = auth.authenticate(&token).unwrap();
        assert_eq!(resolved.email, "admin@vitrine.shop");

        auth.logout(&token).unwrap();
        assert!(matches!(
            auth.authenticate(&token),
            Err(AuthError::SessionNotFound)
        ));
    }

    #[test]
    fn test_login_rejects_bad_credentials() {
        let auth = service();
        auth.register("admin@vitrine.shop", "SecurePass1", Role::Admin)
            .unwrap();

        assert!(matches!(
            auth.login("admin@vitrine.shop", "WrongPass1"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody@vitrine.shop", "SecurePass1"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_register_rejects_weak_password() {
        let auth = service();
        assert!(matches!(
            auth.register("admin@vitrine.shop", "weak", Role::Admin),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_duplicate_registration() {
        let auth = service();
        auth.register("admin@vitrine.shop", "SecurePass1", Role::Admin)
            .unwrap();
        assert!(matches!(
            auth.register("admin@vitrine.shop", "OtherPass1", Role::Admin),
            Err(AuthError::UserAlreadyExists(_))
        ));
    }

    #[test]
    fn test_bootstrap_is_idempotent() {
        let auth = service();
        auth.bootstrap("admin@vitrine.shop", "SecurePass1").unwrap();
        auth.bootstrap("admin@vitrine.shop", "SecurePass1").unwrap();
        assert!(auth.login("admin@vitrine.shop", "SecurePass1").is_ok());
    }

    #[test]
    fn test_unknown_token_rejected() {
        let auth = service();
        assert!(matches!(
            auth.authenticate("sess_bogus"),
            Err(AuthError::SessionNotFound)
        ));
    }
}
