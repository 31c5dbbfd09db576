//! Session handling over the external identity provider
//!
//! The hosted identity provider of the original system is an external
//! collaborator; this service mirrors its surface (sign-up, sign-in,
//! sign-out, current-session lookup) with demo-grade credential
//! checking, and holds sessions with an explicit lifecycle instead of
//! global mutable state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::models::{SessionUser, UserAccount};
use crate::store::StoreRef;

/// Minimum accepted password length
const MIN_PASSWORD_LEN: usize = 6;

/// Session service backed by the user table
pub struct AuthService {
    store: StoreRef,
    sessions: RwLock<HashMap<String, SessionUser>>,
    counter: AtomicU64,
}

impl AuthService {
    pub fn new(store: StoreRef) -> Self {
        Self {
            store,
            sessions: RwLock::new(HashMap::new()),
            counter: AtomicU64::new(0),
        }
    }

    /// Register a new account. Duplicate emails are rejected; the new
    /// user starts without a role assignment (regular user).
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> CoreResult<SessionUser> {
        if name.trim().is_empty() {
            return Err(CoreError::validation("name", "name is required"));
        }
        if email.trim().is_empty() || !email.contains('@') {
            return Err(CoreError::validation("email", "a valid email is required"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(CoreError::validation(
                "password",
                "password must be at least 6 characters",
            ));
        }

        let account = UserAccount {
            id: self.generate_id(),
            email: email.trim().to_string(),
            name: name.trim().to_string(),
            password: password.to_string(),
        };
        let session = SessionUser::from(&account);
        self.store.insert_user(account).await?;
        log::info!("account created for {}", session.email);
        Ok(session)
    }

    /// Sign in and open a session, returning the token and user
    pub async fn sign_in(&self, email: &str, password: &str) -> CoreResult<(String, SessionUser)> {
        let account = self
            .store
            .user_by_email(email)
            .await?
            .ok_or(CoreError::Unauthorized)?;
        if account.password != password {
            return Err(CoreError::Unauthorized);
        }

        let user = SessionUser::from(&account);
        let token = self.generate_id();
        self.sessions
            .write()
            .unwrap()
            .insert(token.clone(), user.clone());
        log::info!("session opened for {}", user.email);
        Ok((token, user))
    }

    /// Tear down a session; unknown tokens are a no-op
    pub fn sign_out(&self, token: &str) {
        if let Some(user) = self.sessions.write().unwrap().remove(token) {
            log::info!("session closed for {}", user.email);
        }
    }

    /// Current-session user for a token
    pub fn session(&self, token: &str) -> Option<SessionUser> {
        self.sessions.read().unwrap().get(token).cloned()
    }

    /// Open session count
    pub fn session_count(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    /// Timestamp-plus-counter id, unique within the process
    fn generate_id(&self) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", millis, n)
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_sign_up_and_sign_in() {
        let auth = service();
        let user = auth
            .sign_up("Jane Doe", "jane@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(user.name, "Jane Doe");

        let (token, session) = auth.sign_in("jane@example.com", "secret1").await.unwrap();
        assert_eq!(session.email, "jane@example.com");
        assert_eq!(auth.session(&token).unwrap().id, session.id);
    }

    #[tokio::test]
    async fn test_sign_up_validation() {
        let auth = service();
        assert!(auth.sign_up("", "jane@example.com", "secret1").await.is_err());
        assert!(auth.sign_up("Jane", "not-an-email", "secret1").await.is_err());
        assert!(auth.sign_up("Jane", "jane@example.com", "short").await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let auth = service();
        auth.sign_up("Jane", "jane@example.com", "secret1")
            .await
            .unwrap();
        let err = auth
            .sign_up("Other", "jane@example.com", "secret2")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateEntry { .. }));
    }

    #[tokio::test]
    async fn test_bad_credentials_rejected() {
        let auth = service();
        auth.sign_up("Jane", "jane@example.com", "secret1")
            .await
            .unwrap();

        assert!(auth.sign_in("jane@example.com", "wrong").await.is_err());
        assert!(auth.sign_in("nobody@example.com", "secret1").await.is_err());
    }

    #[tokio::test]
    async fn test_sign_out_tears_down_session() {
        let auth = service();
        auth.sign_up("Jane", "jane@example.com", "secret1")
            .await
            .unwrap();
        let (token, _) = auth.sign_in("jane@example.com", "secret1").await.unwrap();
        assert_eq!(auth.session_count(), 1);

        auth.sign_out(&token);
        assert!(auth.session(&token).is_none());
        assert_eq!(auth.session_count(), 0);

        // Unknown token is a no-op
        auth.sign_out("missing");
    }
}
