//! # Session lifecycle
//!
//! [`SessionStore`] owns who is using this tab: nobody ([`Session::Anonymous`]),
//! a backend account ([`Session::Authenticated`], carrying the bearer token), or
//! a local guest ([`Session::Guest`], never carrying a token). It is the only
//! code that reads or writes the persisted session keys in [`store::keys`].
//!
//! ## Persistence
//!
//! | Key | Authenticated | Guest | Anonymous |
//! |-----|---------------|-------|-----------|
//! | `auth_token` | token | absent | absent |
//! | `user_data` | user JSON | guest JSON | absent |
//! | `is_guest` | absent | `"true"` | absent |
//!
//! Every successful transition writes these keys before it returns. When a
//! write fails the keys already touched are restored and the in-memory state
//! is left as it was.
//!
//! ## Lifecycle signal
//!
//! Transitions publish the new [`SessionPhase`] on a `tokio::sync::watch`
//! channel. The UI controller subscribes to switch pages and to release the
//! map when the session ends.
//!
//! ## Split-phase calls
//!
//! [`SessionStore::login`] awaits the backend while holding `&mut self`. UI
//! code that keeps the store inside a reactive cell instead awaits
//! [`AuthApi::login`] on a cloned client and hands the result to
//! [`SessionStore::finish_login`]; both paths apply identical rules.

use api::error::{field_errors, message_from_body};
use api::models::{LoginResponse, UserRecord};
use api::{ApiError, AuthApi};
use store::{keys, KeyValueStore, StoreError};
use thiserror::Error;
use tokio::sync::watch;

/// Shown when a login rejection carries no message of its own.
pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";

/// Shown when a registration rejection carries no message of its own.
pub const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

/// Identity state of the current tab.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        user: UserRecord,
        token: String,
    },
    Guest {
        user: UserRecord,
    },
}

impl Session {
    pub fn phase(&self) -> SessionPhase {
        match self {
            Session::Anonymous => SessionPhase::Anonymous,
            Session::Authenticated { .. } => SessionPhase::Authenticated,
            Session::Guest { .. } => SessionPhase::Guest,
        }
    }

    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { user, .. } | Session::Guest { user } => Some(user),
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }
}

/// Value published on the lifecycle channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Anonymous,
    Authenticated,
    Guest,
}

impl SessionPhase {
    /// Whether the map page should be shown.
    pub fn is_active(self) -> bool {
        !matches!(self, SessionPhase::Anonymous)
    }
}

/// Why a login or registration did not go through.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    /// The backend answered and refused.
    #[error("{0}")]
    Rejected(String),
    /// No response from the backend.
    #[error("{0}")]
    NetworkUnavailable(String),
    #[error("Could not save the session: {0}")]
    Storage(#[from] StoreError),
    #[error("{0}")]
    Unexpected(String),
}

impl AuthError {
    pub fn message(&self) -> String {
        self.to_string()
    }

    fn from_login(err: ApiError) -> Self {
        match err {
            ApiError::Rejected { body, .. } => AuthError::Rejected(
                message_from_body(&body, &["error", "detail", "message"])
                    .unwrap_or_else(|| LOGIN_FAILED.to_string()),
            ),
            err @ ApiError::Unreachable { .. } => AuthError::NetworkUnavailable(err.to_string()),
            err => AuthError::Unexpected(err.to_string()),
        }
    }

    fn from_register(err: ApiError) -> Self {
        match err {
            ApiError::Rejected { body, .. } => AuthError::Rejected(
                message_from_body(&body, &["error", "detail", "message"])
                    .or_else(|| field_errors(&body))
                    .unwrap_or_else(|| REGISTRATION_FAILED.to_string()),
            ),
            err @ ApiError::Unreachable { .. } => AuthError::NetworkUnavailable(err.to_string()),
            err => AuthError::Unexpected(err.to_string()),
        }
    }
}

/// Session state machine over a key-value store and an auth backend.
pub struct SessionStore<S, A> {
    store: S,
    api: A,
    session: Session,
    phase: watch::Sender<SessionPhase>,
}

impl<S: KeyValueStore, A: AuthApi> SessionStore<S, A> {
    /// An anonymous session. Call [`restore_session`](Self::restore_session)
    /// to pick up what a previous page load persisted.
    pub fn new(store: S, api: A) -> Self {
        let (phase, _) = watch::channel(SessionPhase::Anonymous);
        Self {
            store,
            api,
            session: Session::Anonymous,
            phase,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// True only for a backend-authenticated session.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.session, Session::Authenticated { .. })
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token()
    }

    pub fn current_user(&self) -> Option<&UserRecord> {
        self.session.user()
    }

    /// Receiver for lifecycle transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    /// Rebuild the session from persisted keys. Never fails: unreadable
    /// entries count as absent.
    pub fn restore_session(&mut self) -> SessionPhase {
        let guest = self.store.get_item(keys::IS_GUEST).as_deref() == Some("true");
        let user = self.read_user();
        let token = self
            .store
            .get_item(keys::AUTH_TOKEN)
            .filter(|token| !token.is_empty());

        let restored = match (guest, user, token) {
            (true, Some(mut user), token) => {
                if token.is_some() {
                    // Guests never hold a credential.
                    self.purge(keys::AUTH_TOKEN);
                }
                user.is_guest = true;
                Session::Guest { user }
            }
            (false, Some(mut user), Some(token)) => {
                user.is_guest = false;
                Session::Authenticated { user, token }
            }
            _ => Session::Anonymous,
        };

        tracing::info!(phase = ?restored.phase(), "session restored");
        self.transition(restored);
        self.phase()
    }

    /// Exchange credentials with the backend.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<UserRecord, AuthError> {
        let result = self.api.login(username, password).await;
        self.finish_login(result)
    }

    /// Apply the outcome of a credential exchange.
    pub fn finish_login(
        &mut self,
        result: Result<LoginResponse, ApiError>,
    ) -> Result<UserRecord, AuthError> {
        let LoginResponse { mut user, token } = result.map_err(|err| {
            tracing::warn!("login failed: {}", err);
            AuthError::from_login(err)
        })?;
        if token.is_empty() {
            return Err(AuthError::Unexpected(
                "The server did not return a session token.".to_string(),
            ));
        }

        user.is_guest = false;
        let user_json =
            serde_json::to_string(&user).map_err(|e| AuthError::Unexpected(e.to_string()))?;
        self.persist(&[
            (keys::AUTH_TOKEN, Some(token.as_str())),
            (keys::USER_DATA, Some(user_json.as_str())),
            (keys::IS_GUEST, None),
        ])?;

        tracing::info!(username = %user.username, "logged in");
        self.transition(Session::Authenticated {
            user: user.clone(),
            token,
        });
        Ok(user)
    }

    /// Create an account. The session is not changed; log in afterwards.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        let result = self.api.register(username, email, password).await;
        Self::finish_register(result)
    }

    /// Map the outcome of an account-creation request.
    pub fn finish_register(result: Result<(), ApiError>) -> Result<(), AuthError> {
        result.map_err(|err| {
            tracing::warn!("registration failed: {}", err);
            AuthError::from_register(err)
        })
    }

    /// Enter guest mode. No network call; always succeeds. If the guest
    /// session cannot be persisted it still applies to this tab.
    pub fn guest_login(&mut self) -> UserRecord {
        let user = UserRecord::guest();
        match serde_json::to_string(&user) {
            Ok(user_json) => {
                if let Err(err) = self.persist(&[
                    (keys::AUTH_TOKEN, None),
                    (keys::USER_DATA, Some(user_json.as_str())),
                    (keys::IS_GUEST, Some("true")),
                ]) {
                    tracing::error!("guest session will not survive a reload: {}", err);
                }
            }
            Err(err) => tracing::error!("failed to serialise guest user: {}", err),
        }

        tracing::info!("guest session started");
        self.transition(Session::Guest { user: user.clone() });
        user
    }

    /// End the session and purge every persisted key. Always succeeds.
    pub fn logout(&mut self) {
        for key in keys::ALL {
            self.purge(key);
        }
        tracing::info!("logged out");
        self.transition(Session::Anonymous);
    }

    fn transition(&mut self, session: Session) {
        self.api.set_bearer(session.token());
        let phase = session.phase();
        self.session = session;
        self.phase.send_replace(phase);
    }

    fn read_user(&self) -> Option<UserRecord> {
        let raw = self.store.get_item(keys::USER_DATA)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::warn!("discarding corrupt {}: {}", keys::USER_DATA, err);
                self.purge(keys::USER_DATA);
                None
            }
        }
    }

    fn purge(&self, key: &str) {
        if let Err(err) = self.store.remove_item(key) {
            tracing::error!(key, "failed to remove session entry: {}", err);
        }
    }

    /// Apply `writes` (`None` removes) in order, restoring the earlier values
    /// if any step fails.
    fn persist(&self, writes: &[(&str, Option<&str>)]) -> Result<(), StoreError> {
        let previous: Vec<Option<String>> = writes
            .iter()
            .map(|(key, _)| self.store.get_item(key))
            .collect();

        for (applied, (key, value)) in writes.iter().enumerate() {
            let outcome = match value {
                Some(value) => self.store.set_item(key, value),
                None => self.store.remove_item(key),
            };
            if let Err(err) = outcome {
                tracing::error!(key = *key, "session write failed: {}", err);
                for ((key, _), old) in writes.iter().zip(&previous).take(applied) {
                    let restored = match old {
                        Some(old) => self.store.set_item(key, old),
                        None => self.store.remove_item(key),
                    };
                    if let Err(err) = restored {
                        tracing::error!(key = *key, "failed to roll back session entry: {}", err);
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use api::models::UserId;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use store::MemoryStore;

    /// In-memory auth backend: `accounts` maps username to (email, password).
    #[derive(Clone, Default)]
    pub(crate) struct FakeAuth {
        accounts: Rc<RefCell<HashMap<String, (String, String)>>>,
        pub(crate) bearer: Rc<RefCell<Option<String>>>,
        pub(crate) login_calls: Rc<RefCell<usize>>,
        pub(crate) offline: Rc<RefCell<bool>>,
    }

    impl FakeAuth {
        pub(crate) fn with_account(username: &str, email: &str, password: &str) -> Self {
            let fake = Self::default();
            fake.accounts.borrow_mut().insert(
                username.to_string(),
                (email.to_string(), password.to_string()),
            );
            fake
        }

        fn unreachable() -> ApiError {
            ApiError::Unreachable {
                base_url: "http://localhost:8000/api".to_string(),
                port: 8000,
                reason: "connection refused".to_string(),
            }
        }
    }

    impl AuthApi for FakeAuth {
        async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
            *self.login_calls.borrow_mut() += 1;
            if *self.offline.borrow() {
                return Err(Self::unreachable());
            }
            match self.accounts.borrow().get(username) {
                Some((email, stored)) if stored == password => Ok(LoginResponse {
                    user: UserRecord {
                        id: Some(UserId::Number(1)),
                        username: username.to_string(),
                        email: Some(email.clone()),
                        is_guest: false,
                    },
                    token: format!("token-{username}"),
                }),
                _ => Err(ApiError::rejected(401, json!({"error": "Invalid credentials"}))),
            }
        }

        async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError> {
            if *self.offline.borrow() {
                return Err(Self::unreachable());
            }
            let mut accounts = self.accounts.borrow_mut();
            if accounts.contains_key(username) {
                return Err(ApiError::rejected(
                    400,
                    json!({"username": ["A user with that username already exists."]}),
                ));
            }
            accounts.insert(username.to_string(), (email.to_string(), password.to_string()));
            Ok(())
        }

        fn set_bearer(&self, token: Option<&str>) {
            *self.bearer.borrow_mut() = token.map(str::to_string);
        }
    }

    /// MemoryStore that refuses writes to one key.
    #[derive(Clone)]
    struct FailingStore {
        inner: MemoryStore,
        fail_on: &'static str,
    }

    impl KeyValueStore for FailingStore {
        fn get_item(&self, key: &str) -> Option<String> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if key == self.fail_on {
                return Err(StoreError::Write {
                    key: key.to_string(),
                    reason: "quota exceeded".to_string(),
                });
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove_item(key)
        }
    }

    fn bob_store() -> (SessionStore<MemoryStore, FakeAuth>, MemoryStore, FakeAuth) {
        let storage = MemoryStore::new();
        let api = FakeAuth::with_account("bob", "bob@example.com", "secret");
        (SessionStore::new(storage.clone(), api.clone()), storage, api)
    }

    #[tokio::test]
    async fn test_full_cycle_ends_anonymous_with_no_keys() {
        let (mut session, storage, _) = bob_store();

        session.login("bob", "secret").await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(storage.len(), 2);

        session.logout();
        assert_eq!(session.phase(), SessionPhase::Anonymous);

        session.guest_login();
        assert_eq!(session.phase(), SessionPhase::Guest);
        assert_eq!(storage.get_item(keys::IS_GUEST).as_deref(), Some("true"));

        session.logout();
        assert_eq!(*session.session(), Session::Anonymous);
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_restore_after_login_reproduces_session() {
        let (mut session, storage, api) = bob_store();
        let user = session.login("bob", "secret").await.unwrap();

        let mut reloaded = SessionStore::new(storage.clone(), api.clone());
        assert_eq!(reloaded.restore_session(), SessionPhase::Authenticated);
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.current_user(), Some(&user));
        assert_eq!(reloaded.token(), Some("token-bob"));
        assert_eq!(api.bearer.borrow().as_deref(), Some("token-bob"));
    }

    #[test]
    fn test_guest_login_has_no_token() {
        let (mut session, storage, api) = bob_store();
        storage.set_item(keys::AUTH_TOKEN, "stale").unwrap();

        let user = session.guest_login();
        assert_eq!(user.username, "Guest User");
        assert!(user.id.is_none());
        assert!(user.email.is_none());
        assert!(session.token().is_none());
        assert!(!session.is_authenticated());
        assert!(storage.get_item(keys::AUTH_TOKEN).is_none());
        assert!(api.bearer.borrow().is_none());
    }

    #[test]
    fn test_malformed_user_data_restores_anonymous() {
        let (mut session, storage, _) = bob_store();
        storage.set_item(keys::AUTH_TOKEN, "token-bob").unwrap();
        storage.set_item(keys::USER_DATA, "{not json").unwrap();

        assert_eq!(session.restore_session(), SessionPhase::Anonymous);
        assert!(session.current_user().is_none());
        assert!(storage.get_item(keys::USER_DATA).is_none());
    }

    #[test]
    fn test_guest_restore_purges_stray_token() {
        let (mut session, storage, _) = bob_store();
        storage
            .set_item(keys::USER_DATA, r#"{"username":"Guest User"}"#)
            .unwrap();
        storage.set_item(keys::IS_GUEST, "true").unwrap();
        storage.set_item(keys::AUTH_TOKEN, "leftover").unwrap();

        assert_eq!(session.restore_session(), SessionPhase::Guest);
        assert!(session.token().is_none());
        assert!(session.current_user().unwrap().is_guest);
        assert!(storage.get_item(keys::AUTH_TOKEN).is_none());
    }

    #[test]
    fn test_restore_without_token_stays_anonymous() {
        let (mut session, storage, _) = bob_store();
        storage
            .set_item(keys::USER_DATA, r#"{"username":"bob"}"#)
            .unwrap();

        assert_eq!(session.restore_session(), SessionPhase::Anonymous);
    }

    #[tokio::test]
    async fn test_rejected_login_leaves_state_unchanged() {
        let (mut session, storage, _) = bob_store();
        session.guest_login();
        let before = session.session().clone();
        let user_data = storage.get_item(keys::USER_DATA);

        let err = session.login("bob", "wrong").await.unwrap_err();
        assert_eq!(err, AuthError::Rejected("Invalid credentials".to_string()));
        assert_eq!(err.message(), "Invalid credentials");
        assert_eq!(*session.session(), before);
        assert_eq!(storage.get_item(keys::USER_DATA), user_data);
        assert_eq!(storage.get_item(keys::IS_GUEST).as_deref(), Some("true"));
    }

    #[test]
    fn test_rejection_without_message_uses_generic_text() {
        let (mut session, _, _) = bob_store();
        let err = session
            .finish_login(Err(ApiError::rejected(500, serde_json::Value::Null)))
            .unwrap_err();
        assert_eq!(err.message(), LOGIN_FAILED);

        let err = session
            .finish_login(Err(ApiError::rejected(400, json!({"message": "Account disabled"}))))
            .unwrap_err();
        assert_eq!(err.message(), "Account disabled");
    }

    #[tokio::test]
    async fn test_offline_login_reports_network_unavailable() {
        let (mut session, storage, api) = bob_store();
        *api.offline.borrow_mut() = true;

        let err = session.login("bob", "secret").await.unwrap_err();
        assert!(matches!(err, AuthError::NetworkUnavailable(_)));
        assert!(err.message().contains("port 8000"));
        assert_eq!(session.phase(), SessionPhase::Anonymous);
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let storage = MemoryStore::new();
        let mut session = SessionStore::new(storage.clone(), FakeAuth::default());

        session
            .register("alice", "alice@example.com", "hunter22")
            .await
            .unwrap();
        assert_eq!(session.phase(), SessionPhase::Anonymous);
        assert!(storage.is_empty());

        let user = session.login("alice", "hunter22").await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(user.username, "alice");
        assert_eq!(session.current_user().unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_register_field_errors_are_joined() {
        let (session, _, _) = bob_store();
        let err = session
            .register("bob", "other@example.com", "secret1")
            .await
            .unwrap_err();
        assert_eq!(
            err.message(),
            "username: A user with that username already exists."
        );

        let err = SessionStore::<MemoryStore, FakeAuth>::finish_register(Err(ApiError::rejected(
            400,
            json!({"email": ["Enter a valid email address."], "password": ["Too short.", "Too common."]}),
        )))
        .unwrap_err();
        assert_eq!(
            err.message(),
            "email: Enter a valid email address.; password: Too short., Too common."
        );
    }

    #[tokio::test]
    async fn test_storage_failure_rolls_back_login() {
        let storage = MemoryStore::new();
        storage
            .set_item(keys::USER_DATA, r#"{"username":"Guest User","is_guest":true}"#)
            .unwrap();
        storage.set_item(keys::IS_GUEST, "true").unwrap();
        let failing = FailingStore {
            inner: storage.clone(),
            fail_on: keys::USER_DATA,
        };
        let mut session = SessionStore::new(
            failing,
            FakeAuth::with_account("bob", "bob@example.com", "secret"),
        );
        session.restore_session();

        let err = session.login("bob", "secret").await.unwrap_err();
        assert!(matches!(err, AuthError::Storage(_)));
        assert_eq!(session.phase(), SessionPhase::Guest);
        assert!(storage.get_item(keys::AUTH_TOKEN).is_none());
        assert_eq!(storage.get_item(keys::IS_GUEST).as_deref(), Some("true"));
    }

    #[test]
    fn test_guest_login_applies_when_storage_fails() {
        let storage = MemoryStore::new();
        let failing = FailingStore {
            inner: storage.clone(),
            fail_on: keys::IS_GUEST,
        };
        let mut session = SessionStore::new(failing, FakeAuth::default());

        let user = session.guest_login();
        assert!(user.is_guest);
        assert_eq!(session.phase(), SessionPhase::Guest);
        assert!(session.token().is_none());
        // The user record written before the failure is rolled back.
        assert!(storage.get_item(keys::USER_DATA).is_none());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_lifecycle_signal_follows_transitions() {
        let (mut session, _, api) = bob_store();
        let mut phases = session.subscribe();
        assert_eq!(*phases.borrow(), SessionPhase::Anonymous);

        session.login("bob", "secret").await.unwrap();
        assert!(phases.has_changed().unwrap());
        assert_eq!(*phases.borrow_and_update(), SessionPhase::Authenticated);
        assert_eq!(*api.login_calls.borrow(), 1);

        session.logout();
        assert_eq!(*phases.borrow_and_update(), SessionPhase::Anonymous);
        assert!(api.bearer.borrow().is_none());
    }
}
