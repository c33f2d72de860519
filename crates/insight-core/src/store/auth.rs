//! Auth session store.
//!
//! The in-memory session is mirrored to durable storage so a restart
//! restores it. The reducer is pure; [`AuthStore`] applies the storage
//! side effects that follow each transition.

use std::fmt;
use std::sync::Arc;

use crate::api::AuthPayload;
use crate::error::Result;
use crate::models::User;
use crate::storage::{
    KeyValueStore, AUTHENTICATED_KEY, TOKEN_KEY, USER_DETAILS_KEY, VISITED_HOME_KEY,
};

#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl fmt::Debug for AuthState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthState")
            .field("user", &self.user)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("is_authenticated", &self.is_authenticated)
            .field("is_loading", &self.is_loading)
            .field("error", &self.error)
            .finish()
    }
}

impl AuthState {
    /// Restore the session from durable storage.
    ///
    /// An unreadable profile record is dropped rather than failing startup.
    pub fn hydrate(storage: &dyn KeyValueStore) -> Result<Self> {
        let user = match storage.get(USER_DETAILS_KEY)? {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(error) => {
                    tracing::warn!("Ignoring unreadable stored profile: {error}");
                    None
                }
            },
            None => None,
        };
        let access_token = storage
            .get(TOKEN_KEY)?
            .filter(|token| !token.trim().is_empty());
        let is_authenticated = storage.get(AUTHENTICATED_KEY)?.as_deref() == Some("true");

        Ok(Self {
            user,
            access_token,
            is_authenticated,
            is_loading: false,
            error: None,
        })
    }

    /// Flag plus a non-empty token. The profile may still be missing while
    /// a token-only session is being rehydrated.
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.is_authenticated
            && self
                .access_token
                .as_deref()
                .is_some_and(|token| !token.trim().is_empty())
    }

    /// A session with a known profile; what route guarding checks.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.has_session() && self.user.is_some()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.user_id.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    SignupStarted,
    SignupSucceeded(AuthPayload),
    SignupFailed(String),
    LoginStarted,
    LoginSucceeded(AuthPayload),
    LoginFailed(String),
    LoggedOut,
    ProfileStarted,
    ProfileSucceeded(User),
    ProfileFailed(String),
    /// Token expired server-side; durable state is cleared by the adapter.
    SessionExpired,
    ClearError,
}

#[must_use]
pub fn reduce_auth(mut state: AuthState, event: AuthEvent) -> AuthState {
    match event {
        AuthEvent::SignupStarted | AuthEvent::LoginStarted | AuthEvent::ProfileStarted => {
            state.is_loading = true;
            state.error = None;
        }
        AuthEvent::SignupSucceeded(payload) | AuthEvent::LoginSucceeded(payload) => {
            state.user = Some(payload.user);
            state.access_token = Some(payload.access_token);
            state.is_authenticated = true;
            state.is_loading = false;
            state.error = None;
        }
        AuthEvent::ProfileSucceeded(user) => {
            state.user = Some(user);
            // A profile answer proves the stored token still works.
            if state
                .access_token
                .as_deref()
                .is_some_and(|token| !token.trim().is_empty())
            {
                state.is_authenticated = true;
            }
            state.is_loading = false;
            state.error = None;
        }
        AuthEvent::SignupFailed(message)
        | AuthEvent::LoginFailed(message)
        | AuthEvent::ProfileFailed(message) => {
            state.is_loading = false;
            state.error = Some(message);
        }
        AuthEvent::LoggedOut | AuthEvent::SessionExpired => state = AuthState::default(),
        AuthEvent::ClearError => state.error = None,
    }
    state
}

/// Auth state plus its durable mirror.
pub struct AuthStore {
    state: AuthState,
    storage: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for AuthStore {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl AuthStore {
    /// Hydrate from storage; a storage read failure starts anonymous.
    pub fn hydrate(storage: Arc<dyn KeyValueStore>) -> Self {
        let state = AuthState::hydrate(storage.as_ref()).unwrap_or_else(|error| {
            tracing::warn!("Failed to restore session: {error}");
            AuthState::default()
        });
        Self { state, storage }
    }

    pub const fn state(&self) -> &AuthState {
        &self.state
    }

    /// Apply `event`, then mirror the new session to storage.
    ///
    /// The in-memory transition is kept even if the storage write fails.
    pub fn dispatch(&mut self, event: AuthEvent) -> Result<()> {
        let effect = StorageEffect::for_event(&event);
        self.state = reduce_auth(std::mem::take(&mut self.state), event);

        match effect {
            StorageEffect::None => Ok(()),
            StorageEffect::WriteSession => self.write_session(),
            StorageEffect::ClearSession => {
                for key in [USER_DETAILS_KEY, TOKEN_KEY, AUTHENTICATED_KEY, VISITED_HOME_KEY] {
                    self.storage.remove(key)?;
                }
                Ok(())
            }
        }
    }

    fn write_session(&self) -> Result<()> {
        if let Some(user) = &self.state.user {
            self.storage
                .set(USER_DETAILS_KEY, &serde_json::to_string(user)?)?;
        }
        if let Some(token) = &self.state.access_token {
            self.storage.set(TOKEN_KEY, token)?;
        }
        self.storage.set(
            AUTHENTICATED_KEY,
            if self.state.is_authenticated { "true" } else { "false" },
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StorageEffect {
    None,
    WriteSession,
    ClearSession,
}

impl StorageEffect {
    const fn for_event(event: &AuthEvent) -> Self {
        match event {
            AuthEvent::SignupSucceeded(_)
            | AuthEvent::LoginSucceeded(_)
            | AuthEvent::ProfileSucceeded(_) => Self::WriteSession,
            AuthEvent::LoggedOut => Self::ClearSession,
            _ => Self::None,
        }
    }
}
