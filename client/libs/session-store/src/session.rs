//! Session lifecycle: load at startup, sign in, sign out

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::kv::KeyValueStore;
use crate::profile::{UserId, UserProfile};

/// Storage key of the session token
pub const TOKEN_KEY: &str = "user_token";

/// Storage key of the serialized [`UserProfile`]
pub const PROFILE_KEY: &str = "user_profile";

/// Shared handle injected into every component that makes authenticated calls
pub type SessionHandle = Arc<SessionStore>;

/// Point-in-time view of the session
#[derive(Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Present iff the user is authenticated
    pub token: Option<String>,
    /// True only until the persisted session has been read at startup
    pub is_loading: bool,
    /// Signed-in user, when the backend supplied one
    pub profile: Option<UserProfile>,
}

impl SessionState {
    fn loading() -> Self {
        Self {
            token: None,
            is_loading: true,
            profile: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.profile.as_ref().map(|p| p.id)
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("is_loading", &self.is_loading)
            .field("profile", &self.profile)
            .finish()
    }
}

/// Owner of the session token.
///
/// All mutation goes through [`SessionStore::sign_in`],
/// [`SessionStore::sign_out`] and [`SessionStore::load_persisted_session`];
/// each publishes the new [`SessionState`] to subscribers.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    /// Create a store in the loading state
    pub fn new(storage: Arc<dyn KeyValueStore>) -> SessionHandle {
        let (state, _) = watch::channel(SessionState::loading());
        Arc::new(Self { storage, state })
    }

    /// Read the persisted session. Runs once at startup.
    ///
    /// The loading flag is cleared whether or not a token was found and
    /// whether or not storage failed.
    pub async fn load_persisted_session(&self) {
        let token = match self.storage.get(TOKEN_KEY).await {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                error!(error = %e, "Failed to load persisted session token");
                None
            }
        };

        let profile = match token {
            Some(_) => self.load_profile().await,
            None => None,
        };

        let found = token.is_some();
        self.state.send_modify(|state| {
            // A sign-in that raced the load wins over an empty store
            if found {
                state.token = token;
                state.profile = profile;
            }
            state.is_loading = false;
        });

        info!(authenticated = found, "Persisted session loaded");
    }

    async fn load_profile(&self) -> Option<UserProfile> {
        let raw = match self.storage.get(PROFILE_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to load persisted user profile");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable persisted user profile");
                None
            }
        }
    }

    /// Start a session.
    ///
    /// The token is persisted first; a storage failure is logged and the
    /// in-memory session is set anyway. Blank tokens are ignored.
    pub async fn sign_in(&self, token: impl Into<String>, profile: Option<UserProfile>) {
        let token = token.into();
        if token.trim().is_empty() {
            warn!("Ignoring sign-in with a blank token");
            return;
        }

        if let Err(e) = self.storage.set(TOKEN_KEY, &token).await {
            error!(error = %e, "Failed to persist session token");
        }

        let persisted_profile = match &profile {
            Some(profile) => match serde_json::to_string(profile) {
                Ok(json) => self.storage.set(PROFILE_KEY, &json).await,
                Err(e) => {
                    error!(error = %e, "Failed to serialize user profile");
                    Ok(())
                }
            },
            // Never keep a previous user's profile next to a new token
            None => self.storage.remove(PROFILE_KEY).await,
        };
        if let Err(e) = persisted_profile {
            error!(error = %e, "Failed to persist user profile");
        }

        let user_id = profile.as_ref().map(|p| p.id);
        self.state.send_modify(|state| {
            state.token = Some(token);
            state.profile = profile;
        });

        info!(user_id, "Signed in");
    }

    /// End the session.
    ///
    /// Idempotent: storage removal is attempted even when already signed out.
    /// Memory is cleared even if removal fails.
    pub async fn sign_out(&self) {
        if let Err(e) = self.storage.remove(TOKEN_KEY).await {
            error!(error = %e, "Failed to remove persisted session token");
        }
        if let Err(e) = self.storage.remove(PROFILE_KEY).await {
            error!(error = %e, "Failed to remove persisted user profile");
        }

        let changed = self.state.send_if_modified(|state| {
            let was_signed_in = state.token.is_some() || state.profile.is_some();
            state.token = None;
            state.profile = None;
            was_signed_in
        });

        if changed {
            info!("Signed out");
        } else {
            debug!("Sign-out while already signed out");
        }
    }

    /// Current token, if signed in
    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Id of the signed-in user, when the profile is known
    pub fn current_user_id(&self) -> Option<UserId> {
        self.state.borrow().user_id()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.state.borrow().profile.clone()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receive every session change (sign-in, sign-out, end of loading)
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.state.borrow())
            .finish()
    }
}
