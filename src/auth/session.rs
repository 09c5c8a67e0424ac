//! Session lifecycle.
//!
//! `SessionManager` owns the in-memory [`Session`] and is the only writer
//! of the credential store. Construction starts in a hydrating state;
//! `bootstrap` resolves it exactly once from persisted credentials, and
//! sign-in/sign-out move between authenticated and unauthenticated from
//! then on. The manager registers its own sign-out as the API client's
//! unauthorized handler, so a 401 anywhere forces a full session reset.

use std::sync::{Arc, Weak};

use futures::FutureExt;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::api::{ApiClient, AuthContext};
use crate::models::{roles as role_names, UserProfile};

use super::credentials::CredentialStore;
use super::error::AuthError;
use super::token::normalize_token;

/// In-memory session snapshot.
///
/// Consumers must treat `is_hydrating` as a gate: no authorization
/// decision is meaningful until it has gone false.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
    pub roles: Vec<String>,
    pub is_hydrating: bool,
}

impl Session {
    /// Initial state: nothing known yet, hydration pending.
    fn hydrating() -> Self {
        Self {
            is_hydrating: true,
            ..Self::default()
        }
    }

    /// Unauthenticated state after hydration has settled.
    fn signed_out() -> Self {
        Self::default()
    }

    /// True iff a non-empty token is present. Derived, never stored.
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|token| !token.is_empty())
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }

    pub fn is_student(&self) -> bool {
        self.has_role(role_names::STUDENT)
    }

    pub fn is_mentor(&self) -> bool {
        self.has_role(role_names::MENTOR)
    }

    /// Staff covers the administrative roles elevated screens gate on.
    pub fn is_staff(&self) -> bool {
        self.has_any_role(&role_names::STAFF)
    }
}

/// Owner of the session state machine.
pub struct SessionManager {
    auth: Arc<AuthContext>,
    store: CredentialStore,
    state: RwLock<Session>,
}

impl SessionManager {
    /// Create the manager and wire its sign-out into the client's
    /// unauthorized handler.
    ///
    /// The handler holds a `Weak` reference, so a dropped manager simply
    /// turns further 401 notifications into no-ops.
    pub async fn new(client: &ApiClient, store: CredentialStore) -> Arc<Self> {
        let manager = Arc::new(Self {
            auth: Arc::clone(client.auth()),
            store,
            state: RwLock::new(Session::hydrating()),
        });

        let weak: Weak<SessionManager> = Arc::downgrade(&manager);
        manager
            .auth
            .set_unauthorized_handler(Some(Arc::new(move || {
                let weak = weak.clone();
                async move {
                    if let Some(manager) = weak.upgrade() {
                        manager.sign_out().await;
                    }
                    Ok(())
                }
                .boxed()
            })))
            .await;

        manager
    }

    /// Current session snapshot.
    ///
    /// Operations swap whole snapshots, so a reader racing a sign-in or
    /// sign-out observes either the old or the new state, never a mix.
    pub async fn current(&self) -> Session {
        self.state.read().await.clone()
    }

    /// Resolve the persisted session once at startup.
    ///
    /// Never fails and never leaves the session hydrating: a usable
    /// stored token authenticates, anything else (including a storage
    /// error, which is logged) settles on the signed-out default.
    pub async fn bootstrap(&self) {
        let next = match self.store.load().await {
            Ok(stored) => {
                if let Some(token) = stored.token {
                    debug!("Restoring persisted session");
                    self.auth.set_token(Some(token.clone())).await;
                    Session {
                        user: stored.user,
                        token: Some(token),
                        roles: stored.roles,
                        is_hydrating: false,
                    }
                } else {
                    Session::signed_out()
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to load persisted credentials");
                Session::signed_out()
            }
        };

        *self.state.write().await = next;
    }

    /// Establish a session from a raw token plus profile and roles.
    ///
    /// The token may be any shape the backend prototypes produced (bare
    /// string, number, wrapped object); it is normalized first and the
    /// call fails with no state change when nothing usable is present.
    /// Persistence happens before the in-memory swap and is best-effort.
    pub async fn sign_in(
        &self,
        raw_token: impl Into<Value>,
        user: Option<UserProfile>,
        roles: Vec<String>,
    ) -> Result<(), AuthError> {
        let token = normalize_token(&raw_token.into()).ok_or(AuthError::InvalidCredential)?;

        if let Err(e) = self.store.save(Some(&token), user.as_ref(), &roles).await {
            warn!(error = %e, "Failed to persist credentials");
        }
        self.auth.set_token(Some(token.clone())).await;

        *self.state.write().await = Session {
            user,
            token: Some(token),
            roles,
            is_hydrating: false,
        };
        Ok(())
    }

    /// Drop the session everywhere: store, request context, memory.
    pub async fn sign_out(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear stored credentials");
        }
        self.auth.set_token(None).await;
        *self.state.write().await = Session::signed_out();
    }

    /// Compute the next profile from the previous one and swap it in,
    /// leaving token and roles untouched. The combined snapshot is
    /// persisted best-effort.
    pub async fn update_user<F>(&self, updater: F)
    where
        F: FnOnce(Option<UserProfile>) -> Option<UserProfile>,
    {
        let previous = self.current().await;
        let next_user = updater(previous.user);

        if let Err(e) = self
            .store
            .save(previous.token.as_deref(), next_user.as_ref(), &previous.roles)
            .await
        {
            warn!(error = %e, "Failed to persist updated user profile");
        }

        self.state.write().await.user = next_user;
    }

    /// Replace the profile outright; the "replacement value" form of
    /// [`update_user`](Self::update_user).
    pub async fn replace_user(&self, user: Option<UserProfile>) {
        self.update_user(move |_| user).await;
    }
}
