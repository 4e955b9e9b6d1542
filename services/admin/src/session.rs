//! Session management
//!
//! The [`SessionStore`] owns the bearer credential and the identity resolved
//! from it. It is constructed once at startup and handed to every consumer;
//! clones share the same state.

use common::{ApiClient, ApiError, ApiResult, models::Identity};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::storage::{CREDENTIAL_KEY, Storage};

/// Readiness of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Identity resolution has not finished yet
    Loading,
    /// A credential was validated and an identity resolved
    Authenticated,
    /// No valid credential is held
    Unauthenticated,
}

/// Point-in-time copy of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub readiness: Readiness,
    pub credential: Option<String>,
    pub identity: Option<Identity>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some() && self.credential.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.identity.as_ref().is_some_and(|identity| identity.is_admin)
    }
}

#[derive(Debug)]
struct SessionState {
    credential: Option<String>,
    identity: Option<Identity>,
    readiness: Readiness,
    // Bumped on every credential change so stale resolutions can be dropped.
    generation: u64,
}

impl SessionState {
    /// Hold `credential` pending resolution; returns the new generation
    fn install(&mut self, credential: String) -> u64 {
        self.credential = Some(credential);
        self.identity = None;
        self.readiness = Readiness::Loading;
        self.generation += 1;
        self.generation
    }

    fn reset(&mut self, readiness: Readiness) {
        self.credential = None;
        self.identity = None;
        self.readiness = readiness;
        self.generation += 1;
    }
}

/// Credential and identity holder
#[derive(Clone)]
pub struct SessionStore {
    client: ApiClient,
    storage: Arc<dyn Storage>,
    state: Arc<RwLock<SessionState>>,
}

impl SessionStore {
    /// Create a store in the `Loading` state; call [`restore`](Self::restore) next
    pub fn new(client: ApiClient, storage: Arc<dyn Storage>) -> Self {
        Self {
            client,
            storage,
            state: Arc::new(RwLock::new(SessionState {
                credential: None,
                identity: None,
                readiness: Readiness::Loading,
                generation: 0,
            })),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Restore the persisted credential, if any, and resolve its identity
    pub async fn restore(&self) {
        let stored = match self.storage.get(CREDENTIAL_KEY) {
            Ok(stored) => stored.filter(|credential| !credential.trim().is_empty()),
            Err(e) => {
                warn!("Failed to read persisted credential: {}", e);
                None
            }
        };

        let Some(credential) = stored else {
            debug!("No persisted credential");
            let mut state = self.state.write();
            state.reset(Readiness::Unauthenticated);
            return;
        };

        let generation = {
            let mut state = self.state.write();
            state.install(credential.clone())
        };
        self.resolve(&credential, generation).await;
    }

    /// Re-validate the credential currently held by the store
    ///
    /// `credential` must be the one the store holds; anything else is ignored
    /// and no request is made. Any failure leaves the session logged out and
    /// nothing is reported to the caller.
    pub async fn resolve_identity(&self, credential: &str) {
        let generation = {
            let state = self.state.read();
            if state.credential.as_deref() != Some(credential) {
                debug!("Ignoring identity resolution for a credential not held");
                return;
            }
            state.generation
        };
        self.resolve(credential, generation).await;
    }

    // The result is dropped if the credential changed after `generation` was taken.
    async fn resolve(&self, credential: &str, generation: u64) {
        let result = self.client.current_user(credential).await;

        let mut state = self.state.write();
        if state.generation != generation || state.credential.as_deref() != Some(credential) {
            debug!("Discarding identity resolution for a replaced credential");
            return;
        }

        match result {
            Ok(identity) => {
                info!("Authenticated as {}", identity.username);
                state.identity = Some(identity);
                state.readiness = Readiness::Authenticated;
            }
            Err(e) => {
                if e.is_auth_failure() {
                    info!("Credential rejected: {}", e);
                } else {
                    warn!("Identity resolution failed: {}", e);
                }
                state.reset(Readiness::Unauthenticated);
                // Still under the lock: no login can persist a newer credential meanwhile.
                self.forget_persisted(Some(credential));
            }
        }
    }

    /// Adopt `credential`, persist it, and resolve its identity
    pub async fn login(&self, credential: impl Into<String>) {
        let credential = credential.into();
        let generation = {
            let mut state = self.state.write();
            let generation = state.install(credential.clone());
            if let Err(e) = self.storage.set(CREDENTIAL_KEY, &credential) {
                warn!("Failed to persist credential: {}", e);
            }
            generation
        };

        self.resolve(&credential, generation).await;
    }

    /// Exchange a username and password for a credential, then [`login`](Self::login)
    pub async fn login_with_password(&self, username: &str, password: &str) -> ApiResult<()> {
        info!("Login attempt for user: {}", username);
        let token = self.client.login(username, password).await?;
        self.login(token.access_token).await;

        if self.is_authenticated() {
            Ok(())
        } else {
            Err(ApiError::Unauthorized(
                "The issued credential was rejected".to_string(),
            ))
        }
    }

    /// Drop the credential and identity; makes no network call
    pub fn logout(&self) {
        let mut state = self.state.write();
        if state.credential.is_some() || state.identity.is_some() {
            info!("Logging out");
        }
        state.reset(Readiness::Unauthenticated);
        self.forget_persisted(None);
    }

    /// Remove the persisted credential, only if it is still `expected` when given
    fn forget_persisted(&self, expected: Option<&str>) {
        if let Some(expected) = expected {
            match self.storage.get(CREDENTIAL_KEY) {
                Ok(Some(stored)) if stored == expected => {}
                Ok(_) => return,
                Err(e) => {
                    warn!("Failed to read persisted credential: {}", e);
                    return;
                }
            }
        }

        if let Err(e) = self.storage.remove(CREDENTIAL_KEY) {
            warn!("Failed to clear persisted credential: {}", e);
        }
    }

    pub fn readiness(&self) -> Readiness {
        self.state.read().readiness
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.read().identity.clone()
    }

    pub fn credential(&self) -> Option<String> {
        self.state.read().credential.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.snapshot().is_admin()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read();
        SessionSnapshot {
            readiness: state.readiness,
            credential: state.credential.clone(),
            identity: state.identity.clone(),
        }
    }

    /// Credential to attach to an authenticated request
    pub fn bearer(&self) -> ApiResult<String> {
        self.credential().ok_or(ApiError::NotAuthenticated)
    }
}
