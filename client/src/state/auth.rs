//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `AuthStore` exists per process, created at application start and torn
//! down never. Route guards and identity-aware components read its snapshot;
//! all mutation goes through the action methods, which mirror the server's
//! auth endpoints and keep the busy flags honest on every exit path.
//!
//! The session proof lives in a single slot: signup/login overwrite it,
//! logout clears it, and `check_session` reads it without mutating it.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::{Arc, Mutex, MutexGuard};

use crate::net::api::{ApiError, AuthApi};
use crate::net::types::{LoginRequest, ProfilePatch, SignupRequest, User};

/// Snapshot of the authentication state.
///
/// `user` is non-`None` exactly when the most recent session check, login, or
/// signup succeeded and no logout has happened since. Each busy flag is true
/// only while its round-trip is outstanding.
#[derive(Clone, Debug, Default)]
pub struct AuthState {
    pub user: Option<User>,
    pub checking_session: bool,
    pub signing_up: bool,
    pub logging_in: bool,
    pub updating_profile: bool,
    /// Message from the last failed signup/login/update, for display.
    pub last_error: Option<String>,
}

/// Process-wide auth store: the snapshot, the session-proof slot, and the
/// transport used to reconcile them against the server.
pub struct AuthStore {
    api: Arc<dyn AuthApi>,
    state: Mutex<AuthState>,
    proof: Mutex<Option<String>>,
}

impl AuthStore {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>) -> Self {
        Self::with_proof(api, None)
    }

    /// Create a store rehydrated with a proof persisted from a prior run.
    #[must_use]
    pub fn with_proof(api: Arc<dyn AuthApi>, proof: Option<String>) -> Self {
        Self { api, state: Mutex::new(AuthState::default()), proof: Mutex::new(proof) }
    }

    /// Current snapshot, cloned for free reading by any number of observers.
    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.state().clone()
    }

    /// Currently held session proof, for the host app to persist.
    #[must_use]
    pub fn proof(&self) -> Option<String> {
        self.proof.lock().expect("proof slot poisoned").clone()
    }

    fn state(&self) -> MutexGuard<'_, AuthState> {
        self.state.lock().expect("auth state poisoned")
    }

    fn set_proof(&self, proof: Option<String>) {
        *self.proof.lock().expect("proof slot poisoned") = proof;
    }

    /// Silent background probe, typically run once at application start.
    ///
    /// Any failure — including having no stored proof — leaves `user` empty
    /// without surfacing an error.
    pub async fn check_session(&self) {
        {
            let mut state = self.state();
            if state.checking_session {
                return;
            }
            state.checking_session = true;
        }

        let user = match self.proof() {
            Some(token) => match self.api.check(&token).await {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::debug!(error = %e, "session check failed");
                    None
                }
            },
            None => None,
        };

        let mut state = self.state();
        state.user = user;
        state.checking_session = false;
    }

    /// Register a new account; on success the returned identity and proof
    /// become current.
    pub async fn signup(&self, request: SignupRequest) {
        {
            let mut state = self.state();
            if state.signing_up {
                return;
            }
            state.signing_up = true;
            state.last_error = None;
        }

        match self.api.signup(&request).await {
            Ok(session) => {
                self.set_proof(Some(session.token));
                let mut state = self.state();
                state.user = Some(session.user);
                state.signing_up = false;
            }
            Err(e) => {
                let mut state = self.state();
                state.last_error = Some(e.message());
                state.signing_up = false;
            }
        }
    }

    /// Log in with credentials; on success the returned identity and proof
    /// become current.
    pub async fn login(&self, request: LoginRequest) {
        {
            let mut state = self.state();
            if state.logging_in {
                return;
            }
            state.logging_in = true;
            state.last_error = None;
        }

        match self.api.login(&request).await {
            Ok(session) => {
                self.set_proof(Some(session.token));
                let mut state = self.state();
                state.user = Some(session.user);
                state.logging_in = false;
            }
            Err(e) => {
                let mut state = self.state();
                state.last_error = Some(e.message());
                state.logging_in = false;
            }
        }
    }

    /// Clear the local identity and proof immediately, then fire the server
    /// revocation best-effort. The UI never blocks on the revoke call.
    pub async fn logout(&self) {
        let proof = self.proof.lock().expect("proof slot poisoned").take();
        {
            let mut state = self.state();
            state.user = None;
            state.last_error = None;
        }

        if let Some(token) = proof {
            if let Err(e) = self.api.logout(&token).await {
                tracing::debug!(error = %e, "logout revocation failed");
            }
        }
    }

    /// Submit a partial profile update; on success the updated projection
    /// replaces the current user.
    pub async fn update_profile(&self, patch: ProfilePatch) {
        {
            let mut state = self.state();
            if state.updating_profile {
                return;
            }
            state.updating_profile = true;
            state.last_error = None;
        }

        let result = match self.proof() {
            Some(token) => self.api.update_profile(&token, &patch).await,
            None => Err(ApiError::Server {
                kind: "unauthenticated".to_owned(),
                message: "Authentication required".to_owned(),
            }),
        };

        match result {
            Ok(user) => {
                let mut state = self.state();
                state.user = Some(user);
                state.updating_profile = false;
            }
            Err(e) => {
                let mut state = self.state();
                state.last_error = Some(e.message());
                state.updating_profile = false;
            }
        }
    }
}
