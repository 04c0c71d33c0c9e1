//! Auth session adapter: owns the current session and talks to the identity provider.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::error::{AppError, ValidationError};
use crate::metrics;
use crate::observe::Observable;

use super::provider::IdentityProvider;
use super::Session;

/// Current-session holder. Views read it; only this adapter mutates it.
pub struct AuthSession {
    provider: Arc<dyn IdentityProvider>,
    session: Observable<Option<Session>>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("session", &self.session.get())
            .finish_non_exhaustive()
    }
}

fn require_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}

impl AuthSession {
    /// Create a signed-out adapter over `provider`.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            session: Observable::new(None),
        }
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Option<Session> {
        self.session.get()
    }

    /// Whether a session exists.
    pub fn is_signed_in(&self) -> bool {
        self.session.get().is_some()
    }

    /// Receiver notified whenever the session appears or disappears.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    /// Sign in with email and password.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        require_credentials(email, password)?;
        match self.provider.sign_in(email.trim(), password).await {
            Ok(session) => {
                info!(user = %session.user_id, "Signed in");
                metrics::inc_auth_successes("sign_in");
                self.session.set(Some(session.clone()));
                Ok(session)
            }
            Err(e) => {
                warn!("Sign-in failed: {}", e);
                metrics::inc_auth_failures("sign_in");
                Err(e.into())
            }
        }
    }

    /// Register an account. A session is opened only if the provider issues one.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, AppError> {
        require_credentials(email, password)?;
        match self.provider.sign_up(email.trim(), password).await {
            Ok(session) => {
                metrics::inc_auth_successes("sign_up");
                if let Some(s) = &session {
                    info!(user = %s.user_id, "Signed up with session");
                    self.session.set(Some(s.clone()));
                } else {
                    info!("Signed up, awaiting email confirmation");
                }
                Ok(session)
            }
            Err(e) => {
                warn!("Sign-up failed: {}", e);
                metrics::inc_auth_failures("sign_up");
                Err(e.into())
            }
        }
    }

    /// Drop the session. Provider errors are logged; the local session is always cleared.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) {
        let Some(session) = self.session.set(None) else {
            return;
        };
        if let Err(e) = self.provider.sign_out(&session).await {
            warn!(user = %session.user_id, "Provider sign-out failed: {}", e);
        }
        info!(user = %session.user_id, "Signed out");
    }
}
