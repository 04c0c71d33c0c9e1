//! Sign-in / sign-up page.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::auth::{AuthSession, Session};
use crate::error::AppError;
use crate::notification::Notification;

use super::{ActionOutcome, InFlight, Route};

/// Which tab of the auth page is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

/// Email/password form with its loading flag.
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    loading: InFlight,
}

impl AuthForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            loading: InFlight::default(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_active()
    }

    /// Run the form against `auth`.
    ///
    /// Returns the outcome and the session, if one was opened.
    pub async fn submit(
        &self,
        mode: AuthMode,
        auth: &AuthSession,
    ) -> Result<(ActionOutcome, Option<Session>), AppError> {
        let _guard = self.loading.begin()?;
        match mode {
            AuthMode::SignIn => {
                let session = auth.sign_in(&self.email, &self.password).await?;
                let outcome = ActionOutcome::redirect(
                    Notification::info("Welcome back!", "You have been successfully logged in"),
                    &Route::Home,
                );
                Ok((outcome, Some(session)))
            }
            AuthMode::SignUp => {
                let session = auth.sign_up(&self.email, &self.password).await?;
                let outcome = ActionOutcome::redirect(
                    Notification::info(
                        "Account created",
                        "Please check your email to verify your account",
                    ),
                    &Route::Home,
                );
                Ok((outcome, session))
            }
        }
    }
}

/// Rendered auth page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthView {
    pub modes: Vec<AuthMode>,
    /// Email of the current session, if already signed in.
    pub signed_in_as: Option<String>,
}

impl AuthView {
    pub fn render(session: Option<&Session>) -> Self {
        Self {
            modes: vec![AuthMode::SignIn, AuthMode::SignUp],
            signed_in_as: session.map(|s| s.email.clone()),
        }
    }
}
