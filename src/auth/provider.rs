//! Identity provider interface and implementations.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::backend::BackendClient;
use crate::error::AuthError;

use super::Session;

/// External email/password identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register an account. Returns a session unless email confirmation is pending.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError>;

    /// Authenticate and open a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Revoke a session.
    async fn sign_out(&self, session: &Session) -> Result<(), AuthError>;
}

#[derive(Debug, Clone)]
struct Account {
    user_id: String,
    password: String,
}

/// In-memory identity provider for local runs and tests.
#[derive(Debug, Default)]
pub struct MockIdentityProvider {
    accounts: DashMap<String, Account>,
    next_id: AtomicU64,
    require_confirmation: bool,
}

impl MockIdentityProvider {
    /// Provider that opens a session on sign-up.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that withholds the session on sign-up until the email is confirmed.
    pub fn requiring_confirmation() -> Self {
        Self {
            require_confirmation: true,
            ..Self::default()
        }
    }

    /// Pre-register an account. Returns its user id.
    pub fn register(&self, email: &str, password: &str) -> String {
        let user_id = format!("user-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.accounts.insert(
            email.to_lowercase(),
            Account {
                user_id: user_id.clone(),
                password: password.to_string(),
            },
        );
        user_id
    }

    fn session_for(email: &str, account: &Account) -> Session {
        Session {
            user_id: account.user_id.clone(),
            email: email.to_lowercase(),
            access_token: Some(format!("mock-token-{}", account.user_id)),
        }
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError> {
        if self.accounts.contains_key(&email.to_lowercase()) {
            return Err(AuthError::EmailTaken);
        }
        if password.len() < 6 {
            return Err(AuthError::Provider(
                "Password should be at least 6 characters".to_string(),
            ));
        }
        self.register(email, password);
        if self.require_confirmation {
            return Ok(None);
        }
        let account = self
            .accounts
            .get(&email.to_lowercase())
            .map(|a| a.value().clone())
            .ok_or(AuthError::InvalidCredentials)?;
        Ok(Some(Self::session_for(email, &account)))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let account = self
            .accounts
            .get(&email.to_lowercase())
            .map(|a| a.value().clone())
            .ok_or(AuthError::InvalidCredentials)?;
        if account.password != password {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(Self::session_for(email, &account))
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), AuthError> {
        Ok(())
    }
}

/// User object returned by the hosted auth service.
#[derive(Debug, Clone, Deserialize)]
struct UserResponse {
    id: String,
    email: Option<String>,
}

/// Sign-in response, and sign-up response when a session is issued.
#[derive(Debug, Clone, Deserialize)]
struct SessionResponse {
    access_token: Option<String>,
    user: Option<UserResponse>,
    // Sign-up without a session returns the bare user object.
    id: Option<String>,
    email: Option<String>,
}

impl SessionResponse {
    fn into_session(self, fallback_email: &str) -> Option<Session> {
        let token = self.access_token?;
        let user = self.user?;
        Some(Session {
            user_id: user.id,
            email: user.email.unwrap_or_else(|| fallback_email.to_string()),
            access_token: Some(token),
        })
    }
}

/// Identity provider backed by a hosted GoTrue-style auth REST API.
#[derive(Debug, Clone)]
pub struct RestIdentityProvider {
    client: BackendClient,
}

impl RestIdentityProvider {
    /// Create a provider over a backend client.
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    fn map_error(message: String) -> AuthError {
        match message.as_str() {
            "Invalid login credentials" => AuthError::InvalidCredentials,
            "User already registered" => AuthError::EmailTaken,
            _ => AuthError::Provider(message),
        }
    }

    async fn post_credentials(&self, path: &str, email: &str, password: &str) -> Result<SessionResponse, AuthError> {
        let url = self.client.url(path).map_err(AuthError::Provider)?;
        let response = self
            .client
            .request(Method::POST, url, None)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::map_error(BackendClient::error_message(response).await));
        }

        response
            .json::<SessionResponse>()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError> {
        let body = self.post_credentials("auth/v1/signup", email, password).await?;
        if body.access_token.is_none() {
            debug!(user = ?body.id, email = ?body.email, "Sign-up pending email confirmation");
            return Ok(None);
        }
        Ok(body.into_session(email))
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let body = self
            .post_credentials("auth/v1/token?grant_type=password", email, password)
            .await?;
        body.into_session(email)
            .ok_or_else(|| AuthError::Provider("auth response missing session".to_string()))
    }

    #[instrument(skip(self, session), fields(user = %session.user_id))]
    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        let url = self.client.url("auth/v1/logout").map_err(AuthError::Provider)?;
        let response = self
            .client
            .request(Method::POST, url, session.access_token.as_deref())
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::map_error(BackendClient::error_message(response).await));
        }
        Ok(())
    }
}
