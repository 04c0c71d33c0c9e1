//! Authentication against an external identity provider.
//!
//! This module handles:
//! - The session type shared with the wallet adapter and views
//! - The identity provider interface (in-memory and hosted REST)
//! - The session adapter that owns the current session

pub mod provider;
pub mod session;

use serde::{Deserialize, Serialize};

pub use provider::{IdentityProvider, MockIdentityProvider, RestIdentityProvider};
pub use session::AuthSession;

/// An authenticated session issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Provider user id; wallet records are keyed by it.
    pub user_id: String,
    /// Account email.
    pub email: String,
    /// Bearer token for backend calls.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}
