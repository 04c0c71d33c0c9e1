//! User-visible notifications (toasts).

use serde::Serialize;

use crate::error::{AppError, AuthError, MarketError, ValidationError, WalletError};

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Default,
    Destructive,
}

/// A toast shown to the user after an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Default or destructive.
    pub variant: Variant,
}

impl Notification {
    /// Informational notification.
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Default,
        }
    }

    /// Error notification.
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Destructive,
        }
    }

    /// Whether this reports a failure.
    pub fn is_error(&self) -> bool {
        self.variant == Variant::Destructive
    }
}

impl From<&ValidationError> for Notification {
    fn from(err: &ValidationError) -> Self {
        match err {
            ValidationError::InvalidAmount(_) => {
                Notification::error("Invalid amount", "Please enter a valid betting amount")
            }
            ValidationError::SideUnavailable { side } => Notification::error(
                "Side unavailable",
                format!("Betting on {} is disabled while it holds 0%", side.label()),
            ),
            ValidationError::MissingFields(_) => {
                Notification::error("Missing fields", "Please fill all required fields")
            }
            ValidationError::MissingCredentials => {
                Notification::error("Error", "Please enter your email and password")
            }
            other => Notification::error("Invalid input", other.to_string()),
        }
    }
}

impl From<&WalletError> for Notification {
    fn from(err: &WalletError) -> Self {
        match err {
            WalletError::ProviderUnavailable => Notification::error(
                "Wallet not detected",
                "Please install a browser wallet to connect your wallet",
            ),
            WalletError::NotAuthenticated => Notification::error(
                "Authentication required",
                "Please sign in to connect your wallet",
            ),
            other => Notification::error("Connection failed", other.to_string()),
        }
    }
}

impl From<&AppError> for Notification {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::Validation(e) => e.into(),
            AppError::Wallet(e) => e.into(),
            AppError::Auth(AuthError::NotSignedIn) => {
                Notification::error("Authentication required", "Please sign in to continue")
            }
            AppError::Auth(e) => Notification::error("Error", e.to_string()),
            AppError::Market(MarketError::NotFound { .. }) => Notification::error(
                "Market Not Found",
                "The betting market you're looking for doesn't exist.",
            ),
            other => Notification::error("Something went wrong", other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    #[test]
    fn validation_errors_map_to_destructive_toasts() {
        let n = Notification::from(&ValidationError::InvalidAmount("-1".into()));
        assert_eq!(n.title, "Invalid amount");
        assert!(n.is_error());

        let n = Notification::from(&AppError::from(ValidationError::MissingFields(vec!["title"])));
        assert_eq!(n.title, "Missing fields");
        assert_eq!(n.description, "Please fill all required fields");
    }

    #[test]
    fn wallet_errors_name_the_cause() {
        let n = Notification::from(&WalletError::NotAuthenticated);
        assert_eq!(n.title, "Authentication required");

        let n = Notification::from(&WalletError::ProviderUnavailable);
        assert_eq!(n.title, "Wallet not detected");

        let err = WalletError::Provider(ProviderError::Rejected {
            code: 4001,
            message: "User rejected the request.".into(),
        });
        let n = Notification::from(&err);
        assert_eq!(n.title, "Connection failed");
        assert_eq!(n.description, "User rejected the request. (code 4001)");
    }

    #[test]
    fn auth_errors_surface_provider_message() {
        let n = Notification::from(&AppError::from(AuthError::InvalidCredentials));
        assert_eq!(n.title, "Error");
        assert_eq!(n.description, "Invalid login credentials");
    }

    #[test]
    fn info_is_not_an_error() {
        assert!(!Notification::info("Bet Placed", "ok").is_error());
    }
}
