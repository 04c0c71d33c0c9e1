//! Unified error types for the betting app.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::market::Side;

/// Unified error type for the betting app.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Form validation error.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Market lookup error.
    #[error("market error: {0}")]
    Market(#[from] MarketError),

    /// Wallet connection error.
    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),

    /// Authentication error.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Bet or market submission error.
    #[error("submission error: {0}")]
    Submission(#[from] SubmissionError),

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Form input errors. None of these mutate any state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Stake is missing, non-numeric, zero or negative.
    #[error("invalid bet amount: {0:?}")]
    InvalidAmount(String),

    /// The chosen side has a 0% share and cannot be bet on.
    #[error("betting on {side} is unavailable at 0%")]
    SideUnavailable {
        /// Side that was chosen.
        side: Side,
    },

    /// Market percentage outside 0..=100.
    #[error("invalid market percentage: {0}")]
    InvalidPercentage(Decimal),

    /// Required form fields were left empty.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Resolution date lies in the past.
    #[error("resolution date {date} is in the past")]
    DateInPast {
        /// The rejected date.
        date: time::Date,
    },

    /// Resolution date could not be parsed.
    #[error("invalid resolution date: {0:?}")]
    InvalidDate(String),

    /// Initial funding is not a number.
    #[error("invalid initial funding: {0:?}")]
    InvalidFunding(String),

    /// Category name not in the fixed set.
    #[error("unknown category: {0:?}")]
    UnknownCategory(String),

    /// Email or password left empty.
    #[error("email and password are required")]
    MissingCredentials,

    /// Operation already in flight for this form.
    #[error("a submission is already in progress")]
    AlreadySubmitting,
}

/// Market lookup errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// No market with this id.
    #[error("market {id} not found")]
    NotFound {
        /// Requested market id.
        id: String,
    },

    /// Repository backend failed.
    #[error("market repository failed: {0}")]
    Repository(String),
}

/// Failure reported by the external wallet provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider does not know the requested chain and it must be added first.
    #[error("chain {chain_id} is not known to the wallet")]
    UnknownChain {
        /// Requested chain id (hex).
        chain_id: String,
    },

    /// The provider rejected the request.
    #[error("{message} (code {code})")]
    Rejected {
        /// EIP-1193 error code.
        code: i64,
        /// Provider message.
        message: String,
    },

    /// The provider could not be reached.
    #[error("wallet provider unreachable: {0}")]
    Transport(String),
}

impl ProviderError {
    /// EIP-1193 code for "unrecognized chain id".
    pub const UNKNOWN_CHAIN_CODE: i64 = 4902;

    /// Build a provider error from an EIP-1193 code and message.
    pub fn from_code(code: i64, message: impl Into<String>, chain_id: &str) -> Self {
        if code == Self::UNKNOWN_CHAIN_CODE {
            ProviderError::UnknownChain {
                chain_id: chain_id.to_string(),
            }
        } else {
            ProviderError::Rejected {
                code,
                message: message.into(),
            }
        }
    }
}

/// Wallet connection errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No wallet provider (browser extension or RPC bridge) is configured.
    #[error("no wallet provider detected")]
    ProviderUnavailable,

    /// No authenticated session exists.
    #[error("sign in to connect your wallet")]
    NotAuthenticated,

    /// The provider failed a request.
    #[error("{0}")]
    Provider(#[from] ProviderError),

    /// The provider returned an empty account list.
    #[error("wallet returned no accounts")]
    NoAccounts,

    /// The provider returned something that is not a chain address.
    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),

    /// The wallet-record store failed.
    #[error("wallet store failed: {0}")]
    Store(String),

    /// A connect attempt is already running.
    #[error("wallet connection already in progress")]
    AlreadyConnecting,

    /// A disconnect, sign-out or new session landed while the connect was running.
    #[error("wallet connection was interrupted")]
    Superseded,
}

/// Identity provider errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Wrong email or password.
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// Email already registered.
    #[error("User already registered")]
    EmailTaken,

    /// Operation requires a session.
    #[error("not signed in")]
    NotSignedIn,

    /// Provider returned an error message.
    #[error("{0}")]
    Provider(String),
}

/// Submission backend errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// Backend rejected the submission.
    #[error("submission rejected: {0}")]
    Rejected(String),

    /// Backend could not be reached.
    #[error("submission backend unavailable: {0}")]
    Unavailable(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
