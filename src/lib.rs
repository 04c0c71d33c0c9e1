//! WVTK prediction-market betting app.
//!
//! A headless rendition of a binary prediction-market front end: users browse
//! YES/NO markets, quote and place bets in WVTK tokens, propose new markets,
//! sign in, and connect a chain wallet. Views render to serializable models and
//! are served as JSON over HTTP.
//!
//! # Potential return
//!
//! A stake on a side pays out in proportion to that side's share of the pool:
//!
//! ```text
//! stake:        150 WVTK on YES
//! YES share:    68%
//! ─────────────────────
//! return:       150 × 100 / 68 = 220.59 WVTK
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`market`]: Market types, filtering and the repository
//! - [`trading`]: Bet quotes and positions
//! - [`auth`]: Identity provider and session adapter
//! - [`wallet`]: Wallet provider, record store and connection adapter
//! - [`submission`]: Bet and market submission backend
//! - [`views`]: View models and form controllers
//! - [`app`]: Composition root
//! - [`api`]: HTTP API
//! - [`utils`]: Utility functions

pub mod api;
pub mod app;
pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod market;
pub mod metrics;
pub mod notification;
pub mod observe;
pub mod submission;
pub mod trading;
pub mod utils;
pub mod views;
pub mod wallet;

pub use app::App;
pub use config::Config;
pub use error::{AppError, Result};
