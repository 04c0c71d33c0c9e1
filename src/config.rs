//! Application configuration loaded from environment variables.

use rust_decimal::Decimal;
use serde::Deserialize;
use url::Url;

use crate::wallet::ChainParams;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Target Network ===
    /// Chain id the wallet is switched to (hex, e.g. 0xaa36a7 for Sepolia).
    #[serde(default = "default_chain_id")]
    pub target_chain_id: String,

    /// Human-readable chain name used when adding the chain.
    #[serde(default = "default_chain_name")]
    pub chain_name: String,

    /// Native currency name.
    #[serde(default = "default_currency_name")]
    pub chain_currency_name: String,

    /// Native currency symbol.
    #[serde(default = "default_currency_symbol")]
    pub chain_currency_symbol: String,

    /// RPC endpoint advertised when adding the chain.
    #[serde(default = "default_rpc_url")]
    pub chain_rpc_url: String,

    /// Block explorer advertised when adding the chain.
    #[serde(default = "default_explorer_url")]
    pub chain_explorer_url: String,

    // === External Services ===
    /// Backend-as-a-service base URL. In-memory auth and wallet store when unset.
    #[serde(default)]
    pub backend_url: Option<String>,

    /// Public (anon) API key sent with backend requests.
    #[serde(default)]
    pub backend_anon_key: Option<String>,

    /// JSON-RPC wallet bridge. No wallet provider is available when unset.
    #[serde(default)]
    pub wallet_rpc_url: Option<String>,

    /// Timeout for outbound HTTP requests.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    // === Betting Defaults ===
    /// Balance credited to a newly connected wallet (WVTK).
    #[serde(default = "default_initial_balance")]
    pub initial_wallet_balance: Decimal,

    /// Stake prefilled in the bet form.
    #[serde(default = "default_stake")]
    pub default_stake: Decimal,

    /// Initial funding prefilled in the creation form.
    #[serde(default = "default_initial_funding")]
    pub default_initial_funding: Decimal,

    /// Advertised minimum initial funding.
    #[serde(default = "default_min_initial_funding")]
    pub min_initial_funding: Decimal,

    /// Simulated latency of bet and market submissions.
    #[serde(default = "default_submission_delay_ms")]
    pub submission_delay_ms: u64,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_chain_id() -> String {
    "0xaa36a7".to_string() // Sepolia
}

fn default_chain_name() -> String {
    "Sepolia".to_string()
}

fn default_currency_name() -> String {
    "SepoliaETH".to_string()
}

fn default_currency_symbol() -> String {
    "SEP".to_string()
}

fn default_rpc_url() -> String {
    "https://sepolia.infura.io/v3/".to_string()
}

fn default_explorer_url() -> String {
    "https://sepolia.etherscan.io".to_string()
}

fn default_http_timeout_ms() -> u64 {
    5_000
}

fn default_initial_balance() -> Decimal {
    Decimal::new(1000, 0)
}

fn default_stake() -> Decimal {
    Decimal::new(100, 0)
}

fn default_initial_funding() -> Decimal {
    Decimal::new(100, 0)
}

fn default_min_initial_funding() -> Decimal {
    Decimal::new(10, 0)
}

fn default_submission_delay_ms() -> u64 {
    1_500
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_chain_id: default_chain_id(),
            chain_name: default_chain_name(),
            chain_currency_name: default_currency_name(),
            chain_currency_symbol: default_currency_symbol(),
            chain_rpc_url: default_rpc_url(),
            chain_explorer_url: default_explorer_url(),
            backend_url: None,
            backend_anon_key: None,
            wallet_rpc_url: None,
            http_timeout_ms: default_http_timeout_ms(),
            initial_wallet_balance: default_initial_balance(),
            default_stake: default_stake(),
            default_initial_funding: default_initial_funding(),
            min_initial_funding: default_min_initial_funding(),
            submission_delay_ms: default_submission_delay_ms(),
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        self.chain_id_number()?;

        for (name, value) in [
            ("CHAIN_RPC_URL", Some(&self.chain_rpc_url)),
            ("CHAIN_EXPLORER_URL", Some(&self.chain_explorer_url)),
            ("BACKEND_URL", self.backend_url.as_ref()),
            ("WALLET_RPC_URL", self.wallet_rpc_url.as_ref()),
        ] {
            if let Some(value) = value {
                Url::parse(value).map_err(|e| format!("{name} is not a valid URL: {e}"))?;
            }
        }

        if self.backend_url.is_some() && self.backend_anon_key.is_none() {
            return Err("BACKEND_ANON_KEY is required when BACKEND_URL is set".to_string());
        }

        if self.initial_wallet_balance < Decimal::ZERO {
            return Err("INITIAL_WALLET_BALANCE must not be negative".to_string());
        }

        if self.default_stake <= Decimal::ZERO {
            return Err("DEFAULT_STAKE must be positive".to_string());
        }

        if self.min_initial_funding <= Decimal::ZERO {
            return Err("MIN_INITIAL_FUNDING must be positive".to_string());
        }

        Ok(())
    }

    /// Target chain id as a number.
    pub fn chain_id_number(&self) -> Result<u64, String> {
        let hex = self
            .target_chain_id
            .strip_prefix("0x")
            .ok_or_else(|| "TARGET_CHAIN_ID must start with 0x".to_string())?;
        u64::from_str_radix(hex, 16).map_err(|e| format!("TARGET_CHAIN_ID is not hex: {e}"))
    }

    /// Parameters used to switch to (or add) the target chain.
    pub fn chain_params(&self) -> ChainParams {
        ChainParams {
            chain_id: self.target_chain_id.to_lowercase(),
            chain_name: self.chain_name.clone(),
            currency_name: self.chain_currency_name.clone(),
            currency_symbol: self.chain_currency_symbol.clone(),
            currency_decimals: 18,
            rpc_urls: vec![self.chain_rpc_url.clone()],
            block_explorer_urls: vec![self.chain_explorer_url.clone()],
        }
    }

    /// Tracing filter directive. `verbose` (or `VERBOSE=true`) turns on debug
    /// output for this crate; otherwise `RUST_LOG` applies.
    pub fn log_directive(&self, verbose: bool) -> &str {
        if verbose || self.verbose {
            "wvtk_markets=debug,info"
        } else {
            &self.rust_log
        }
    }

    /// Simulated submission latency.
    pub fn submission_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.submission_delay_ms)
    }

    /// Outbound HTTP timeout.
    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.http_timeout_ms)
    }
}
