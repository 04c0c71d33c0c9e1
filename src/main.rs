//! WVTK prediction-market server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wvtk_markets::api::{create_router, AppState};
use wvtk_markets::config::Config;
use wvtk_markets::market::{parse_categories, MarketFilter, Side};
use wvtk_markets::metrics;
use wvtk_markets::utils::{format_amount, shutdown_signal};
use wvtk_markets::views::MarketListState;
use wvtk_markets::App;

/// WVTK prediction-market server.
#[derive(Parser, Debug)]
#[command(name = "wvtk-markets")]
#[command(about = "Prediction-market betting app served as a JSON view API")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// List markets, optionally filtered.
    ListMarkets {
        /// Case-insensitive search text.
        #[arg(short, long, default_value = "")]
        query: String,

        /// Comma-separated categories (e.g. "crypto,sports").
        #[arg(short, long, default_value = "")]
        category: String,
    },

    /// Quote the potential return of a stake.
    Quote {
        /// Market id.
        #[arg(short, long)]
        market: String,

        /// Side to bet on.
        #[arg(short, long, default_value = "yes")]
        side: Side,

        /// Stake in WVTK.
        #[arg(short, long, default_value = "100")]
        amount: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging; config errors are reported by the subcommand
    let log_config = Config::load().unwrap_or_default();
    let filter = EnvFilter::try_new(log_config.log_directive(args.verbose))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::ListMarkets { query, category }) => cmd_list_markets(&query, &category).await,
        Some(Command::Quote {
            market,
            side,
            amount,
        }) => cmd_quote(&market, side, &amount).await,
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port)).await,
        None => cmd_serve(args.port).await,
    }
}

/// Load and validate configuration.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }
    Ok(config)
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("WVTK MARKETS - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    // Wire collaborators
    print!("Building app... ");
    match App::from_config(&config) {
        Ok(_) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("App wiring failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!(
        "  Target Chain: {} ({})",
        config.chain_name, config.target_chain_id
    );
    println!("  Chain RPC: {}", config.chain_rpc_url);
    match &config.backend_url {
        Some(url) => println!("  Backend: {}", url),
        None => println!("  Backend: in-memory"),
    }
    match &config.wallet_rpc_url {
        Some(url) => println!("  Wallet Provider: {}", url),
        None => println!("  WARNING: WALLET_RPC_URL not set, wallet connection is unavailable"),
    }
    println!(
        "  Initial Wallet Balance: {} WVTK",
        format_amount(config.initial_wallet_balance)
    );
    println!("  Default Stake: {} WVTK", config.default_stake);
    println!(
        "  Initial Funding: {} WVTK (min {})",
        config.default_initial_funding, config.min_initial_funding
    );
    println!("  Submission Delay: {}ms", config.submission_delay_ms);
    println!("  Port: {}", config.port);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Print the filtered market listing.
async fn cmd_list_markets(query: &str, category: &str) -> anyhow::Result<()> {
    let config = load_config()?;
    let app = App::from_config(&config).map_err(|e| anyhow::anyhow!(e))?;

    let categories = parse_categories(category)?;
    let state = MarketListState::with_filter(MarketFilter::new(query, categories));
    let view = app.market_list(&state).await?;

    println!("======================================================================");
    println!("WVTK MARKETS - {} of {} markets", view.markets.len(), view.total);
    println!("======================================================================");
    if let Some(message) = &view.empty_message {
        println!("{}", message);
    }
    for card in &view.markets {
        println!("[{}] {} ({})", card.id, card.title, card.category);
        println!(
            "     YES {}% / NO {}%  |  {}  |  {} participants  |  {}",
            card.yes_percentage, card.no_percentage, card.liquidity_display, card.participants, card.days_left
        );
    }
    println!("======================================================================");

    Ok(())
}

/// Print a bet quote.
async fn cmd_quote(market: &str, side: Side, amount: &str) -> anyhow::Result<()> {
    let config = load_config()?;
    let app = App::from_config(&config).map_err(|e| anyhow::anyhow!(e))?;

    let quote = app.quote(market, side, amount).await?;
    println!("Market:           {}", quote.market_id);
    println!("Side:             {} ({}%)", quote.side.label(), quote.percentage);
    println!("Stake:            {} WVTK", quote.stake);
    println!("Potential return: {}", quote.display);
    println!("Profit if right:  {:.2} WVTK", quote.profit());

    Ok(())
}

/// Serve the HTTP API until shutdown.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    // Load configuration
    info!("Loading configuration...");
    let mut config = load_config()?;
    if let Some(port) = port_override {
        config.port = port;
    }

    info!("Configuration loaded successfully");
    info!("Target chain: {} ({})", config.chain_name, config.target_chain_id);
    info!(
        "Backend: {}",
        config.backend_url.as_deref().unwrap_or("in-memory")
    );

    // Install the Prometheus recorder before describing metrics
    let metrics_handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Failed to install metrics recorder: {}", e);
            None
        }
    };
    metrics::init_metrics();

    let app = App::from_config(&config).map_err(|e| anyhow::anyhow!(e))?;
    let mut app_state = AppState::new(Arc::new(app));
    if let Some(handle) = metrics_handle {
        app_state = app_state.with_metrics(handle);
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let router = create_router(app_state.clone());
    app_state.set_ready(true);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
