//! End-to-end tests over the public API.
//!
//! Everything runs in-process: in-memory identity and wallet store, a scripted
//! wallet provider and a zero-delay submitter. The HTTP test binds a real
//! listener on 127.0.0.1.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use wvtk_markets::api::{create_router, AppState};
use wvtk_markets::app::{App, AppParts};
use wvtk_markets::auth::MockIdentityProvider;
use wvtk_markets::config::Config;
use wvtk_markets::market::{Category, InMemoryMarketRepository, Side};
use wvtk_markets::submission::SimulatedSubmitter;
use wvtk_markets::views::{AuthForm, AuthMode, BetForm, MarketListState, Page};
use wvtk_markets::wallet::{InMemoryWalletStore, MockWalletProvider, WalletStatus};

const ADDRESS: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

fn test_config() -> Config {
    Config {
        submission_delay_ms: 0,
        ..Config::default()
    }
}

fn build_app(provider: Arc<MockWalletProvider>) -> App {
    App::new(
        &test_config(),
        AppParts {
            repository: Arc::new(InMemoryMarketRepository::seeded()),
            submitter: Arc::new(SimulatedSubmitter::new(Duration::ZERO)),
            identity: Arc::new(MockIdentityProvider::new()),
            wallet_provider: Some(provider),
            wallet_store: Arc::new(InMemoryWalletStore::new()),
        },
    )
}

#[tokio::test]
async fn browse_bet_and_connect_journey() {
    let provider = Arc::new(MockWalletProvider::new(vec![ADDRESS.to_string()]));
    let app = build_app(provider.clone());

    // Browse and filter
    let mut list = MarketListState::new();
    list.toggle_category(Category::Crypto);
    list.set_query("ethereum");
    let view = app.market_list(&list).await.unwrap();
    assert_eq!(view.markets.len(), 1);
    assert_eq!(view.markets[0].id, "6");

    // Quote and bet without an account
    let quote = app.quote("1", Side::Yes, "150").await.unwrap();
    assert_eq!(quote.potential_return, dec!(220.59));
    let outcome = app
        .place_bet("1", &BetForm::with("150", Side::Yes))
        .await
        .unwrap();
    assert_eq!(outcome.notification.description, "You bet 150 WVTK on YES");

    // Wallet needs a session
    assert!(app.connect_wallet().await.is_err());
    assert_eq!(provider.total_calls(), 0);

    // Sign up opens a session with the in-memory provider
    let outcome = app
        .authenticate(AuthMode::SignUp, &AuthForm::new("grace@example.com", "hopper1"))
        .await
        .unwrap();
    assert_eq!(outcome.notification.title, "Account created");
    assert!(app.auth().is_signed_in());

    // Connect: chain is added, first account is used
    let mut wallet_rx = app.wallet().subscribe();
    app.connect_wallet().await.unwrap();
    assert_eq!(provider.add_calls(), 1);
    wallet_rx.changed().await.unwrap();
    let state = wallet_rx.borrow().clone();
    assert_eq!(state.status, WalletStatus::Connected);
    assert_eq!(state.balance, dec!(1000));

    // Profile is now reachable and lists the demo holdings
    match app.page("/profile").await.unwrap() {
        Page::Profile(profile) => {
            assert_eq!(profile.email, "grace@example.com");
            assert_eq!(profile.summary.total_bets, 2);
            assert!(profile.wallet.state.is_connected());
        }
        other => panic!("expected profile, got {other:?}"),
    }

    // Sign out resets both adapters; signing back in restores the stored wallet
    app.sign_out().await;
    assert!(!app.wallet().current().is_connected());
    let calls_before = provider.total_calls();
    app.authenticate(AuthMode::SignIn, &AuthForm::new("grace@example.com", "hopper1"))
        .await
        .unwrap();
    assert!(app.wallet().current().is_connected());
    assert_eq!(provider.total_calls(), calls_before);
}

#[tokio::test]
async fn http_server_serves_views() {
    let provider = Arc::new(MockWalletProvider::new(vec![ADDRESS.to_string()]));
    let state = AppState::new(Arc::new(build_app(provider)));
    state.set_ready(true);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = create_router(state);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let base = format!("http://{addr}");
    let client = reqwest::Client::new();

    let health: Value = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let response = client
        .get(format!("{base}/api/v1/page"))
        .query(&[("path", "/market/3")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let page: Value = response.json().await.unwrap();
    assert_eq!(page["view"], "market_detail");
    assert_eq!(page["pool"], "18,700 WVTK in pool");
    assert_eq!(page["bet_form"]["amount"], "100");

    let response = client
        .post(format!("{base}/api/v1/markets/3/bets"))
        .json(&json!({"amount": "0", "side": "yes"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["notification"]["description"], "Please enter a valid betting amount");

    let response = client
        .get(format!("{base}/api/v1/page"))
        .query(&[("path", "/nowhere")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}
