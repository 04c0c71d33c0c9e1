//! HTTP API route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{
    connect_wallet, create_market, disconnect_wallet, health, list_markets, market_detail, metrics,
    navbar, page, place_bet, profile, quote, ready, sign_in, sign_out, sign_up, AppState,
};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics))
        // Views
        .route("/api/v1/page", get(page))
        .route("/api/v1/navbar", get(navbar))
        .route("/api/v1/profile", get(profile))
        // Markets and bets
        .route("/api/v1/markets", get(list_markets).post(create_market))
        .route("/api/v1/markets/:id", get(market_detail))
        .route("/api/v1/markets/:id/quote", get(quote))
        .route("/api/v1/markets/:id/bets", post(place_bet))
        // Session and wallet
        .route("/api/v1/auth/sign-in", post(sign_in))
        .route("/api/v1/auth/sign-up", post(sign_up))
        .route("/api/v1/auth/sign-out", post(sign_out))
        .route("/api/v1/wallet/connect", post(connect_wallet))
        .route("/api/v1/wallet/disconnect", post(disconnect_wallet))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{App, AppParts};
    use crate::auth::MockIdentityProvider;
    use crate::config::Config;
    use crate::market::InMemoryMarketRepository;
    use crate::submission::SimulatedSubmitter;
    use crate::wallet::{InMemoryWalletStore, MockWalletProvider};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn state() -> AppState {
        let identity = Arc::new(MockIdentityProvider::new());
        identity.register("ada@example.com", "secret1");
        let app = App::new(
            &Config::default(),
            AppParts {
                repository: Arc::new(InMemoryMarketRepository::seeded()),
                submitter: Arc::new(SimulatedSubmitter::new(Duration::ZERO)),
                identity,
                wallet_provider: Some(Arc::new(MockWalletProvider::new(vec![
                    "0x52908400098527886E0F7030069857D2E4169EE7".to_string(),
                ]))),
                wallet_store: Arc::new(InMemoryWalletStore::new()),
            },
        );
        AppState::new(Arc::new(app))
    }

    async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = create_router(state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ready_endpoint_follows_flag() {
        let state = state();
        let router = create_router(state.clone());
        let (status, _) = get_json(&router, "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        state.set_ready(true);
        let (status, body) = get_json(&router, "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ready"], true);
    }

    #[tokio::test]
    async fn page_endpoint_resolves_routes() {
        let router = create_router(state());

        let (status, body) = get_json(&router, "/api/v1/page?path=/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"], "market_list");
        assert_eq!(body["markets"].as_array().unwrap().len(), 6);

        let (status, body) = get_json(&router, "/api/v1/page?path=/market/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["title"], "Market Not Found");

        let (status, body) = get_json(&router, "/api/v1/page?path=/profile").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"], "redirect");
        assert_eq!(body["to"], "/auth");
    }

    #[tokio::test]
    async fn markets_endpoint_filters() {
        let router = create_router(state());
        let (status, body) = get_json(&router, "/api/v1/markets?q=will&categories=crypto,sports").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<_> = body["markets"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, ["1", "3", "6"]);

        let (status, body) = get_json(&router, "/api/v1/markets?categories=weather").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["notification"]["variant"], "destructive");
    }

    #[tokio::test]
    async fn quote_and_bet_endpoints() {
        let router = create_router(state());

        let (status, body) = get_json(&router, "/api/v1/markets/2/quote?side=yes&amount=100").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["display"], "238.10 WVTK");

        let (status, body) = post_json(&router, "/api/v1/markets/2/bets", json!({"amount": "abc", "side": "no"})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["notification"]["title"], "Invalid amount");

        let (status, body) = post_json(&router, "/api/v1/markets/2/bets", json!({"amount": "50", "side": "no"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notification"]["title"], "Bet Placed");

        let (status, _) = get_json(&router, "/api/v1/markets/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_market_endpoint_validates() {
        let router = create_router(state());

        let (status, body) = post_json(&router, "/api/v1/markets", json!({"title": "Only a title"})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["notification"]["title"], "Missing fields");

        let (status, body) = post_json(
            &router,
            "/api/v1/markets",
            json!({
                "title": "Will it snow?",
                "description": "Resolves YES on snow.",
                "category": "Science",
                "end_date": "2999-01-01"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["redirect"], "/");
    }

    #[tokio::test]
    async fn auth_gates_profile_and_wallet() {
        let router = create_router(state());

        let (status, _) = get_json(&router, "/api/v1/profile").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, body) = post_json(&router, "/api/v1/wallet/connect", json!({})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["notification"]["title"], "Authentication required");

        let (status, body) = post_json(
            &router,
            "/api/v1/auth/sign-in",
            json!({"email": "ada@example.com", "password": "secret1"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notification"]["title"], "Welcome back!");

        let (status, _) = post_json(&router, "/api/v1/wallet/connect", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = get_json(&router, "/api/v1/navbar").await;
        assert_eq!(body["wallet"]["kind"], "connected");

        let (status, body) = get_json(&router, "/api/v1/profile").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "ada@example.com");
        assert_eq!(body["past_bets"]["title"], "Past Bets");

        let (status, _) = post_json(&router, "/api/v1/auth/sign-out", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = get_json(&router, "/api/v1/navbar").await;
        assert_eq!(body["wallet"]["kind"], "connect");
    }
}
