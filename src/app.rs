//! Composition root.
//!
//! [`App`] owns the market repository, the submission backend and the auth and
//! wallet adapters, and exposes one method per user-visible operation. Routes
//! render through [`App::page`].

use std::sync::Arc;

use rust_decimal::Decimal;
use time::{Date, OffsetDateTime};
use tracing::{info, instrument, warn};

use crate::auth::{AuthSession, IdentityProvider, MockIdentityProvider, RestIdentityProvider, Session};
use crate::backend::BackendClient;
use crate::config::Config;
use crate::error::{AppError, AuthError, MarketError};
use crate::market::{InMemoryMarketRepository, Market, MarketRepository, Side};
use crate::metrics;
use crate::notification::Notification;
use crate::submission::{SimulatedSubmitter, Submitter};
use crate::trading::{parse_stake, BetQuote, Position};
use crate::views::auth_page::AuthView;
use crate::views::create_market::CreateMarketView;
use crate::views::{
    ActionOutcome, AuthForm, AuthMode, BetForm, CreateMarketForm, MarketDetailView, MarketListState,
    MarketListView, NavbarView, NotFoundView, Page, ProfileView, Route,
};
use crate::wallet::{InMemoryWalletStore, RestWalletStore, RpcWalletProvider, WalletConnection, WalletProvider, WalletStore};

/// Collaborators an [`App`] is assembled from.
pub struct AppParts {
    pub repository: Arc<dyn MarketRepository>,
    pub submitter: Arc<dyn Submitter>,
    pub identity: Arc<dyn IdentityProvider>,
    /// `None` when no wallet is available.
    pub wallet_provider: Option<Arc<dyn WalletProvider>>,
    pub wallet_store: Arc<dyn WalletStore>,
}

/// The betting app.
pub struct App {
    repository: Arc<dyn MarketRepository>,
    submitter: Arc<dyn Submitter>,
    auth: AuthSession,
    wallet: WalletConnection,
    default_stake: Decimal,
    default_initial_funding: Decimal,
    min_initial_funding: Decimal,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("auth", &self.auth)
            .field("wallet", &self.wallet)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Assemble the app from explicit collaborators.
    pub fn new(config: &Config, parts: AppParts) -> Self {
        Self {
            repository: parts.repository,
            submitter: parts.submitter,
            auth: AuthSession::new(parts.identity),
            wallet: WalletConnection::new(
                parts.wallet_provider,
                parts.wallet_store,
                config.chain_params(),
                config.initial_wallet_balance,
            ),
            default_stake: config.default_stake,
            default_initial_funding: config.default_initial_funding,
            min_initial_funding: config.min_initial_funding,
        }
    }

    /// Wire collaborators from configuration.
    ///
    /// With a backend URL, identity and wallet records go to the hosted backend;
    /// otherwise they stay in memory. A wallet RPC URL enables wallet connection.
    pub fn from_config(config: &Config) -> Result<Self, String> {
        let (identity, wallet_store): (Arc<dyn IdentityProvider>, Arc<dyn WalletStore>) =
            match BackendClient::from_config(config).transpose()? {
                Some(client) => {
                    info!(url = ?config.backend_url, "Using hosted backend");
                    (
                        Arc::new(RestIdentityProvider::new(client.clone())),
                        Arc::new(RestWalletStore::new(client)),
                    )
                }
                None => {
                    info!("No backend configured, using in-memory identity and wallet store");
                    (
                        Arc::new(MockIdentityProvider::new()),
                        Arc::new(InMemoryWalletStore::new()),
                    )
                }
            };

        let wallet_provider = match &config.wallet_rpc_url {
            Some(url) => {
                let provider = RpcWalletProvider::new(url.clone(), config.http_timeout())
                    .map_err(|e| e.to_string())?;
                Some(Arc::new(provider) as Arc<dyn WalletProvider>)
            }
            None => {
                warn!("WALLET_RPC_URL not set, wallet connection is unavailable");
                None
            }
        };

        Ok(Self::new(
            config,
            AppParts {
                repository: Arc::new(InMemoryMarketRepository::seeded()),
                submitter: Arc::new(SimulatedSubmitter::new(config.submission_delay())),
                identity,
                wallet_provider,
                wallet_store,
            },
        ))
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    pub fn wallet(&self) -> &WalletConnection {
        &self.wallet
    }

    pub fn repository(&self) -> &dyn MarketRepository {
        self.repository.as_ref()
    }

    /// Fresh bet form with the configured default stake.
    pub fn bet_form(&self) -> BetForm {
        BetForm::new(self.default_stake)
    }

    /// Fresh creation form with the configured default funding.
    pub fn create_form(&self) -> CreateMarketForm {
        CreateMarketForm::new(self.default_initial_funding)
    }

    /// Render the page at `path` for the current session.
    #[instrument(skip(self))]
    pub async fn page(&self, path: &str) -> Result<Page, AppError> {
        let route = Route::parse(path);
        metrics::inc_page_renders(route.name());

        if route.requires_session() && !self.auth.is_signed_in() {
            return Ok(Page::redirect(&Route::Auth));
        }

        let page = match route {
            Route::Home => Page::MarketList(self.market_list(&MarketListState::new()).await?),
            Route::Create => Page::CreateMarket(self.create_market_view()),
            Route::Market(id) => match self.market_detail(&id, &self.bet_form()).await {
                Ok(view) => Page::MarketDetail(view),
                Err(AppError::Market(MarketError::NotFound { .. })) => {
                    Page::NotFound(NotFoundView::market())
                }
                Err(e) => return Err(e),
            },
            Route::Profile => Page::Profile(self.profile().await?),
            Route::Auth => Page::Auth(AuthView::render(self.auth.current().as_ref())),
            Route::Unknown(path) => Page::NotFound(NotFoundView::page(&path)),
        };
        Ok(page)
    }

    pub fn navbar(&self) -> NavbarView {
        NavbarView::render(self.auth.current().as_ref(), &self.wallet.current())
    }

    /// Render the listing with `state`'s filter.
    pub async fn market_list(&self, state: &MarketListState) -> Result<MarketListView, AppError> {
        let markets = self.repository.list_markets().await?;
        Ok(state.render(&markets, OffsetDateTime::now_utc()))
    }

    async fn find_market(&self, id: &str) -> Result<Market, AppError> {
        self.repository
            .get_market(id)
            .await?
            .ok_or_else(|| MarketError::NotFound { id: id.to_string() }.into())
    }

    async fn my_positions(&self) -> Result<Option<Vec<Position>>, AppError> {
        match self.auth.current() {
            Some(session) => Ok(Some(self.repository.list_positions(&session.user_id).await?)),
            None => Ok(None),
        }
    }

    /// Render a market's detail view with `form`.
    pub async fn market_detail(&self, id: &str, form: &BetForm) -> Result<MarketDetailView, AppError> {
        let market = self.find_market(id).await?;
        let positions = self.my_positions().await?;
        Ok(MarketDetailView::render(
            &market,
            form,
            positions.as_deref(),
            OffsetDateTime::now_utc(),
        ))
    }

    /// Quote a stake on one side of a market.
    pub async fn quote(&self, id: &str, side: Side, amount: &str) -> Result<BetQuote, AppError> {
        let market = self.find_market(id).await?;
        let stake = parse_stake(amount)?;
        Ok(BetQuote::new(&market, side, stake)?)
    }

    /// Place a bet on market `id`.
    pub async fn place_bet(&self, id: &str, form: &BetForm) -> Result<ActionOutcome, AppError> {
        let market = self.find_market(id).await?;
        form.place(&market, self.submitter.as_ref()).await
    }

    pub fn create_market_view(&self) -> CreateMarketView {
        CreateMarketView::render(today(), self.default_initial_funding, self.min_initial_funding)
    }

    /// Submit a new market proposal.
    pub async fn create_market(&self, form: &CreateMarketForm) -> Result<ActionOutcome, AppError> {
        form.submit(today(), self.submitter.as_ref()).await
    }

    /// Render the profile of the signed-in user.
    pub async fn profile(&self) -> Result<ProfileView, AppError> {
        let session = self.auth.current().ok_or(AuthError::NotSignedIn)?;
        let markets = self.repository.list_markets().await?;
        let positions = self.repository.list_positions(&session.user_id).await?;
        Ok(ProfileView::render(
            &session,
            self.wallet.current(),
            &positions,
            &markets,
            OffsetDateTime::now_utc(),
        ))
    }

    /// Sign in or sign up. A new session restores the user's stored wallet.
    pub async fn authenticate(&self, mode: AuthMode, form: &AuthForm) -> Result<ActionOutcome, AppError> {
        let (outcome, session) = form.submit(mode, &self.auth).await?;
        if let Some(session) = session {
            self.restore_wallet(&session).await;
        }
        Ok(outcome)
    }

    /// Restore the stored wallet for `session`. Failures are logged and leave the wallet disconnected.
    pub async fn restore_wallet(&self, session: &Session) {
        if let Err(e) = self.wallet.restore(session).await {
            warn!(user = %session.user_id, "Wallet restore failed: {}", e);
        }
    }

    /// Drop the session and the wallet connection.
    pub async fn sign_out(&self) -> ActionOutcome {
        self.auth.sign_out().await;
        self.wallet.disconnect();
        ActionOutcome::redirect(
            Notification::info("Signed out", "You have been signed out"),
            &Route::Home,
        )
    }

    /// Connect the wallet for the signed-in user.
    pub async fn connect_wallet(&self) -> Result<ActionOutcome, AppError> {
        self.wallet.connect(self.auth.current().as_ref()).await?;
        Ok(ActionOutcome::notify(Notification::info(
            "Wallet connected",
            format!(
                "Your wallet has been successfully connected to {} network",
                self.wallet.chain().chain_name
            ),
        )))
    }

    pub fn disconnect_wallet(&self) -> ActionOutcome {
        self.wallet.disconnect();
        ActionOutcome::notify(Notification::info(
            "Wallet disconnected",
            "Your wallet has been disconnected",
        ))
    }
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ValidationError, WalletError};
    use crate::wallet::{MockWalletProvider, WalletRecord};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    const ADDRESS: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    struct Fixture {
        app: App,
        provider: Arc<MockWalletProvider>,
        store: Arc<InMemoryWalletStore>,
        submitter: Arc<SimulatedSubmitter>,
    }

    fn fixture() -> Fixture {
        fixture_with(MockWalletProvider::new(vec![ADDRESS.to_string()]))
    }

    fn fixture_with(provider: MockWalletProvider) -> Fixture {
        let identity = Arc::new(MockIdentityProvider::new());
        identity.register("ada@example.com", "secret1");
        identity.register("grace@example.com", "hopper1");
        let provider = Arc::new(provider);
        let store = Arc::new(InMemoryWalletStore::new());
        let submitter = Arc::new(SimulatedSubmitter::new(Duration::ZERO));
        let app = App::new(
            &Config::default(),
            AppParts {
                repository: Arc::new(InMemoryMarketRepository::seeded()),
                submitter: submitter.clone(),
                identity,
                wallet_provider: Some(provider.clone()),
                wallet_store: store.clone(),
            },
        );
        Fixture {
            app,
            provider,
            store,
            submitter,
        }
    }

    async fn sign_in(app: &App) {
        app.authenticate(AuthMode::SignIn, &AuthForm::new("ada@example.com", "secret1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn pages_resolve_routes() {
        let f = fixture();
        assert!(matches!(f.app.page("/").await.unwrap(), Page::MarketList(_)));
        assert!(matches!(f.app.page("/create").await.unwrap(), Page::CreateMarket(_)));
        assert!(matches!(f.app.page("/auth").await.unwrap(), Page::Auth(_)));
        assert!(matches!(f.app.page("/market/2").await.unwrap(), Page::MarketDetail(_)));
        assert!(f.app.page("/market/999").await.unwrap().is_not_found());
        assert!(f.app.page("/elsewhere").await.unwrap().is_not_found());
    }

    #[tokio::test]
    async fn profile_requires_session() {
        let f = fixture();
        assert_eq!(f.app.page("/profile").await.unwrap(), Page::redirect(&Route::Auth));
        assert!(matches!(
            f.app.profile().await,
            Err(AppError::Auth(AuthError::NotSignedIn))
        ));

        sign_in(&f.app).await;
        match f.app.page("/profile").await.unwrap() {
            Page::Profile(view) => {
                assert_eq!(view.email, "ada@example.com");
                assert_eq!(view.positions.len(), 2);
            }
            other => panic!("unexpected page {other:?}"),
        }
    }

    #[tokio::test]
    async fn detail_shows_positions_only_when_signed_in() {
        let f = fixture();
        let view = f.app.market_detail("1", &f.app.bet_form()).await.unwrap();
        assert!(view.my_positions.is_none());

        sign_in(&f.app).await;
        let view = f.app.market_detail("1", &f.app.bet_form()).await.unwrap();
        assert_eq!(view.my_positions.unwrap().rows.len(), 1);
    }

    #[tokio::test]
    async fn quote_and_bet_on_known_market() {
        let f = fixture();
        let quote = f.app.quote("3", Side::No, "100").await.unwrap();
        assert_eq!(quote.potential_return, dec!(181.82));

        let outcome = f
            .app
            .place_bet("3", &BetForm::with("100", Side::No))
            .await
            .unwrap();
        assert_eq!(outcome.notification.description, "You bet 100 WVTK on NO");
        assert_eq!(f.submitter.accepted(), 1);

        assert!(matches!(
            f.app.place_bet("999", &f.app.bet_form()).await,
            Err(AppError::Market(MarketError::NotFound { .. }))
        ));
        assert!(matches!(
            f.app.quote("1", Side::Yes, "0").await,
            Err(AppError::Validation(ValidationError::InvalidAmount(_)))
        ));
    }

    #[tokio::test]
    async fn creating_a_market_leaves_listing_unchanged() {
        let f = fixture();
        let mut form = f.app.create_form();
        form.title = "Will it snow?".into();
        form.description = "Resolves YES on snow.".into();
        form.category = Some(crate::market::Category::Science);
        form.end_date = Some(today());

        let outcome = f.app.create_market(&form).await.unwrap();
        assert_eq!(outcome.redirect.as_deref(), Some("/"));
        assert_eq!(f.app.repository().list_markets().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn wallet_connect_requires_sign_in() {
        let f = fixture();
        assert!(matches!(
            f.app.connect_wallet().await,
            Err(AppError::Wallet(WalletError::NotAuthenticated))
        ));
        assert_eq!(f.provider.total_calls(), 0);

        sign_in(&f.app).await;
        let outcome = f.app.connect_wallet().await.unwrap();
        assert_eq!(outcome.notification.title, "Wallet connected");
        assert!(outcome.notification.description.contains("Sepolia"));
        assert!(f.app.wallet().current().is_connected());
        assert_eq!(f.store.len(), 1);
    }

    #[tokio::test]
    async fn sign_in_restores_wallet_and_sign_out_resets_it() {
        let f = fixture();
        let session = Session {
            user_id: "user-1".into(),
            email: "ada@example.com".into(),
            access_token: None,
        };
        f.store
            .upsert(
                &session,
                &WalletRecord {
                    user_id: "user-1".into(),
                    wallet_address: ADDRESS.into(),
                    balance: dec!(420),
                },
            )
            .await
            .unwrap();

        sign_in(&f.app).await;
        assert_eq!(f.app.wallet().current().balance, dec!(420));
        assert_eq!(f.provider.total_calls(), 0);

        let outcome = f.app.sign_out().await;
        assert_eq!(outcome.redirect.as_deref(), Some("/"));
        assert!(!f.app.auth().is_signed_in());
        assert!(!f.app.wallet().current().is_connected());
    }

    #[tokio::test]
    async fn switching_users_drops_the_previous_wallet() {
        let f = fixture();
        sign_in(&f.app).await;
        f.app.connect_wallet().await.unwrap();
        assert!(f.app.wallet().current().is_connected());

        f.app
            .authenticate(AuthMode::SignIn, &AuthForm::new("grace@example.com", "hopper1"))
            .await
            .unwrap();
        assert!(!f.app.wallet().current().is_connected());
        let profile = f.app.profile().await.unwrap();
        assert_eq!(profile.email, "grace@example.com");
        assert!(profile.wallet.short_address.is_none());

        // Switching back restores the first user's own record
        sign_in(&f.app).await;
        assert_eq!(
            f.app.wallet().current().address.as_deref(),
            Some(ADDRESS)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn sign_out_during_connect_leaves_wallet_disconnected() {
        let f = fixture_with(
            MockWalletProvider::new(vec![ADDRESS.to_string()])
                .with_switch_delay(Duration::from_millis(200)),
        );
        sign_in(&f.app).await;

        let sign_out = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            f.app.sign_out().await
        };
        let (connected, _) = tokio::join!(f.app.connect_wallet(), sign_out);

        assert!(matches!(
            connected,
            Err(AppError::Wallet(WalletError::Superseded))
        ));
        assert!(!f.app.auth().is_signed_in());
        assert!(!f.app.wallet().current().is_connected());
        assert!(f.store.is_empty());
    }

    #[test]
    fn from_config_without_backend_uses_memory() {
        let app = App::from_config(&Config::default()).unwrap();
        assert!(!app.auth().is_signed_in());
        assert_eq!(app.bet_form().amount, "100");
    }
}
