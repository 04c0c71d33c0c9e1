//! HTTP API handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::app::App;
use crate::error::{AppError, AuthError, MarketError, ValidationError, WalletError};
use crate::market::{parse_categories, Category, MarketFilter, Side};
use crate::notification::Notification;
use crate::trading::BetQuote;
use crate::views::create_market::parse_date;
use crate::views::{
    ActionOutcome, AuthForm, AuthMode, BetForm, MarketDetailView, MarketListState, MarketListView,
    NavbarView, Page, ProfileView,
};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// The betting app.
    pub app: Arc<App>,
    /// Whether the server is ready to serve views.
    pub ready: Arc<AtomicBool>,
    /// Prometheus handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("app", &self.app)
            .field("ready", &self.is_ready())
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl AppState {
    /// Create new app state.
    pub fn new(app: Arc<App>) -> Self {
        Self {
            app,
            ready: Arc::new(AtomicBool::new(false)),
            metrics: None,
        }
    }

    /// Attach the Prometheus handle rendered at `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Set ready state.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Check if ready.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// Error response: the status code plus the toast the client should show.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError(err.into())
    }
}

/// HTTP status for an app error.
pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation(ValidationError::AlreadySubmitting) => StatusCode::CONFLICT,
        AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Market(MarketError::NotFound { .. }) => StatusCode::NOT_FOUND,
        AppError::Auth(AuthError::NotSignedIn | AuthError::InvalidCredentials) => {
            StatusCode::UNAUTHORIZED
        }
        AppError::Auth(AuthError::EmailTaken) => StatusCode::CONFLICT,
        AppError::Wallet(WalletError::NotAuthenticated) => StatusCode::UNAUTHORIZED,
        AppError::Wallet(WalletError::AlreadyConnecting | WalletError::Superseded) => {
            StatusCode::CONFLICT
        }
        AppError::Market(_)
        | AppError::Auth(_)
        | AppError::Wallet(_)
        | AppError::Submission(_)
        | AppError::Http(_) => StatusCode::BAD_GATEWAY,
        AppError::Config(_) | AppError::Json(_) | AppError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Toast for the client.
    pub notification: Notification,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            warn!(status = %status, "Request failed: {}", self.0);
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
            notification: Notification::from(&self.0),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether service is ready.
    pub ready: bool,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Readiness check handler - returns 200 if ready, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.is_ready();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(ReadyResponse { ready }))
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed".to_string(),
        ),
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub path: Option<String>,
}

/// Render the view at `?path=`. Not-found views carry a 404.
pub async fn page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<(StatusCode, Json<Page>), ApiError> {
    let path = query.path.as_deref().unwrap_or("/");
    let page = state.app.page(path).await?;
    let status = if page.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    Ok((status, Json(page)))
}

pub async fn navbar(State(state): State<AppState>) -> Json<NavbarView> {
    Json(state.app.navbar())
}

#[derive(Debug, Deserialize)]
pub struct MarketsQuery {
    /// Search text.
    #[serde(default)]
    pub q: Option<String>,
    /// Comma-separated categories.
    #[serde(default)]
    pub categories: Option<String>,
}

pub async fn list_markets(
    State(state): State<AppState>,
    Query(query): Query<MarketsQuery>,
) -> ApiResult<MarketListView> {
    let categories = parse_categories(query.categories.as_deref().unwrap_or_default())?;
    let list = MarketListState::with_filter(MarketFilter::new(query.q.unwrap_or_default(), categories));
    Ok(Json(state.app.market_list(&list).await?))
}

pub async fn market_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MarketDetailView> {
    let form = state.app.bet_form();
    Ok(Json(state.app.market_detail(&id, &form).await?))
}

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    #[serde(default)]
    pub side: Side,
    pub amount: String,
}

pub async fn quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<QuoteQuery>,
) -> ApiResult<BetQuote> {
    Ok(Json(state.app.quote(&id, query.side, &query.amount).await?))
}

#[derive(Debug, Deserialize)]
pub struct BetRequest {
    pub amount: String,
    #[serde(default)]
    pub side: Side,
}

pub async fn place_bet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<BetRequest>,
) -> ApiResult<ActionOutcome> {
    let form = BetForm::with(req.amount, req.side);
    Ok(Json(state.app.place_bet(&id, &form).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateMarketRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<Category>,
    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub end_date: Option<String>,
    /// Defaults to the configured initial funding.
    #[serde(default)]
    pub initial_funding: Option<String>,
}

pub async fn create_market(
    State(state): State<AppState>,
    Json(req): Json<CreateMarketRequest>,
) -> ApiResult<ActionOutcome> {
    let mut form = state.app.create_form();
    form.title = req.title;
    form.description = req.description;
    form.category = req.category;
    form.end_date = match req.end_date.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Some(parse_date(s)?),
        _ => None,
    };
    if let Some(funding) = req.initial_funding {
        form.initial_funding = funding;
    }
    Ok(Json(state.app.create_market(&form).await?))
}

pub async fn profile(State(state): State<AppState>) -> ApiResult<ProfileView> {
    Ok(Json(state.app.profile().await?))
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(creds): Json<Credentials>,
) -> ApiResult<ActionOutcome> {
    let form = AuthForm::new(creds.email, creds.password);
    Ok(Json(state.app.authenticate(AuthMode::SignIn, &form).await?))
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(creds): Json<Credentials>,
) -> ApiResult<ActionOutcome> {
    let form = AuthForm::new(creds.email, creds.password);
    Ok(Json(state.app.authenticate(AuthMode::SignUp, &form).await?))
}

pub async fn sign_out(State(state): State<AppState>) -> Json<ActionOutcome> {
    Json(state.app.sign_out().await)
}

pub async fn connect_wallet(State(state): State<AppState>) -> ApiResult<ActionOutcome> {
    Ok(Json(state.app.connect_wallet().await?))
}

pub async fn disconnect_wallet(State(state): State<AppState>) -> Json<ActionOutcome> {
    Json(state.app.disconnect_wallet())
}
