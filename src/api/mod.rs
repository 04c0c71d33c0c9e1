//! HTTP API module: health, metrics, views and user operations as JSON.

pub mod handlers;
pub mod routes;

pub use handlers::{ApiError, AppState};
pub use routes::create_router;
