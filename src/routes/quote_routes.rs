use axum::{routing::{get, post}, Router};
use crate::controllers::quote_controller::{
    // Calculator
    calculate_quote,
    // Stored quotes (read-only)
    list_quotes, get_quote,
    // Service
    health,
};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router.
/// The calculator form posts to `/api/calculate/`; both spellings are routed.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/calculate",    post(calculate_quote))
        .route("/calculate/",   post(calculate_quote))
        .route("/quotes",       get(list_quotes))
        .route("/quotes/{id}",  get(get_quote))
        .route("/health",       get(health))
        .with_state(state)
}
