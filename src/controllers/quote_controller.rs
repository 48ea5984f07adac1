use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use tracing::debug;

use crate::error::ApiError;
use crate::models::quote::{CalculateResponse, HealthStatus, QuoteFilter, QuoteId, StoredQuote};
use crate::services::quote_service;
use crate::shared_state::AppState;

/// POST /api/calculate
/// Calculate a solar quote
///
/// Sizes a rooftop system from the household's bill, roof area and sun exposure,
/// stores the submission together with the full-precision result and returns
/// display-rounded figures.
#[utoipa::path(
    post,
    path = "/api/calculate",
    request_body = quote_service::QuoteSubmission,
    responses(
        (status = 200, description = "Quote calculated and stored", body = CalculateResponse),
        (status = 400, description = "Invalid input values", body = crate::models::quote::ErrorResponse),
        (status = 500, description = "Unexpected failure", body = crate::models::quote::ErrorResponse)
    )
)]
pub async fn calculate_quote(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CalculateResponse>, ApiError> {
    let request = quote_service::parse_submission(&body)?;
    let (_, result) = quote_service::calculate(state.store.as_ref(), request)?;
    Ok(Json(CalculateResponse {
        success: true,
        results: (&result).into(),
    }))
}

/// GET /api/quotes
/// List stored quotes
///
/// Newest first. Optional exact filters on sun exposure and roof type, and a
/// case-insensitive search over zip code and email.
#[utoipa::path(
    get,
    path = "/api/quotes",
    params(QuoteFilter),
    responses(
        (status = 200, description = "Stored quotes, newest first", body = Vec<StoredQuote>),
        (status = 400, description = "Malformed query string", body = crate::models::quote::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::models::quote::ErrorResponse)
    )
)]
pub async fn list_quotes(
    State(state): State<AppState>,
    query: Result<Query<QuoteFilter>, QueryRejection>,
) -> Result<Json<Vec<StoredQuote>>, ApiError> {
    let Query(mut filter) = query?;
    filter.limit = Some(filter.effective_limit(state.max_list_limit));
    Ok(Json(state.store.list(&filter)?))
}

/// GET /api/quotes/{id}
/// Get a stored quote
#[utoipa::path(
    get,
    path = "/api/quotes/{id}",
    params(
        ("id" = i64, Path, description = "Quote ID")
    ),
    responses(
        (status = 200, description = "Stored quote", body = StoredQuote),
        (status = 400, description = "Malformed quote ID", body = crate::models::quote::ErrorResponse),
        (status = 404, description = "Quote not found", body = crate::models::quote::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::models::quote::ErrorResponse)
    )
)]
pub async fn get_quote(
    path: Result<Path<QuoteId>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<StoredQuote>, ApiError> {
    let Path(id) = path?;
    let quote = state.store.get(id)?.ok_or(ApiError::NotFound)?;
    debug!("Serving #{} {}", quote.id, quote);
    Ok(Json(quote))
}

/// GET /api/health
/// Service health
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthStatus),
        (status = 500, description = "Store unavailable", body = crate::models::quote::ErrorResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    Ok(Json(HealthStatus {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        quotes_stored: state.store.count()?,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::db::{QuoteRepository, SqliteQuoteStore};
    use crate::error::QuoteError;
    use crate::models::quote::{QuoteRequest, QuoteResult};
    use crate::routes::quote_routes::api_routes;
    use crate::shared_state::AppState;

    use super::*;

    struct BrokenStore;

    impl QuoteRepository for BrokenStore {
        fn save(&self, _: &QuoteRequest, _: &QuoteResult) -> Result<QuoteId, QuoteError> {
            Err(QuoteError::LockPoisoned)
        }
        fn get(&self, _: QuoteId) -> Result<Option<StoredQuote>, QuoteError> {
            Err(QuoteError::LockPoisoned)
        }
        fn list(&self, _: &QuoteFilter) -> Result<Vec<StoredQuote>, QuoteError> {
            Err(QuoteError::LockPoisoned)
        }
        fn count(&self) -> Result<u64, QuoteError> {
            Err(QuoteError::LockPoisoned)
        }
    }

    fn app() -> (Router, Arc<SqliteQuoteStore>) {
        let store = Arc::new(SqliteQuoteStore::connect("sqlite::memory:").unwrap());
        let router = Router::new().nest("/api", api_routes(AppState::new(store.clone(), 2)));
        (router, store)
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(router, req).await
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
        send(router, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn send(router: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = router.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_calculate_valid_data() {
        let (router, _) = app();
        let (status, body) = post_json(
            router,
            "/api/calculate",
            json!({
                "zipCode": "90210",
                "monthlyBill": 250,
                "roofSize": 2000,
                "roofType": "asphalt",
                "sunExposure": "excellent",
                "electricityRate": 0.13
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        let results = &body["results"];
        assert_eq!(results["systemSize"], json!(30.0));
        assert_eq!(results["panelCount"], json!(90));
        assert_eq!(results["annualProduction"], json!(36000));
        assert_eq!(results["coveragePercent"], json!(100));
        assert_eq!(results["systemCost"], json!(90000));
        assert_eq!(results["taxCredit"], json!(27000));
        assert_eq!(results["netCost"], json!(63000));
        assert_eq!(results["paybackYears"], json!(13.5));
        assert_eq!(results["treesEquivalent"], json!(690));
        assert_eq!(results["carsOffRoad"], json!(3.68));
        assert_eq!(results["lifetimeEnergy"], json!(900.0));
    }

    #[tokio::test]
    async fn test_calculate_creates_quote() {
        let (router, store) = app();
        let (status, _) = post_json(
            router,
            "/api/calculate/",
            json!({
                "zipCode": "10001",
                "monthlyBill": 150,
                "roofSize": 1500,
                "roofType": "metal",
                "sunExposure": "good",
                "electricityRate": 0.15
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.count().unwrap(), 1);
        let latest = store.list(&QuoteFilter::default()).unwrap().remove(0);
        assert_eq!(latest.request.zip_code, "10001");
        assert_eq!(latest.request.monthly_bill, 150.0);
    }

    #[tokio::test]
    async fn test_numeric_zip_code_is_accepted() {
        let (router, store) = app();
        let (status, body) = post_json(
            router,
            "/api/calculate",
            json!({"zipCode": 90210, "monthlyBill": 250, "roofSize": 2000}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"]["systemSize"], json!(30.0));
        let latest = store.list(&QuoteFilter::default()).unwrap().remove(0);
        assert_eq!(latest.request.zip_code, "90210");
    }

    #[tokio::test]
    async fn test_invalid_values_are_rejected_without_persisting() {
        for payload in [
            json!({"zipCode": "90210", "monthlyBill": -100, "roofSize": 2000, "electricityRate": 0.13}),
            json!({"zipCode": "90210", "monthlyBill": 250, "roofSize": 0}),
            json!({"monthlyBill": 250, "roofSize": 2000, "electricityRate": 0}),
            json!({"monthlyBill": "lots", "roofSize": 2000}),
            json!({}),
        ] {
            let (router, store) = app();
            let (status, body) = post_json(router, "/api/calculate", payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({"error": "Invalid input values"}));
            assert_eq!(store.count().unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_server_error() {
        let router = Router::new().nest("/api", api_routes(AppState::new(Arc::new(BrokenStore), 50)));
        let (status, body) = post_json(router, "/api/calculate", json!({"monthlyBill": 100, "roofSize": 800})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], json!("quote store lock poisoned"));
    }

    #[tokio::test]
    async fn test_get_and_list_quotes() {
        let (router, store) = app();
        for zip in ["11111", "22222", "33333"] {
            let (status, _) = post_json(
                router.clone(),
                "/api/calculate",
                json!({"zipCode": zip, "monthlyBill": 120, "roofSize": 900, "sunExposure": "moderate"}),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        // max_list_limit is 2 in this app
        let (status, body) = get(router.clone(), "/api/quotes?limit=10").await;
        assert_eq!(status, StatusCode::OK);
        let listed = body.as_array().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0]["request"]["zip_code"], json!("33333"));

        let (_, body) = get(router.clone(), "/api/quotes?search=222").await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let id = store.list(&QuoteFilter::default()).unwrap()[0].id;
        let (status, body) = get(router.clone(), &format!("/api/quotes/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], json!(id));
        assert_eq!(body["request"]["sun_exposure"], json!("moderate"));

        let (status, body) = get(router, "/api/quotes/9999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Quote not found"}));
    }

    #[tokio::test]
    async fn test_malformed_query_and_path_are_json_errors() {
        let (router, _) = app();
        for uri in ["/api/quotes?limit=-1", "/api/quotes?limit=ten", "/api/quotes/abc"] {
            let (status, body) = get(router.clone(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()), "{uri}: {body}");
        }
    }

    #[tokio::test]
    async fn test_health_reports_stored_quotes() {
        let (router, _) = app();
        post_json(router.clone(), "/api/calculate", json!({"monthlyBill": 90, "roofSize": 700})).await;
        let (status, body) = get(router, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("healthy"));
        assert_eq!(body["quotes_stored"], json!(1));
    }
}
