use utoipa::OpenApi;
use crate::controllers::quote_controller;
use crate::models::quote;
use crate::services::quote_service;

#[derive(OpenApi)]
#[openapi(
    paths(
        quote_controller::calculate_quote,
        quote_controller::list_quotes,
        quote_controller::get_quote,
        quote_controller::health
    ),
    components(
        schemas(
            quote_service::QuoteSubmission,
            quote::CalculateResponse,
            quote::QuoteResults,
            quote::StoredQuote,
            quote::QuoteRequest,
            quote::QuoteResult,
            quote::SunExposure,
            quote::ErrorResponse,
            quote::HealthStatus
        )
    ),
    tags(
        (name = "solar-quote", description = "Residential Solar Quote API")
    )
)]
pub struct ApiDoc;
