use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::services::estimator::round_to;

pub type QuoteId = i64;

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Hours of direct sun the roof receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SunExposure {
    /// Full sun all day
    #[default]
    Excellent,
    /// 6-8 hours
    Good,
    /// 4-6 hours
    Moderate,
    /// Less than 4 hours
    Limited,
}

impl SunExposure {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "excellent" => Some(Self::Excellent),
            "good" => Some(Self::Good),
            "moderate" => Some(Self::Moderate),
            "limited" => Some(Self::Limited),
            _ => None,
        }
    }

    /// Unrecognized labels resolve to full sun.
    pub fn resolve(label: &str) -> Self {
        Self::from_label(label).unwrap_or_default()
    }

    pub fn multiplier(self) -> f64 {
        match self {
            Self::Excellent => 1.0,
            Self::Good => 0.85,
            Self::Moderate => 0.7,
            Self::Limited => 0.5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Moderate => "moderate",
            Self::Limited => "limited",
        }
    }
}

/// A validated quote submission, as stored.
///
/// `roof_type` and `sun_exposure` keep the label the client sent; only the
/// estimator interprets `sun_exposure`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuoteRequest {
    pub zip_code: String,
    pub monthly_bill: f64,
    /// Square feet
    pub roof_size: f64,
    /// asphalt | metal | tile | flat
    pub roof_type: String,
    /// excellent | good | moderate | limited
    pub sun_exposure: String,
    /// Currency per kWh
    pub electricity_rate: f64,
    pub email: Option<String>,
}

impl fmt::Display for QuoteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quote for {} - ${:.2}/month", self.zip_code, self.monthly_bill)
    }
}

// ─── Outputs ─────────────────────────────────────────────────────────────────

/// Full-precision estimator output. Never mutated after computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuoteResult {
    pub system_size_kw: f64,
    pub annual_production_kwh: f64,
    pub coverage_percent: f64,
    pub system_cost: f64,
    pub tax_credit: f64,
    pub net_cost: f64,
    pub annual_savings: f64,
    pub payback_years: f64,
    /// Savings over 25 years, net of system cost
    pub lifetime_savings: f64,
    /// lbs of CO2 per year
    pub co2_offset_lbs: f64,
    pub trees_equivalent: i64,
    pub cars_off_road: f64,
    pub lifetime_energy_mwh: f64,
}

impl QuoteResult {
    pub fn panel_count(&self) -> i64 {
        round_to(self.system_size_kw * 3.0, 0) as i64
    }
}

/// Display-rounded figures returned to the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResults {
    pub system_size: f64,
    pub panel_count: i64,
    pub annual_production: i64,
    pub coverage_percent: i64,
    pub system_cost: i64,
    pub tax_credit: i64,
    pub net_cost: i64,
    pub annual_savings: i64,
    pub payback_years: f64,
    pub lifetime_savings: i64,
    pub co2_offset: i64,
    pub trees_equivalent: i64,
    pub cars_off_road: f64,
    pub lifetime_energy: f64,
}

impl From<&QuoteResult> for QuoteResults {
    fn from(r: &QuoteResult) -> Self {
        let whole = |v: f64| round_to(v, 0) as i64;
        Self {
            system_size: round_to(r.system_size_kw, 2),
            panel_count: r.panel_count(),
            annual_production: whole(r.annual_production_kwh),
            coverage_percent: whole(r.coverage_percent),
            system_cost: whole(r.system_cost),
            tax_credit: whole(r.tax_credit),
            net_cost: whole(r.net_cost),
            annual_savings: whole(r.annual_savings),
            payback_years: round_to(r.payback_years, 1),
            lifetime_savings: whole(r.lifetime_savings),
            co2_offset: whole(r.co2_offset_lbs),
            trees_equivalent: r.trees_equivalent,
            cars_off_road: round_to(r.cars_off_road, 2),
            lifetime_energy: round_to(r.lifetime_energy_mwh, 1),
        }
    }
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StoredQuote {
    pub id: QuoteId,
    pub request: QuoteRequest,
    pub result: QuoteResult,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for StoredQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.request, f)
    }
}

/// Listing criteria. Results are always newest first.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuoteFilter {
    /// Exact match on the stored sun exposure label
    pub sun_exposure: Option<String>,
    /// Exact match on the stored roof type label
    pub roof_type: Option<String>,
    /// Case-insensitive substring of zip code or email
    pub search: Option<String>,
    /// Maximum number of quotes to return (default 50)
    pub limit: Option<usize>,
}

impl QuoteFilter {
    pub const DEFAULT_LIMIT: usize = 50;

    pub fn effective_limit(&self, max: usize) -> usize {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).min(max)
    }
}

// ─── REST API response types ──────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CalculateResponse {
    pub success: bool,
    pub results: QuoteResults,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub quotes_stored: u64,
}
