use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::db::QuoteRepository;
use crate::error::QuoteError;
use crate::models::quote::{QuoteId, QuoteRequest, QuoteResult, SunExposure};
use crate::services::estimator;

pub const DEFAULT_ELECTRICITY_RATE: f64 = 0.13;
const DEFAULT_SUN_EXPOSURE: &str = "excellent";
const DEFAULT_ROOF_TYPE: &str = "asphalt";

/// Raw form submission as posted by the calculator page.
///
/// Numeric fields accept JSON numbers or numeric strings; text fields accept
/// any JSON scalar, so `"zipCode": 90210` is kept as `"90210"`. Anything
/// missing falls back to the form defaults.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSubmission {
    #[schema(value_type = Option<String>, example = "90210")]
    pub zip_code: Option<Value>,
    #[schema(value_type = Option<f64>, example = 250)]
    pub monthly_bill: Option<Value>,
    #[schema(value_type = Option<f64>, example = 2000)]
    pub roof_size: Option<Value>,
    #[schema(value_type = Option<String>, example = "asphalt")]
    pub roof_type: Option<Value>,
    #[schema(value_type = Option<String>, example = "excellent")]
    pub sun_exposure: Option<Value>,
    #[schema(value_type = Option<f64>, example = 0.13)]
    pub electricity_rate: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub email: Option<Value>,
}

fn numeric_field(field: &'static str, value: Option<&Value>, default: f64) -> Result<f64, QuoteError> {
    let parsed = match value {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(QuoteError::Parse {
            field,
            reason: format!("expected a number, got {}", value.map_or_else(String::new, Value::to_string)),
        }),
    }
}

fn text_field(field: &'static str, value: Option<&Value>) -> Result<Option<String>, QuoteError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(v.to_string())),
        Some(other) => Err(QuoteError::Parse {
            field,
            reason: format!("expected text, got {other}"),
        }),
    }
}

impl QuoteSubmission {
    /// Applies defaults and numeric coercion. Range checks are left to the estimator.
    pub fn into_request(self) -> Result<QuoteRequest, QuoteError> {
        Ok(QuoteRequest {
            monthly_bill: numeric_field("monthlyBill", self.monthly_bill.as_ref(), 0.0)?,
            roof_size: numeric_field("roofSize", self.roof_size.as_ref(), 0.0)?,
            electricity_rate: numeric_field(
                "electricityRate",
                self.electricity_rate.as_ref(),
                DEFAULT_ELECTRICITY_RATE,
            )?,
            zip_code: text_field("zipCode", self.zip_code.as_ref())?.unwrap_or_default(),
            roof_type: text_field("roofType", self.roof_type.as_ref())?
                .unwrap_or_else(|| DEFAULT_ROOF_TYPE.to_string()),
            sun_exposure: text_field("sunExposure", self.sun_exposure.as_ref())?
                .unwrap_or_else(|| DEFAULT_SUN_EXPOSURE.to_string()),
            email: text_field("email", self.email.as_ref())?
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
        })
    }
}

/// Decodes a request body into a [`QuoteRequest`].
pub fn parse_submission(body: &[u8]) -> Result<QuoteRequest, QuoteError> {
    let submission: QuoteSubmission = serde_json::from_slice(body).map_err(|e| QuoteError::Parse {
        field: "body",
        reason: e.to_string(),
    })?;
    submission.into_request()
}

/// Runs the estimator and stores the pair. Nothing is written unless the
/// estimate succeeds.
pub fn calculate(
    store: &dyn QuoteRepository,
    request: QuoteRequest,
) -> Result<(QuoteId, QuoteResult), QuoteError> {
    let exposure = SunExposure::resolve(&request.sun_exposure);
    if SunExposure::from_label(&request.sun_exposure).is_none() {
        debug!("Unrecognized sun exposure {:?}, treating as {}", request.sun_exposure, exposure.as_str());
    }

    let result = estimator::estimate(
        request.monthly_bill,
        request.roof_size,
        exposure,
        request.electricity_rate,
    )?;
    let id = store.save(&request, &result)?;

    info!(
        "[QUOTE] #{} {} | {:.2} kW | {:.0} kWh/yr | net ${:.0}",
        id, request, result.system_size_kw, result.annual_production_kwh, result.net_cost
    );
    #[cfg(feature = "verbose_log")]
    info!("[QUOTE] #{} request={:?} result={:?}", id, request, result);

    Ok((id, result))
}
