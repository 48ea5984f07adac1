//! ============================================================
//!  Residential Solar Quote Estimator
//!
//!  Pipeline:
//!   1. Annual consumption   – bill / rate × 12
//!   2. System sizing        – 1.5 kW per 100 ft² of roof, derated by sun
//!   3. Annual production    – 1 200 kWh per kW, derated by sun again
//!   4. Coverage             – production / consumption, capped at 100 %
//!   5. Cost                 – $3/W, 30 % federal tax credit
//!   6. Savings & payback    – over a 25-year horizon
//!   7. Environmental impact – CO2, trees, cars, lifetime MWh
//!
//!  Pure and stateless: identical inputs always give identical output.
//! ============================================================

use crate::error::QuoteError;
use crate::models::quote::{QuoteResult, SunExposure};

// ─── Model constants ─────────────────────────────────────────
const KW_PER_100_SQFT: f64 = 1.5;
const KWH_PER_KW_YEAR: f64 = 1200.0;
const COST_PER_WATT: f64 = 3.0;
const TAX_CREDIT_RATE: f64 = 0.30;
const HORIZON_YEARS: f64 = 25.0;
const CO2_LBS_PER_KWH: f64 = 0.92;
const CO2_LBS_PER_TREE: f64 = 48.0;
const CO2_LBS_PER_CAR: f64 = 9000.0;

/// Rounds to `decimals` places, ties to even.
///
/// Goes through the decimal formatter rather than scaling by a power of ten:
/// the formatter rounds the exact binary value, so `0.765` (stored just above
/// the tie) becomes `0.77` and only true ties such as `2.5` go to even.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

/// Main entry point.
///
/// * `monthly_bill`     – average electricity bill, currency / month
/// * `roof_size`        – usable roof area, ft²
/// * `sun_exposure`     – callers resolve unknown labels with [`SunExposure::resolve`]
/// * `electricity_rate` – currency / kWh
pub fn estimate(
    monthly_bill: f64,
    roof_size: f64,
    sun_exposure: SunExposure,
    electricity_rate: f64,
) -> Result<QuoteResult, QuoteError> {
    // Negated comparisons also reject NaN.
    if !(monthly_bill > 0.0) {
        return Err(QuoteError::InvalidInput(format!("monthly bill must be positive, got {monthly_bill}")));
    }
    if !(roof_size > 0.0) {
        return Err(QuoteError::InvalidInput(format!("roof size must be positive, got {roof_size}")));
    }
    if !(electricity_rate > 0.0) {
        return Err(QuoteError::InvalidInput(format!("electricity rate must be positive, got {electricity_rate}")));
    }

    // ── 1. Consumption ────────────────────────────────────────
    let annual_consumption = (monthly_bill / electricity_rate) * 12.0; // kWh / year

    // ── 2. Sizing ─────────────────────────────────────────────
    let sun_multiplier = sun_exposure.multiplier();
    let system_size_kw = (roof_size / 100.0) * KW_PER_100_SQFT * sun_multiplier;

    // ── 3. Production ─────────────────────────────────────────
    // The exposure derating is applied a second time here, so production
    // scales with the square of the multiplier.
    let annual_production_kwh = system_size_kw * KWH_PER_KW_YEAR * sun_multiplier;

    // ── 4. Coverage ───────────────────────────────────────────
    let coverage_percent = ((annual_production_kwh / annual_consumption) * 100.0).min(100.0);

    // ── 5. Cost ───────────────────────────────────────────────
    let system_cost = system_size_kw * 1000.0 * COST_PER_WATT;
    let tax_credit = system_cost * TAX_CREDIT_RATE;
    let net_cost = system_cost - tax_credit;

    // ── 6. Savings ────────────────────────────────────────────
    let annual_savings = (annual_production_kwh * electricity_rate) * (coverage_percent / 100.0);
    let payback_years = if annual_savings > 0.0 { net_cost / annual_savings } else { 0.0 };
    let lifetime_savings = (annual_savings * HORIZON_YEARS) - net_cost;

    // ── 7. Environment ────────────────────────────────────────
    let co2_offset_lbs = annual_production_kwh * CO2_LBS_PER_KWH;
    let trees_equivalent = round_to(co2_offset_lbs / CO2_LBS_PER_TREE, 0) as i64;
    let cars_off_road = round_to(co2_offset_lbs / CO2_LBS_PER_CAR, 2);
    let lifetime_energy_mwh = round_to((annual_production_kwh * HORIZON_YEARS) / 1000.0, 1);

    Ok(QuoteResult {
        system_size_kw,
        annual_production_kwh,
        coverage_percent,
        system_cost,
        tax_credit,
        net_cost,
        annual_savings,
        payback_years,
        lifetime_savings,
        co2_offset_lbs,
        trees_equivalent,
        cars_off_road,
        lifetime_energy_mwh,
    })
}
