//! Database queries

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use crate::models::quote::{QuoteFilter, QuoteId, QuoteRequest, QuoteResult, StoredQuote};

const SELECT_QUOTE: &str = r#"
    SELECT id, zip_code, monthly_bill, roof_size, roof_type, sun_exposure, electricity_rate, email,
           system_size_kw, annual_production_kwh, coverage_percent, system_cost, tax_credit, net_cost,
           annual_savings, payback_years, lifetime_savings, co2_offset_lbs, trees_equivalent,
           cars_off_road, lifetime_energy_mwh, created_at, updated_at
    FROM solar_quotes
"#;

fn quote_from_row(row: &Row<'_>) -> rusqlite::Result<StoredQuote> {
    Ok(StoredQuote {
        id: row.get("id")?,
        request: QuoteRequest {
            zip_code: row.get("zip_code")?,
            monthly_bill: row.get("monthly_bill")?,
            roof_size: row.get("roof_size")?,
            roof_type: row.get("roof_type")?,
            sun_exposure: row.get("sun_exposure")?,
            electricity_rate: row.get("electricity_rate")?,
            email: row.get("email")?,
        },
        result: QuoteResult {
            system_size_kw: row.get("system_size_kw")?,
            annual_production_kwh: row.get("annual_production_kwh")?,
            coverage_percent: row.get("coverage_percent")?,
            system_cost: row.get("system_cost")?,
            tax_credit: row.get("tax_credit")?,
            net_cost: row.get("net_cost")?,
            annual_savings: row.get("annual_savings")?,
            payback_years: row.get("payback_years")?,
            lifetime_savings: row.get("lifetime_savings")?,
            co2_offset_lbs: row.get("co2_offset_lbs")?,
            trees_equivalent: row.get("trees_equivalent")?,
            cars_off_road: row.get("cars_off_road")?,
            lifetime_energy_mwh: row.get("lifetime_energy_mwh")?,
        },
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// `%` and `_` in user input match literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub fn insert_quote(conn: &Connection, request: &QuoteRequest, result: &QuoteResult) -> rusqlite::Result<QuoteId> {
    let now = Utc::now();
    conn.execute(
        r#"
        INSERT INTO solar_quotes (
            zip_code, monthly_bill, roof_size, roof_type, sun_exposure, electricity_rate, email,
            system_size_kw, annual_production_kwh, coverage_percent, system_cost, tax_credit, net_cost,
            annual_savings, payback_years, lifetime_savings, co2_offset_lbs, trees_equivalent,
            cars_off_road, lifetime_energy_mwh, created_at, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)
        "#,
        params![
            request.zip_code,
            request.monthly_bill,
            request.roof_size,
            request.roof_type,
            request.sun_exposure,
            request.electricity_rate,
            request.email,
            result.system_size_kw,
            result.annual_production_kwh,
            result.coverage_percent,
            result.system_cost,
            result.tax_credit,
            result.net_cost,
            result.annual_savings,
            result.payback_years,
            result.lifetime_savings,
            result.co2_offset_lbs,
            result.trees_equivalent,
            result.cars_off_road,
            result.lifetime_energy_mwh,
            now,
            now,
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!("DB: Inserted quote id={} zip={}", id, request.zip_code);
    Ok(id)
}

pub fn find_quote(conn: &Connection, id: QuoteId) -> rusqlite::Result<Option<StoredQuote>> {
    conn.query_row(&format!("{SELECT_QUOTE} WHERE id = ?1"), [id], quote_from_row)
        .optional()
}

pub fn list_quotes(conn: &Connection, filter: &QuoteFilter) -> rusqlite::Result<Vec<StoredQuote>> {
    let pattern = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(like_pattern);
    let limit = filter.limit.unwrap_or(QuoteFilter::DEFAULT_LIMIT) as i64;

    let mut stmt = conn.prepare(&format!(
        r#"{SELECT_QUOTE}
        WHERE (?1 IS NULL OR sun_exposure = ?1)
          AND (?2 IS NULL OR roof_type = ?2)
          AND (?3 IS NULL
               OR lower(zip_code) LIKE ?3 ESCAPE '\'
               OR lower(coalesce(email, '')) LIKE ?3 ESCAPE '\')
        ORDER BY created_at DESC, id DESC
        LIMIT ?4
        "#
    ))?;
    let rows = stmt.query_map(
        params![filter.sun_exposure, filter.roof_type, pattern, limit],
        quote_from_row,
    )?;
    rows.collect()
}

pub fn count_quotes(conn: &Connection) -> rusqlite::Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM solar_quotes", [], |row| row.get(0))?;
    Ok(count.max(0) as u64)
}
